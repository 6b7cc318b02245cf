// 🔗 Merge Engine
// Left-joins sources onto the primary region table.
//
// Rules:
//   1. The primary key set is fixed: incoming rows for unknown keys are dropped.
//   2. First-seen field wins: an incoming column whose name already exists
//      in the table is discarded (not overwritten, not renamed).
//   3. Within one incoming source a repeated key keeps its first row.
//
// Because of rule 2 the order sources are merged in is part of the
// contract. See `SourceKind::CANONICAL_ORDER`.

use crate::reader::Frame;
use crate::table::{PrimaryBuild, RegionTable};
use crate::value::Value;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

// ============================================================================
// MERGE OUTCOME
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeOutcome {
    /// Rows in the incoming frame
    pub rows: usize,
    /// Rows whose key exists in the table
    pub matched: usize,
    /// Rows whose key is absent from the table (dropped)
    pub unmatched: usize,
    /// Columns added to the table schema
    pub added_columns: Vec<String>,
    /// Columns dropped because an earlier source already supplied them
    pub discarded_columns: Vec<String>,
    /// Keys repeated inside the incoming source (later rows ignored)
    pub duplicate_keys: Vec<String>,
}

impl MergeOutcome {
    pub fn summary(&self) -> String {
        format!(
            "{} rows ({} matched, {} unmatched), +{} columns, {} discarded",
            self.rows,
            self.matched,
            self.unmatched,
            self.added_columns.len(),
            self.discarded_columns.len()
        )
    }
}

// ============================================================================
// MERGE ENGINE
// ============================================================================

pub struct MergeEngine {
    key_column: String,
}

impl MergeEngine {
    pub fn new(key_column: impl Into<String>) -> Self {
        MergeEngine {
            key_column: key_column.into(),
        }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Create the table from the primary frame. `None` if it has no key column.
    pub fn build_primary(&self, frame: &Frame) -> Option<PrimaryBuild> {
        RegionTable::from_primary(frame, &self.key_column)
    }

    /// Merge `incoming` into `table` by the engine's key column.
    ///
    /// Returns `None` when the incoming frame has no key column, in which
    /// case the table is untouched.
    pub fn merge(&self, table: &mut RegionTable, incoming: &Frame) -> Option<MergeOutcome> {
        merge(table, incoming, &self.key_column)
    }
}

/// Left-join `incoming` onto `table` keyed by `key`.
pub fn merge(table: &mut RegionTable, incoming: &Frame, key: &str) -> Option<MergeOutcome> {
    let key_idx = incoming.column_index(key)?;

    let mut outcome = MergeOutcome {
        rows: incoming.row_count(),
        ..Default::default()
    };

    // Decide the schema contribution once, up front
    let mut accepted: Vec<(usize, &str)> = Vec::new();
    for (idx, column) in incoming.columns().iter().enumerate() {
        if idx == key_idx {
            continue;
        }
        if table.has_column(column) {
            debug!(column = %column, "collision: column already supplied by an earlier source");
            outcome.discarded_columns.push(column.clone());
        } else {
            accepted.push((idx, column.as_str()));
            outcome.added_columns.push(column.clone());
        }
    }

    for (_, column) in &accepted {
        table.add_column(column);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(incoming.row_count());
    for row in incoming.rows() {
        let row_key = row[key_idx].as_str();
        if !seen.insert(row_key) {
            outcome.duplicate_keys.push(row_key.to_string());
            continue;
        }

        match table.position(row_key) {
            Some(pos) => {
                outcome.matched += 1;
                let record = table.record_at_mut(pos);
                for &(idx, column) in &accepted {
                    record.set(column, Value::parse(&row[idx]));
                }
            }
            None => outcome.unmatched += 1,
        }
    }

    if !outcome.duplicate_keys.is_empty() {
        warn!(
            count = outcome.duplicate_keys.len(),
            "duplicate region keys in incoming source, kept first rows"
        );
    }

    Some(outcome)
}

// ============================================================================
// TESTS
// ============================================================================
