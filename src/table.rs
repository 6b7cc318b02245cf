// 🗂️ Region Table
// One record per uniquely-named region, keyed by the region name.
//
// Rows come from the primary source only; later sources can add columns
// but never rows. Mutators are crate-private: once a load finishes the
// table is only reachable through `&RegionTable`.

use crate::reader::Frame;
use crate::value::Value;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

static MISSING: Value = Value::Missing;

// ============================================================================
// REGION RECORD
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegionRecord {
    name: String,
    fields: HashMap<String, Value>,
}

impl RegionRecord {
    pub(crate) fn new(name: String) -> Self {
        RegionRecord {
            name,
            fields: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Typed accessor. An unknown field is `Missing`, never a default.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&MISSING)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).as_number()
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).as_text()
    }

    pub fn is_missing(&self, field: &str) -> bool {
        self.get(field).is_missing()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }
}

// ============================================================================
// REGION TABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct RegionTable {
    key_column: String,
    /// Schema in the order columns were first seen (key column first)
    columns: Vec<String>,
    /// Records in primary-source order; this order breaks ranking ties
    records: Vec<RegionRecord>,
    index: HashMap<String, usize>,
}

/// Result of building a table from the primary frame.
#[derive(Debug)]
pub struct PrimaryBuild {
    pub table: RegionTable,
    pub duplicate_keys: Vec<String>,
    pub blank_keys: usize,
}

impl RegionTable {
    /// Build the table from the primary source.
    ///
    /// Returns `None` when the frame lacks the key column. Duplicate keys
    /// keep their first row; rows with a blank key are skipped.
    pub fn from_primary(frame: &Frame, key_column: &str) -> Option<PrimaryBuild> {
        let key_idx = frame.column_index(key_column)?;

        let mut table = RegionTable {
            key_column: key_column.to_string(),
            columns: vec![key_column.to_string()],
            records: Vec::with_capacity(frame.row_count()),
            index: HashMap::with_capacity(frame.row_count()),
        };
        table.columns.extend(
            frame
                .columns()
                .iter()
                .filter(|c| c.as_str() != key_column)
                .cloned(),
        );

        let mut duplicate_keys = Vec::new();
        let mut blank_keys = 0;

        for row in frame.rows() {
            let key = &row[key_idx];
            if key.trim().is_empty() {
                blank_keys += 1;
                continue;
            }
            if table.index.contains_key(key) {
                warn!(region = %key, "duplicate region key in primary source, keeping first row");
                duplicate_keys.push(key.clone());
                continue;
            }

            let mut record = RegionRecord::new(key.clone());
            for (idx, column) in frame.columns().iter().enumerate() {
                if idx != key_idx {
                    record.set(column, Value::parse(&row[idx]));
                }
            }
            table.index.insert(key.clone(), table.records.len());
            table.records.push(record);
        }

        Some(PrimaryBuild {
            table,
            duplicate_keys,
            blank_keys,
        })
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&RegionRecord> {
        self.index.get(key).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Records in primary-source order.
    pub fn records(&self) -> &[RegionRecord] {
        &self.records
    }

    /// Region keys sorted ascending.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.records.iter().map(|r| r.name()).collect();
        keys.sort_unstable();
        keys
    }

    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub(crate) fn record_at_mut(&mut self, idx: usize) -> &mut RegionRecord {
        &mut self.records[idx]
    }

    pub(crate) fn records_mut(&mut self) -> &mut [RegionRecord] {
        &mut self.records
    }

    /// Register a new column; every record starts `Missing` for it.
    pub(crate) fn add_column(&mut self, name: &str) {
        if self.has_column(name) {
            return;
        }
        self.columns.push(name.to_string());
        for record in &mut self.records {
            record.set(name, Value::Missing);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
