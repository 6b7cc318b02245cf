// 🏭 Load Pipeline
// Reader → Merge Engine (per source, canonical order) → Derived fields,
// plus the time series store and coordinate lookup, into one Snapshot.
//
// Single pass, single thread: each merge depends on the columns the
// earlier ones contributed.

use crate::config::{AtlasConfig, SourceKind};
use crate::coordinates::CoordinateLookup;
use crate::derive::{DerivedFieldCalculator, DerivedOutcome};
use crate::error::{AtlasError, AtlasResult};
use crate::merge::{MergeEngine, MergeOutcome};
use crate::query::Snapshot;
use crate::reader::{sha256_hex, CsvReader, TabularReader};
use crate::series::{SeriesColumns, SeriesStore};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// LOAD REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    /// Source read and merged
    Merged(MergeOutcome),
    /// File absent, none of the requested columns exist, or no key column
    Empty,
    /// I/O or format failure; the pipeline continued without it
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub kind: SourceKind,
    pub path: PathBuf,
    pub outcome: SourceOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub regions: usize,
    pub columns: usize,
    pub sources: Vec<SourceReport>,
    pub duplicate_primary_keys: Vec<String>,
    pub blank_primary_keys: usize,
    pub derived: Vec<DerivedOutcome>,
    pub series_regions: usize,
    pub series_observations: usize,
    pub series_skipped_rows: usize,
    pub coordinates: usize,
}

impl LoadReport {
    pub fn summary(&self) -> String {
        let merged = self
            .sources
            .iter()
            .filter(|s| matches!(s.outcome, SourceOutcome::Merged(_)))
            .count();
        format!(
            "{} regions, {} columns, {}/{} sources merged, {} series observations",
            self.regions,
            self.columns,
            merged,
            self.sources.len(),
            self.series_observations
        )
    }

    /// Every column dropped by the first-writer-wins rule, with its source.
    pub fn discarded_columns(&self) -> Vec<(SourceKind, &str)> {
        self.sources
            .iter()
            .filter_map(|s| match &s.outcome {
                SourceOutcome::Merged(m) => Some((s.kind, m)),
                _ => None,
            })
            .flat_map(|(kind, m)| m.discarded_columns.iter().map(move |c| (kind, c.as_str())))
            .collect()
    }
}

// ============================================================================
// FINGERPRINT
// ============================================================================

/// Content fingerprint over every configured source, in canonical order.
struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    fn add(&mut self, label: &str, digest: Option<&str>) {
        self.hasher
            .update(format!("{}:{}\n", label, digest.unwrap_or("-")).as_bytes());
    }

    fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

fn file_digest(path: &Path) -> Option<String> {
    fs::read(path).ok().map(|bytes| sha256_hex(&bytes))
}

/// Fingerprint the configured sources without building a table.
/// Matches `Snapshot::fingerprint` when nothing changed on disk.
pub fn fingerprint(config: &AtlasConfig) -> String {
    let mut fp = Fingerprint::new();
    for kind in SourceKind::CANONICAL_ORDER {
        if let Some(spec) = config.source(kind) {
            fp.add(kind.name(), file_digest(&config.resolve(&spec.path)).as_deref());
        }
    }
    if let Some(ts) = &config.timeseries {
        fp.add("timeseries", file_digest(&config.resolve(&ts.path)).as_deref());
    }
    if let Some(coords) = &config.coordinates {
        fp.add("coordinates", file_digest(&config.resolve(coords)).as_deref());
    }
    fp.finish()
}

// ============================================================================
// LOAD
// ============================================================================

/// Load every configured source from CSV files.
pub fn load(config: &AtlasConfig) -> AtlasResult<Snapshot> {
    load_with(config, &CsvReader::new())
}

/// Load using a specific reader.
///
/// Fails only when the master source cannot produce a table.
pub fn load_with(config: &AtlasConfig, reader: &dyn TabularReader) -> AtlasResult<Snapshot> {
    let engine = MergeEngine::new(config.key_column.clone());
    let mut report = LoadReport::default();
    let mut fp = Fingerprint::new();

    // ------------------------------------------------------------------
    // 1. Master (mandatory)
    // ------------------------------------------------------------------
    let master_path = config.resolve(&config.master.path);
    let missing = |reason: String| AtlasError::MandatorySourceMissing {
        name: SourceKind::Master.name().to_string(),
        path: master_path.clone(),
        reason,
    };

    let master_frame = reader
        .read(&master_path, config.requested_columns(&config.master).as_deref())
        .map_err(|e| missing(e.to_string()))?;
    fp.add(SourceKind::Master.name(), master_frame.digest());

    if master_frame.is_empty() {
        let reason = match master_frame.digest() {
            None => "file not found".to_string(),
            Some(_) => "none of the requested columns exist".to_string(),
        };
        return Err(missing(reason));
    }

    let build = engine
        .build_primary(&master_frame)
        .ok_or_else(|| missing(format!("key column '{}' absent", config.key_column)))?;
    let mut table = build.table;
    report.duplicate_primary_keys = build.duplicate_keys;
    report.blank_primary_keys = build.blank_keys;
    info!(
        regions = table.len(),
        columns = table.columns().len(),
        "master source loaded"
    );

    // ------------------------------------------------------------------
    // 2. Optional sources, canonical order
    // ------------------------------------------------------------------
    for kind in SourceKind::CANONICAL_ORDER.into_iter().filter(|k| !k.is_mandatory()) {
        let Some(spec) = config.source(kind) else {
            continue;
        };
        let path = config.resolve(&spec.path);
        let requested = config.requested_columns(spec);

        let outcome = match reader.read(&path, requested.as_deref()) {
            Err(e) => {
                warn!(source = kind.name(), error = %e, "source unavailable, continuing without it");
                // The bytes may still be readable; fingerprint them the same
                // way `fingerprint()` does.
                fp.add(kind.name(), file_digest(&path).as_deref());
                SourceOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
            Ok(frame) => {
                fp.add(kind.name(), frame.digest());
                if frame.is_empty() {
                    info!(source = kind.name(), "source empty or absent");
                    SourceOutcome::Empty
                } else {
                    match engine.merge(&mut table, &frame) {
                        Some(merged) => {
                            info!(source = kind.name(), "merged: {}", merged.summary());
                            SourceOutcome::Merged(merged)
                        }
                        None => {
                            warn!(source = kind.name(), key = %config.key_column, "source has no key column");
                            SourceOutcome::Empty
                        }
                    }
                }
            }
        };

        report.sources.push(SourceReport {
            kind,
            path,
            outcome,
        });
    }

    // ------------------------------------------------------------------
    // 3. Derived fields
    // ------------------------------------------------------------------
    report.derived = DerivedFieldCalculator::new(config.derived.clone()).apply(&mut table);

    // ------------------------------------------------------------------
    // 4. Time series
    // ------------------------------------------------------------------
    let series = match &config.timeseries {
        None => SeriesStore::empty(),
        Some(ts) => {
            let path = config.resolve(&ts.path);
            let requested = vec![
                config.key_column.clone(),
                ts.value_column.clone(),
                ts.period_column.clone(),
            ];
            match reader.read(&path, Some(&requested)) {
                Ok(frame) => {
                    fp.add("timeseries", frame.digest());
                    SeriesStore::from_frame(
                        &frame,
                        &SeriesColumns {
                            region: &config.key_column,
                            period: &ts.period_column,
                            value: &ts.value_column,
                        },
                    )
                }
                Err(e) => {
                    warn!(error = %e, "time series unavailable");
                    fp.add("timeseries", file_digest(&path).as_deref());
                    SeriesStore::empty()
                }
            }
        }
    };
    report.series_regions = series.region_count();
    report.series_observations = series.observation_count();
    report.series_skipped_rows = series.skipped_rows();

    // ------------------------------------------------------------------
    // 5. Coordinates
    // ------------------------------------------------------------------
    let coordinates = match &config.coordinates {
        None => CoordinateLookup::empty(),
        Some(path) => {
            let path = config.resolve(path);
            fp.add("coordinates", file_digest(&path).as_deref());
            CoordinateLookup::from_file(&path).unwrap_or_else(|e| {
                warn!(error = %e, "coordinates unavailable");
                CoordinateLookup::empty()
            })
        }
    };
    report.coordinates = coordinates.len();

    report.regions = table.len();
    report.columns = table.columns().len();
    info!("load complete: {}", report.summary());

    Ok(Snapshot::new(table, series, coordinates, report, fp.finish()))
}

// ============================================================================
// TESTS
// ============================================================================
