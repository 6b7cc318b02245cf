// ⚙️ Configuration
// Where each dataset lives and which columns to request from it.

use crate::derive::DerivedRule;
use crate::fields;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// SOURCE KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Master,
    Predictions,
    Risk,
    Rental,
    Cultural,
    CrimeOffense,
}

impl SourceKind {
    /// Merge order. Changing it changes which source wins a column collision.
    pub const CANONICAL_ORDER: [SourceKind; 6] = [
        SourceKind::Master,
        SourceKind::Predictions,
        SourceKind::Risk,
        SourceKind::Rental,
        SourceKind::Cultural,
        SourceKind::CrimeOffense,
    ];

    pub fn name(&self) -> &str {
        match self {
            SourceKind::Master => "master",
            SourceKind::Predictions => "predictions",
            SourceKind::Risk => "risk",
            SourceKind::Rental => "rental",
            SourceKind::Cultural => "cultural",
            SourceKind::CrimeOffense => "crime_offense",
        }
    }

    /// Only the master dataset is required for a load to succeed.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, SourceKind::Master)
    }
}

// ============================================================================
// SOURCE SPECS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub path: PathBuf,
    /// Columns to request; `None` loads every column
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

impl SourceSpec {
    pub fn all_columns(path: impl Into<PathBuf>) -> Self {
        SourceSpec {
            path: path.into(),
            columns: None,
        }
    }

    pub fn with_columns(path: impl Into<PathBuf>, columns: &[&str]) -> Self {
        SourceSpec {
            path: path.into(),
            columns: Some(columns.iter().map(|c| c.to_string()).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesSpec {
    pub path: PathBuf,
    #[serde(default = "default_period_column")]
    pub period_column: String,
    #[serde(default = "default_value_column")]
    pub value_column: String,
}

fn default_period_column() -> String {
    fields::PERIOD.to_string()
}

fn default_value_column() -> String {
    fields::MEDIAN_PRICE.to_string()
}

fn default_key_column() -> String {
    fields::SUBURB.to_string()
}

fn default_derived() -> Vec<DerivedRule> {
    vec![DerivedRule::crime_rate_per_1000()]
}

// ============================================================================
// ATLAS CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Base directory; relative source paths resolve against it
    pub data_dir: PathBuf,

    #[serde(default = "default_key_column")]
    pub key_column: String,

    pub master: SourceSpec,
    #[serde(default)]
    pub predictions: Option<SourceSpec>,
    #[serde(default)]
    pub risk: Option<SourceSpec>,
    #[serde(default)]
    pub rental: Option<SourceSpec>,
    #[serde(default)]
    pub cultural: Option<SourceSpec>,
    #[serde(default)]
    pub crime_offense: Option<SourceSpec>,

    #[serde(default)]
    pub timeseries: Option<TimeseriesSpec>,

    /// JSON region → {lat, lng} lookup
    #[serde(default)]
    pub coordinates: Option<PathBuf>,

    #[serde(default = "default_derived")]
    pub derived: Vec<DerivedRule>,
}

impl AtlasConfig {
    /// Default dataset layout under `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        AtlasConfig {
            data_dir: data_dir.into(),
            key_column: default_key_column(),
            master: SourceSpec::with_columns(
                "data/clean/master_dataset_by_suburb.csv",
                fields::MASTER_CORE_COLUMNS,
            ),
            predictions: Some(SourceSpec::all_columns(
                "data/predictions/price_predictions_2025_2026.csv",
            )),
            risk: Some(SourceSpec::all_columns(
                "data/risk_analysis/complete_risk_analysis.csv",
            )),
            rental: Some(SourceSpec::with_columns(
                "data/rental/complete_rental_analysis.csv",
                fields::RENTAL_COLUMNS,
            )),
            cultural: Some(SourceSpec::with_columns(
                "data/demographics/cultural_demographics.csv",
                fields::CULTURAL_COLUMNS,
            )),
            crime_offense: Some(SourceSpec::all_columns(
                "data/suburb_crime_offense_analysis.csv",
            )),
            timeseries: Some(TimeseriesSpec {
                path: PathBuf::from("data/clean/property_timeseries_2019_2025.csv"),
                period_column: default_period_column(),
                value_column: default_value_column(),
            }),
            coordinates: Some(PathBuf::from("suburb_coordinates.json")),
            derived: default_derived(),
        }
    }

    /// Load config from a JSON file. A relative `data_dir` resolves against
    /// the config file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: AtlasConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_column.trim().is_empty() {
            anyhow::bail!("key_column must not be empty");
        }
        for rule in &self.derived {
            if rule.target.is_empty() || rule.numerator.is_empty() || rule.denominator.is_empty() {
                anyhow::bail!("derived rule has an empty field name: {:?}", rule);
            }
        }
        Ok(())
    }

    pub fn source(&self, kind: SourceKind) -> Option<&SourceSpec> {
        match kind {
            SourceKind::Master => Some(&self.master),
            SourceKind::Predictions => self.predictions.as_ref(),
            SourceKind::Risk => self.risk.as_ref(),
            SourceKind::Rental => self.rental.as_ref(),
            SourceKind::Cultural => self.cultural.as_ref(),
            SourceKind::CrimeOffense => self.crime_offense.as_ref(),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    /// Requested columns for a source, always including the key column.
    pub fn requested_columns(&self, spec: &SourceSpec) -> Option<Vec<String>> {
        spec.columns.as_ref().map(|columns| {
            let mut requested = Vec::with_capacity(columns.len() + 1);
            if !columns.iter().any(|c| c == &self.key_column) {
                requested.push(self.key_column.clone());
            }
            requested.extend(columns.iter().cloned());
            requested
        })
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        AtlasConfig::with_data_dir(".")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_canonical_order() {
        let names: Vec<&str> = SourceKind::CANONICAL_ORDER.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            vec!["master", "predictions", "risk", "rental", "cultural", "crime_offense"]
        );
    }

    #[test]
    fn test_only_master_mandatory() {
        for kind in SourceKind::CANONICAL_ORDER {
            assert_eq!(kind.is_mandatory(), kind == SourceKind::Master);
        }
    }

    #[test]
    fn test_default_layout() {
        let config = AtlasConfig::with_data_dir("/srv/atlas");
        assert_eq!(config.key_column, "Suburb");
        assert!(config.source(SourceKind::Predictions).unwrap().columns.is_none());
        assert!(config.master.columns.as_ref().unwrap().contains(&"Current_Price_2025".to_string()));
        assert_eq!(
            config.resolve(&config.master.path),
            PathBuf::from("/srv/atlas/data/clean/master_dataset_by_suburb.csv")
        );
    }

    #[test]
    fn test_requested_columns_include_key() {
        let config = AtlasConfig::default();
        let spec = SourceSpec::with_columns("x.csv", &["Price"]);
        assert_eq!(
            config.requested_columns(&spec),
            Some(vec!["Suburb".to_string(), "Price".to_string()])
        );
        assert_eq!(config.requested_columns(&SourceSpec::all_columns("x.csv")), None);
    }

    #[test]
    fn test_from_file_minimal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.json");
        let mut f = fs::File::create(&path).unwrap();
        write!(
            f,
            r#"{{ "data_dir": "data", "master": {{ "path": "master.csv" }} }}"#
        )
        .unwrap();

        let config = AtlasConfig::from_file(&path).unwrap();

        assert_eq!(config.data_dir, dir.path().join("data"));
        assert_eq!(config.key_column, "Suburb");
        assert!(config.predictions.is_none());
        assert_eq!(config.derived.len(), 1);
    }

    #[test]
    fn test_from_file_rejects_empty_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("atlas.json");
        fs::write(
            &path,
            r#"{ "data_dir": ".", "key_column": " ", "master": { "path": "m.csv" } }"#,
        )
        .unwrap();

        assert!(AtlasConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        assert!(AtlasConfig::from_file("/definitely/not/here.json").is_err());
    }
}
