// Region Atlas - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod value;
pub mod fields;
pub mod reader;         // Schema-tolerant tabular reader
pub mod table;          // Region table keyed by region name
pub mod merge;          // First-writer-wins left-join merge
pub mod derive;         // Derived fields (crime rate per 1000)
pub mod period;         // "2023 Q2" period labels
pub mod series;         // Time series store
pub mod growth;         // YoY, CAGR, best/worst year
pub mod config;
pub mod coordinates;
pub mod classify;
pub mod pipeline;       // Load: read → merge → derive → snapshot
pub mod query;          // Read-only query surface
pub mod store;          // Atomic-swap snapshot holder

// Re-export commonly used types
pub use error::{AtlasError, AtlasResult, ReadError};
pub use value::Value;
pub use reader::{CsvReader, Frame, TabularReader};
pub use table::{RegionRecord, RegionTable};
pub use merge::{MergeEngine, MergeOutcome};
pub use derive::{DerivedFieldCalculator, DerivedOutcome, DerivedRule};
pub use period::Period;
pub use series::{Observation, QuarterPoint, QuarterlySeries, SeriesStore};
pub use growth::{growth_summary, AnnualPoint, Cagr, GrowthSummary, YearChange};
pub use config::{AtlasConfig, SourceKind, SourceSpec, TimeseriesSpec};
pub use coordinates::{Coordinate, CoordinateLookup};
pub use classify::{PriceTier, RiskLevel};
pub use pipeline::{load, LoadReport, SourceOutcome, SourceReport};
pub use query::{Order, RankedRegion, RegionView, Snapshot, SnapshotOverview};
pub use store::AtlasStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
