// 🔎 Query Surface
// Read-only accessors over one loaded snapshot.
//
// A Snapshot is immutable once built. Share it behind an `Arc`; growth
// and history queries allocate fresh results and never touch the table.

use crate::classify::{PriceTier, RiskLevel};
use crate::coordinates::{Coordinate, CoordinateLookup};
use crate::error::{AtlasError, AtlasResult};
use crate::fields;
use crate::growth::{growth_summary, GrowthSummary};
use crate::pipeline::LoadReport;
use crate::series::{QuarterlySeries, SeriesStore};
use crate::table::{RegionRecord, RegionTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Desc,
    Asc,
}

impl FromStr for Order {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "desc" | "descending" => Ok(Order::Desc),
            "asc" | "ascending" => Ok(Order::Asc),
            other => Err(AtlasError::InvalidQuery(format!("unknown order: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRegion<'a> {
    pub rank: usize,
    pub region: &'a str,
    pub value: f64,
}

/// A region with its classifications and location attached.
#[derive(Debug, Clone, Serialize)]
pub struct RegionView<'a> {
    pub record: &'a RegionRecord,
    pub price_tier: PriceTier,
    pub risk_level: RiskLevel,
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotOverview<'a> {
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub fingerprint: &'a str,
    pub regions: usize,
    pub columns: &'a [String],
    pub with_series: usize,
    pub report: &'a LoadReport,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

#[derive(Debug)]
pub struct Snapshot {
    id: Uuid,
    loaded_at: DateTime<Utc>,
    fingerprint: String,
    table: RegionTable,
    series: SeriesStore,
    coordinates: CoordinateLookup,
    report: LoadReport,
}

impl Snapshot {
    pub fn new(
        table: RegionTable,
        series: SeriesStore,
        coordinates: CoordinateLookup,
        report: LoadReport,
        fingerprint: String,
    ) -> Self {
        Snapshot {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            fingerprint,
            table,
            series,
            coordinates,
            report,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn table(&self) -> &RegionTable {
        &self.table
    }

    pub fn series(&self) -> &SeriesStore {
        &self.series
    }

    pub fn coordinates(&self) -> &CoordinateLookup {
        &self.coordinates
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn overview(&self) -> SnapshotOverview<'_> {
        SnapshotOverview {
            id: self.id,
            loaded_at: self.loaded_at,
            fingerprint: &self.fingerprint,
            regions: self.table.len(),
            columns: self.table.columns(),
            with_series: self
                .table
                .records()
                .iter()
                .filter(|r| !self.series.observations(r.name()).is_empty())
                .count(),
            report: &self.report,
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Region by exact key.
    pub fn get(&self, region: &str) -> AtlasResult<&RegionRecord> {
        self.table
            .get(region)
            .ok_or_else(|| AtlasError::NotFound(region.to_string()))
    }

    /// All region keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.table.sorted_keys()
    }

    pub fn describe(&self, region: &str) -> AtlasResult<RegionView<'_>> {
        let record = self.get(region)?;
        Ok(RegionView {
            record,
            price_tier: PriceTier::from_price(record.number(fields::CURRENT_PRICE_2025)),
            risk_level: RiskLevel::from_category(record.text(fields::TOTAL_RISK_CATEGORY)),
            coordinate: self.coordinates.get(region),
        })
    }

    /// Case-insensitive substring match over region keys, sorted.
    pub fn search(&self, text: &str) -> Vec<&str> {
        let needle = text.trim().to_lowercase();
        self.keys()
            .into_iter()
            .filter(|k| k.to_lowercase().contains(&needle))
            .collect()
    }

    /// Number of regions with a value (not `Missing`) in `field`.
    pub fn count_with(&self, field: &str) -> usize {
        self.table
            .records()
            .iter()
            .filter(|r| !r.is_missing(field))
            .count()
    }

    /// Nearest region in the table to a point.
    pub fn nearest(&self, lat: f64, lng: f64) -> Option<(&str, Coordinate)> {
        self.coordinates
            .nearest(lat, lng, |name| self.table.contains(name))
    }

    // ------------------------------------------------------------------
    // Leaderboards
    // ------------------------------------------------------------------

    /// Top `n` regions by a numeric field.
    ///
    /// Only numeric values rank. Ties keep table order, so the same
    /// snapshot always returns the same list.
    pub fn top_n(&self, field: &str, n: usize, order: Order) -> Vec<RankedRegion<'_>> {
        self.rank(field, n, order, |_| true)
    }

    /// Like `top_n`, restricted to regions that also have a value in
    /// `required_field`.
    pub fn top_n_requiring(
        &self,
        field: &str,
        n: usize,
        order: Order,
        required_field: &str,
    ) -> Vec<RankedRegion<'_>> {
        self.rank(field, n, order, |r| !r.is_missing(required_field))
    }

    fn rank<F>(&self, field: &str, n: usize, order: Order, keep: F) -> Vec<RankedRegion<'_>>
    where
        F: Fn(&RegionRecord) -> bool,
    {
        let mut candidates: Vec<(&str, f64)> = self
            .table
            .records()
            .iter()
            .filter(|&r| keep(r))
            .filter_map(|r| r.number(field).map(|v| (r.name(), v)))
            .collect();

        // sort_by is stable
        match order {
            Order::Desc => candidates.sort_by(|a, b| b.1.total_cmp(&a.1)),
            Order::Asc => candidates.sort_by(|a, b| a.1.total_cmp(&b.1)),
        }

        candidates
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(i, (region, value))| RankedRegion {
                rank: i + 1,
                region,
                value,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Time series
    // ------------------------------------------------------------------

    /// Growth summary computed on demand.
    ///
    /// `Err(NotFound)` for an unknown region; `Ok(None)` when the region
    /// exists but has no parseable series.
    pub fn growth_summary(&self, region: &str) -> AtlasResult<Option<GrowthSummary>> {
        let record = self.get(region)?;
        Ok(growth_summary(record.name(), self.series.observations(region)))
    }

    pub fn quarterly_series(&self, region: &str) -> AtlasResult<Option<QuarterlySeries>> {
        self.get(region)?;
        Ok(self.series.quarterly(region))
    }
}

// ============================================================================
// TESTS
// ============================================================================
