// 📈 Time Series Store
// Per-region observations, built once in bulk from the quarterly source.

use crate::period::Period;
use crate::reader::Frame;
use crate::value::Value;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One (period label, value) row for a region. Labels are kept raw;
/// parsing happens per query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub period_label: String,
    pub value: f64,
}

impl Observation {
    pub fn new(period_label: impl Into<String>, value: f64) -> Self {
        Observation {
            period_label: period_label.into(),
            value,
        }
    }
}

/// Column names of the time-series source.
#[derive(Debug, Clone)]
pub struct SeriesColumns<'a> {
    pub region: &'a str,
    pub period: &'a str,
    pub value: &'a str,
}

// ============================================================================
// PARSED SERIES
// ============================================================================

/// Observations that survived period parsing, sorted by (year, quarter).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSeries {
    pub points: Vec<(Period, f64)>,
    /// Observations whose label had no year or no quarter
    pub dropped: usize,
}

/// Parse every label and sort chronologically. The sort is stable, so
/// repeated periods keep their input order.
pub fn parse_series(observations: &[Observation]) -> ParsedSeries {
    let mut points = Vec::with_capacity(observations.len());
    let mut dropped = 0;

    for obs in observations {
        match Period::parse(&obs.period_label) {
            Some(period) => points.push((period, obs.value)),
            None => {
                debug!(label = %obs.period_label, "unparseable period, observation dropped");
                dropped += 1;
            }
        }
    }

    points.sort_by(|a, b| a.0.cmp(&b.0));
    ParsedSeries { points, dropped }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterPoint {
    pub period: Period,
    pub label: String,
    pub value: f64,
}

/// Price-history view of one region: every parsed quarter plus its range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterlySeries {
    pub region: String,
    pub points: Vec<QuarterPoint>,
    pub low: f64,
    pub high: f64,
    pub dropped: usize,
}

// ============================================================================
// SERIES STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    by_region: HashMap<String, Vec<Observation>>,
    /// Source rows skipped for a blank region, period or non-numeric value
    skipped_rows: usize,
}

impl SeriesStore {
    pub fn empty() -> Self {
        SeriesStore::default()
    }

    /// Bulk build from the time-series frame. A frame missing any of the
    /// three columns yields an empty store.
    pub fn from_frame(frame: &Frame, columns: &SeriesColumns<'_>) -> Self {
        let (Some(region_idx), Some(period_idx), Some(value_idx)) = (
            frame.column_index(columns.region),
            frame.column_index(columns.period),
            frame.column_index(columns.value),
        ) else {
            if !frame.is_empty() {
                debug!("time series frame lacks region/period/value columns");
            }
            return SeriesStore::empty();
        };

        let mut store = SeriesStore::empty();
        for row in frame.rows() {
            let region = &row[region_idx];
            let label = &row[period_idx];
            let value = Value::parse(&row[value_idx]).as_number();

            match value {
                Some(v) if !region.trim().is_empty() && !label.trim().is_empty() => {
                    store
                        .by_region
                        .entry(region.clone())
                        .or_default()
                        .push(Observation::new(label.clone(), v));
                }
                _ => store.skipped_rows += 1,
            }
        }
        store
    }

    pub fn from_observations<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, Observation)>,
        S: Into<String>,
    {
        let mut store = SeriesStore::empty();
        for (region, obs) in rows {
            store.by_region.entry(region.into()).or_default().push(obs);
        }
        store
    }

    /// Raw observations for a region (empty slice when unknown).
    pub fn observations(&self, region: &str) -> &[Observation] {
        self.by_region.get(region).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn region_count(&self) -> usize {
        self.by_region.len()
    }

    pub fn observation_count(&self) -> usize {
        self.by_region.values().map(Vec::len).sum()
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Quarterly price history; `None` when no observation parses.
    pub fn quarterly(&self, region: &str) -> Option<QuarterlySeries> {
        let parsed = parse_series(self.observations(region));
        if parsed.points.is_empty() {
            return None;
        }

        let low = parsed.points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let high = parsed
            .points
            .iter()
            .map(|p| p.1)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(QuarterlySeries {
            region: region.to_string(),
            points: parsed
                .points
                .into_iter()
                .map(|(period, value)| QuarterPoint {
                    period,
                    label: period.label(),
                    value,
                })
                .collect(),
            low,
            high,
            dropped: parsed.dropped,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
