// 🌱 Growth Analytics Engine
// Pure function of a region's observations: annual medians, year-over-year
// deltas, CAGR across the full span, and best/worst years.
//
// Anything that cannot be computed is `None`, never a placeholder 0.
// A CAGR of 0% means prices genuinely did not move.

use crate::period::Period;
use crate::series::{parse_series, Observation};
use serde::Serialize;
use std::collections::BTreeMap;

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualPoint {
    pub year: i32,
    /// Median of the year's parsed observations
    pub median: f64,
    /// `median - previous median`; `None` for the first year
    pub change: Option<f64>,
    /// Percentage change; `None` for the first year or a zero predecessor
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cagr {
    pub rate_pct: f64,
    pub total_growth_pct: f64,
    pub first_year: i32,
    pub last_year: i32,
    pub span_years: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearChange {
    pub year: i32,
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSummary {
    pub region: String,
    pub annual: Vec<AnnualPoint>,
    pub cagr: Option<Cagr>,
    pub best_year: Option<YearChange>,
    pub worst_year: Option<YearChange>,
    pub observations_used: usize,
    pub observations_dropped: usize,
}

impl GrowthSummary {
    pub fn first(&self) -> Option<&AnnualPoint> {
        self.annual.first()
    }

    pub fn last(&self) -> Option<&AnnualPoint> {
        self.annual.last()
    }

    pub fn summary(&self) -> String {
        let cagr = self
            .cagr
            .as_ref()
            .map(|c| format!("{:.2}%", c.rate_pct))
            .unwrap_or_else(|| "unavailable".to_string());
        format!(
            "{}: {} years, CAGR {}, {} observations ({} dropped)",
            self.region,
            self.annual.len(),
            cagr,
            self.observations_used,
            self.observations_dropped
        )
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Median of a non-empty slice; the mean of the two middle values for
/// even lengths.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Percentage change from `previous` to `current`.
///
/// Divides by `|previous|` so the sign always follows `current - previous`.
/// A zero predecessor has no defined percentage.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    let pct = (current - previous) / previous.abs() * 100.0;
    pct.is_finite().then_some(pct)
}

/// Group parsed points by year and take the median of each year.
pub fn annual_aggregates(points: &[(Period, f64)]) -> Vec<AnnualPoint> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (period, value) in points {
        by_year.entry(period.year).or_default().push(*value);
    }

    let mut annual: Vec<AnnualPoint> = Vec::with_capacity(by_year.len());
    for (year, mut values) in by_year {
        let Some(year_median) = median(&mut values) else {
            continue;
        };
        let (change, change_pct) = match annual.last() {
            Some(prev) => (
                Some(year_median - prev.median),
                percent_change(prev.median, year_median),
            ),
            None => (None, None),
        };
        annual.push(AnnualPoint {
            year,
            median: year_median,
            change,
            change_pct,
        });
    }
    annual
}

/// CAGR between the first and last annual points.
///
/// Requires two or more points, a positive first value and a positive span.
pub fn compound_growth(annual: &[AnnualPoint]) -> Option<Cagr> {
    if annual.len() < 2 {
        return None;
    }
    let first = annual.first()?;
    let last = annual.last()?;
    let span = last.year - first.year;
    if first.median <= 0.0 || span <= 0 {
        return None;
    }

    let rate_pct = ((last.median / first.median).powf(1.0 / span as f64) - 1.0) * 100.0;
    let total_growth_pct = (last.median - first.median) / first.median * 100.0;
    if !rate_pct.is_finite() || !total_growth_pct.is_finite() {
        return None;
    }

    Some(Cagr {
        rate_pct,
        total_growth_pct,
        first_year: first.year,
        last_year: last.year,
        span_years: span,
    })
}

/// Year with the highest (`best`) or lowest percentage change.
/// Ties go to the earliest year; the first year never qualifies.
fn extreme_year(annual: &[AnnualPoint], best: bool) -> Option<YearChange> {
    let mut pick: Option<YearChange> = None;
    for point in annual {
        let Some(pct) = point.change_pct else {
            continue;
        };
        let better = match &pick {
            None => true,
            Some(current) if best => pct > current.change_pct,
            Some(current) => pct < current.change_pct,
        };
        if better {
            pick = Some(YearChange {
                year: point.year,
                change_pct: pct,
            });
        }
    }
    pick
}

/// Full growth summary for one region. `None` means no observation had a
/// parseable period - an empty state, not an error.
pub fn growth_summary(region: &str, observations: &[Observation]) -> Option<GrowthSummary> {
    let parsed = parse_series(observations);
    if parsed.points.is_empty() {
        return None;
    }

    let annual = annual_aggregates(&parsed.points);
    let cagr = compound_growth(&annual);

    Some(GrowthSummary {
        region: region.to_string(),
        best_year: extreme_year(&annual, true),
        worst_year: extreme_year(&annual, false),
        cagr,
        annual,
        observations_used: parsed.points.len(),
        observations_dropped: parsed.dropped,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(rows: &[(&str, f64)]) -> Vec<Observation> {
        rows.iter().map(|(l, v)| Observation::new(*l, *v)).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn test_annual_median_per_year() {
        let summary = growth_summary(
            "ADELAIDE",
            &obs(&[
                ("2019 Q1", 100.0),
                ("2019 Q2", 300.0),
                ("2019 Q3", 200.0),
                ("2020 Q1", 400.0),
                ("2020 Q2", 500.0),
            ]),
        )
        .unwrap();

        assert_eq!(summary.annual.len(), 2);
        assert_eq!(summary.annual[0].median, 200.0);
        assert_eq!(summary.annual[1].median, 450.0);
    }

    #[test]
    fn test_yoy_deltas() {
        let summary = growth_summary(
            "ADELAIDE",
            &obs(&[("2019Q1", 100.0), ("2020Q1", 110.0), ("2021Q1", 99.0)]),
        )
        .unwrap();

        let a = &summary.annual;
        assert_eq!(a[0].change, None);
        assert_eq!(a[0].change_pct, None);
        assert_eq!(a[1].change, Some(10.0));
        assert!(close(a[1].change_pct.unwrap(), 10.0));
        assert_eq!(a[2].change, Some(-11.0));
        assert!(close(a[2].change_pct.unwrap(), -10.0));
    }

    #[test]
    fn test_zero_predecessor_pct_undefined() {
        let summary =
            growth_summary("X", &obs(&[("2019Q1", 0.0), ("2020Q1", 50.0)])).unwrap();
        assert_eq!(summary.annual[1].change, Some(50.0));
        assert_eq!(summary.annual[1].change_pct, None);
        // first value is zero, so CAGR is unavailable too
        assert!(summary.cagr.is_none());
        assert!(summary.best_year.is_none());
    }

    #[test]
    fn test_cagr_known_value() {
        let summary = growth_summary(
            "ADELAIDE",
            &obs(&[("2019 Q1", 500_000.0), ("2025 Q4", 650_000.0)]),
        )
        .unwrap();

        let cagr = summary.cagr.unwrap();
        let expected = ((650_000.0f64 / 500_000.0).powf(1.0 / 6.0) - 1.0) * 100.0;
        assert!(close(cagr.rate_pct, expected));
        assert!((cagr.rate_pct - 4.46).abs() < 0.01);
        assert!(close(cagr.total_growth_pct, 30.0));
        assert_eq!(cagr.span_years, 6);
    }

    #[test]
    fn test_single_year_cagr_unavailable() {
        let summary = growth_summary(
            "ADELAIDE",
            &obs(&[("2019 Q1", 500.0), ("2019 Q2", 520.0)]),
        )
        .unwrap();

        assert_eq!(summary.annual.len(), 1);
        assert!(summary.cagr.is_none());
        assert!(summary.best_year.is_none());
        assert!(summary.worst_year.is_none());
    }

    #[test]
    fn test_best_and_worst_year() {
        let summary = growth_summary(
            "ADELAIDE",
            &obs(&[
                ("2019Q1", 100.0),
                ("2020Q1", 120.0), // +20%
                ("2021Q1", 108.0), // -10%
                ("2022Q1", 113.4), // +5%
            ]),
        )
        .unwrap();

        assert_eq!(summary.best_year.as_ref().unwrap().year, 2020);
        assert_eq!(summary.worst_year.as_ref().unwrap().year, 2021);
    }

    #[test]
    fn test_best_year_tie_goes_to_earliest() {
        let summary = growth_summary(
            "X",
            &obs(&[("2019Q1", 100.0), ("2020Q1", 110.0), ("2021Q1", 121.0)]),
        )
        .unwrap();

        assert_eq!(summary.best_year.unwrap().year, 2020);
        assert_eq!(summary.worst_year.unwrap().year, 2020);
    }

    #[test]
    fn test_no_parseable_periods() {
        assert!(growth_summary("X", &obs(&[("Early 2023", 1.0), ("late", 2.0)])).is_none());
        assert!(growth_summary("X", &[]).is_none());
    }

    #[test]
    fn test_dropped_counted() {
        let summary = growth_summary(
            "X",
            &obs(&[("2019Q1", 1.0), ("Early 2023", 2.0), ("2020Q1", 3.0)]),
        )
        .unwrap();
        assert_eq!(summary.observations_used, 2);
        assert_eq!(summary.observations_dropped, 1);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let forward = obs(&[("2019Q1", 1.0), ("2020Q1", 2.0), ("2021Q1", 4.0)]);
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(
            growth_summary("X", &forward).unwrap().annual,
            growth_summary("X", &reversed).unwrap().annual
        );
    }

    #[test]
    fn test_percent_change_sign_with_negative_previous() {
        let pct = percent_change(-10.0, -5.0).unwrap();
        assert!(pct > 0.0);
    }
}
