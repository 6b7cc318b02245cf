// 🧮 Derived-Field Calculator
// Fills fields no source supplied but that can be computed from fields that were.
//
// Externally supplied values are authoritative: a rule only writes into
// rows where its target is still Missing after all merges.

use crate::fields;
use crate::table::RegionTable;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `target = numerator / denominator * scale`
///
/// A missing or non-positive denominator yields `sentinel` rather than
/// NaN, so ranking never sees an undefined value. A missing numerator
/// leaves the row Missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRule {
    pub target: String,
    pub numerator: String,
    pub denominator: String,
    pub scale: f64,
    #[serde(default)]
    pub sentinel: f64,
}

impl DerivedRule {
    pub fn ratio(
        target: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
        scale: f64,
    ) -> Self {
        DerivedRule {
            target: target.into(),
            numerator: numerator.into(),
            denominator: denominator.into(),
            scale,
            sentinel: 0.0,
        }
    }

    /// Crime rate per 1000 residents.
    pub fn crime_rate_per_1000() -> Self {
        DerivedRule::ratio(
            fields::CRIME_RATE_PER_1000,
            fields::TOTAL_CRIME_COUNT,
            fields::POPULATION_TOTAL,
            1000.0,
        )
    }

    /// Compute the rule for one row's inputs.
    ///
    /// A missing or non-positive denominator yields the sentinel whatever
    /// the numerator; otherwise a missing numerator stays `None`.
    pub fn compute(&self, numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
        match denominator {
            Some(d) if d > 0.0 => numerator.map(|n| {
                let v = n / d * self.scale;
                if v.is_finite() {
                    v
                } else {
                    self.sentinel
                }
            }),
            _ => Some(self.sentinel),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedOutcome {
    pub target: String,
    /// Rows that received a computed value
    pub filled: usize,
    /// Rows that already had an authoritative value
    pub kept: usize,
    /// Rows left Missing: numerator missing with a positive denominator
    pub unresolved: usize,
}

pub struct DerivedFieldCalculator {
    rules: Vec<DerivedRule>,
}

impl DerivedFieldCalculator {
    pub fn new(rules: Vec<DerivedRule>) -> Self {
        DerivedFieldCalculator { rules }
    }

    pub fn rules(&self) -> &[DerivedRule] {
        &self.rules
    }

    /// Apply every rule whose dependencies exist in the table schema.
    pub fn apply(&self, table: &mut RegionTable) -> Vec<DerivedOutcome> {
        let mut outcomes = Vec::new();

        for rule in &self.rules {
            // The numerator column must exist somewhere; without it the
            // target cannot be computed for any row.
            if !table.has_column(&rule.numerator) {
                debug!(field = %rule.target, "derived rule skipped: numerator column absent");
                continue;
            }
            if !table.has_column(&rule.denominator) {
                debug!(field = %rule.target, "derived rule skipped: denominator column absent");
                continue;
            }

            table.add_column(&rule.target);
            let mut outcome = DerivedOutcome {
                target: rule.target.clone(),
                ..Default::default()
            };

            for record in table.records_mut() {
                if !record.is_missing(&rule.target) {
                    outcome.kept += 1;
                    continue;
                }
                let computed = rule.compute(
                    record.number(&rule.numerator),
                    record.number(&rule.denominator),
                );
                match computed {
                    Some(v) => {
                        record.set(&rule.target, Value::Number(v));
                        outcome.filled += 1;
                    }
                    None => outcome.unresolved += 1,
                }
            }

            outcomes.push(outcome);
        }

        outcomes
    }
}

impl Default for DerivedFieldCalculator {
    fn default() -> Self {
        DerivedFieldCalculator::new(vec![DerivedRule::crime_rate_per_1000()])
    }
}

// ============================================================================
// TESTS
// ============================================================================
