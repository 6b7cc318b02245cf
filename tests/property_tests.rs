// Property tests for the merge, period, growth, ranking and derived-field
// invariants.

use proptest::prelude::*;
use region_atlas::growth::annual_aggregates;
use region_atlas::{
    CoordinateLookup, DerivedRule, Frame, LoadReport, MergeEngine, Order, Period, RegionTable,
    SeriesStore, Snapshot,
};

fn frame(columns: &[&str], rows: Vec<Vec<String>>) -> Frame {
    Frame::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}

fn region_name() -> impl Strategy<Value = String> {
    "[A-Z]{1,6}"
}

fn primary(keys: &[String]) -> RegionTable {
    let rows = keys
        .iter()
        .enumerate()
        .map(|(i, k)| vec![k.clone(), i.to_string()])
        .collect();
    MergeEngine::new("Suburb")
        .build_primary(&frame(&["Suburb", "Base"], rows))
        .unwrap()
        .table
}

proptest! {
    #[test]
    fn prop_merges_never_change_row_count(
        keys in prop::collection::hash_set(region_name(), 1..30),
        incoming in prop::collection::vec(
            prop::collection::vec((region_name(), -1e6f64..1e6), 0..40),
            0..5,
        ),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let engine = MergeEngine::new("Suburb");
        let mut table = primary(&keys);

        for (i, rows) in incoming.into_iter().enumerate() {
            let column = format!("Extra_{}", i);
            let rows = rows.into_iter().map(|(k, v)| vec![k, v.to_string()]).collect();
            engine.merge(&mut table, &frame(&["Suburb", &column], rows)).unwrap();
        }

        prop_assert_eq!(table.len(), keys.len());
        let mut expected = keys.clone();
        expected.sort();
        prop_assert_eq!(table.sorted_keys(), expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn prop_first_merged_source_wins_collisions(
        keys in prop::collection::hash_set(region_name(), 1..20),
        first in -1e6f64..1e6,
        second in -1e6f64..1e6,
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let engine = MergeEngine::new("Suburb");
        let mut table = primary(&keys);

        let rows = |v: f64| -> Vec<Vec<String>> {
            keys.iter().map(|k| vec![k.clone(), v.to_string()]).collect()
        };
        engine.merge(&mut table, &frame(&["Suburb", "Price"], rows(first))).unwrap();
        let outcome = engine.merge(&mut table, &frame(&["Suburb", "Price"], rows(second))).unwrap();

        prop_assert_eq!(outcome.discarded_columns, vec!["Price".to_string()]);
        for key in &keys {
            prop_assert_eq!(table.get(key).unwrap().number("Price"), Some(first));
        }
    }

    #[test]
    fn prop_period_parse_idempotent(year in 1000i32..=9999, quarter in 1u8..=4, compact in any::<bool>()) {
        let label = if compact {
            format!("{}Q{}", year, quarter)
        } else {
            format!("{} Q{}", year, quarter)
        };

        let once = Period::parse(&label);
        prop_assert_eq!(once, Period::parse(&label));
        prop_assert_eq!(once, Some(Period { year, quarter }));
        prop_assert_eq!(Period::parse(&once.unwrap().label()), once);
    }

    #[test]
    fn prop_labels_without_quarter_drop(label in "[A-Za-z ]{0,12}[0-9]{4}[A-Pa-z ]{0,12}") {
        prop_assume!(!label.contains('Q'));
        prop_assert_eq!(Period::parse(&label), None);
    }

    #[test]
    fn prop_yoy_sign_matches_delta(
        medians in prop::collection::vec(-1e6f64..1e6, 2..12),
    ) {
        let points: Vec<(Period, f64)> = medians
            .iter()
            .enumerate()
            .map(|(i, v)| (Period { year: 2000 + i as i32, quarter: 1 }, *v))
            .collect();

        let annual = annual_aggregates(&points);
        for pair in annual.windows(2) {
            let delta = pair[1].median - pair[0].median;
            prop_assert_eq!(pair[1].change, Some(delta));
            if let Some(pct) = pair[1].change_pct {
                prop_assert!(pct.is_finite());
                prop_assert_eq!(pct > 0.0, delta > 0.0);
                prop_assert_eq!(pct < 0.0, delta < 0.0);
            }
        }
    }

    #[test]
    fn prop_top_n_deterministic(
        values in prop::collection::vec(prop::option::of(0u8..5), 1..40),
        n in 0usize..50,
        ascending in any::<bool>(),
    ) {
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, v)| vec![format!("R{:03}", i), v.map(|v| v.to_string()).unwrap_or_default()])
            .collect();
        let table = MergeEngine::new("Suburb")
            .build_primary(&frame(&["Suburb", "Score"], rows))
            .unwrap()
            .table;
        let snapshot = Snapshot::new(
            table,
            SeriesStore::empty(),
            CoordinateLookup::empty(),
            LoadReport::default(),
            String::new(),
        );
        let order = if ascending { Order::Asc } else { Order::Desc };

        let a = snapshot.top_n("Score", n, order);
        let b = snapshot.top_n("Score", n, order);
        prop_assert_eq!(&a, &b);

        let ranked = values.iter().filter(|v| v.is_some()).count();
        prop_assert_eq!(a.len(), n.min(ranked));
        // ties keep table order
        for pair in a.windows(2) {
            if pair[0].value == pair[1].value {
                prop_assert!(pair[0].region < pair[1].region);
            }
        }
    }

    #[test]
    fn prop_rate_per_1000_never_undefined(
        numerator in -1e9f64..1e9,
        denominator in prop::option::of(prop_oneof![Just(0.0f64), -1e6f64..1e6]),
    ) {
        let rule = DerivedRule::crime_rate_per_1000();
        let rate = rule.compute(Some(numerator), denominator).unwrap();

        prop_assert!(rate.is_finite());
        match denominator {
            Some(d) if d > 0.0 && (numerator / d * 1000.0).is_finite() => {
                prop_assert_eq!(rate, numerator / d * 1000.0)
            }
            _ => prop_assert_eq!(rate, 0.0),
        }
    }
}

#[test]
fn rate_per_1000_zero_population_is_sentinel() {
    let rule = DerivedRule::crime_rate_per_1000();
    assert_eq!(rule.compute(Some(42.0), Some(0.0)), Some(0.0));
    assert_eq!(rule.compute(None, Some(0.0)), Some(0.0));
    assert_eq!(rule.compute(None, None), Some(0.0));
    assert_eq!(rule.compute(None, Some(100.0)), None);
}
