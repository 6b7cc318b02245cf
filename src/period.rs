// 📅 Period Parser
// Extracts (year, quarter) from a free-text period label.
//
// One fixed pattern, no format negotiation:
//   year    = the first four consecutive digits ("20231 Q1" reads 2023)
//   quarter = the digit right after a literal 'Q' (must be 1-4)
//
// "2023Q2" → (2023, 2), "Q3 2021" → (2021, 3), "Early 2023" → None.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("year pattern is valid"));
static QUARTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Q(\d)").expect("quarter pattern is valid"));

/// A parsed quarter. Orders chronologically by (year, quarter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub quarter: u8,
}

impl Period {
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Period { year, quarter })
    }

    /// Parse a label; `None` means the observation is dropped.
    pub fn parse(label: &str) -> Option<Self> {
        let year: i32 = YEAR_PATTERN.find(label)?.as_str().parse().ok()?;
        let quarter: u8 = QUARTER_PATTERN
            .captures(label)?
            .get(1)?
            .as_str()
            .parse()
            .ok()?;
        Period::new(year, quarter)
    }

    /// Canonical display label, e.g. "2023 Q2".
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.quarter).cmp(&(other.year, other.quarter))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Q{}", self.year, self.quarter)
    }
}

// ============================================================================
// TESTS
// ============================================================================
