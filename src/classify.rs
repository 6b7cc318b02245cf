// 🏷️ Classification Helpers
// Price tiers and risk levels derived from record values.

use serde::{Deserialize, Serialize};

// ============================================================================
// PRICE TIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTier {
    Budget,
    MidRange,
    UpperMid,
    Premium,
    Unknown,
}

impl PriceTier {
    pub fn from_price(price: Option<f64>) -> Self {
        match price {
            None => PriceTier::Unknown,
            Some(p) if p < 500_000.0 => PriceTier::Budget,
            Some(p) if p < 750_000.0 => PriceTier::MidRange,
            Some(p) if p < 1_000_000.0 => PriceTier::UpperMid,
            Some(_) => PriceTier::Premium,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PriceTier::Budget => "Budget (<$500K)",
            PriceTier::MidRange => "Mid-Range ($500K-$750K)",
            PriceTier::UpperMid => "Upper-Mid ($750K-$1M)",
            PriceTier::Premium => "Premium (>$1M)",
            PriceTier::Unknown => "Unknown",
        }
    }
}

// ============================================================================
// RISK LEVEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    /// Classify a free-text risk category ("Low Risk", "Moderate", ...).
    /// Any other non-empty text counts as high.
    pub fn from_category(category: Option<&str>) -> Self {
        let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) else {
            return RiskLevel::Unknown;
        };
        let lower = category.to_lowercase();
        if lower.contains("low") {
            RiskLevel::Low
        } else if lower.contains("medium") || lower.contains("moderate") {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}
