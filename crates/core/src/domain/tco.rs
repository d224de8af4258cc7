use serde::{Deserialize, Serialize};

use crate::domain::tier::{Tier, TierMap};

/// How much real secondhand transaction evidence backs a resale figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResaleConfidence {
    None,
    Low,
    Medium,
    High,
}

impl std::str::FromStr for ResaleConfidence {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown resale confidence `{other}` (expected none|low|medium|high)")),
        }
    }
}

/// One consumable part replaced on a yearly cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableItem {
    pub name: String,
    pub unit_price: i64,
    pub changes_per_year: u32,
    pub annual_cost: i64,
}

impl ConsumableItem {
    /// Yearly spend on this part: the explicit annual figure when present,
    /// otherwise `unit_price x changes_per_year`.
    pub fn yearly_cost(&self) -> Option<i64> {
        if self.annual_cost > 0 {
            Some(self.annual_cost)
        } else {
            self.unit_price.checked_mul(i64::from(self.changes_per_year))
        }
    }
}

/// Secondhand market evidence for one product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResaleEvidence {
    pub value: Option<i64>,
    pub sample_count: u32,
}

/// Already-collected cost inputs for one selected product. All amounts are
/// integer KRW and every recurring figure is per year.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEvidence {
    pub purchase_price: Option<i64>,
    /// A zero purchase price is only accepted when confirmed.
    pub price_confirmed: bool,
    pub annual_recurring_cost: Option<i64>,
    pub consumables: Vec<ConsumableItem>,
    pub annual_repair_cost: Option<i64>,
    pub resale: Option<ResaleEvidence>,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcoRecord {
    pub name: String,
    pub brand: String,
    pub manufacturer: String,
    pub selection_rank: u32,
    pub purchase_price: i64,
    pub annual_recurring_cost: i64,
    pub horizon_years: u32,
    pub recurring_cost_total: i64,
    pub resale_value: i64,
    pub resale_confidence: ResaleConfidence,
    pub resale_sample_count: u32,
    pub total_cost: i64,
    pub consumable_breakdown: Vec<ConsumableItem>,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedProduct {
    pub name: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostExtreme {
    pub name: String,
    pub total_cost: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcoSummary {
    pub cheapest: CostExtreme,
    pub most_expensive: CostExtreme,
    pub cost_difference: i64,
    /// Rounded percentage of the cheapest total; 0 when the cheapest total is not positive.
    pub cost_difference_pct: i64,
}

/// Interchange document consumed by content generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TcoExport {
    pub category: String,
    pub horizon_years: u32,
    pub selected_tier: Option<Tier>,
    pub tier_scores: TierMap<f64>,
    pub tier_product_counts: TierMap<usize>,
    pub products: Vec<TcoRecord>,
    pub excluded: Vec<ExcludedProduct>,
    pub summary: Option<TcoSummary>,
}
