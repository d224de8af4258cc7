use serde::{Deserialize, Serialize};

use crate::domain::candidate::CandidateProduct;
use crate::domain::metrics::KeywordMetrics;
use crate::domain::tco::ExcludedProduct;
use crate::domain::tier::{Tier, TierMap};

/// Min-max normalized demand scores, each in `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductScores {
    pub clicks_score: f64,
    pub cpc_score: f64,
    pub search_volume_score: f64,
    pub competition_score: f64,
    pub total_score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedProduct {
    pub rank: u32,
    #[serde(flatten)]
    pub candidate: CandidateProduct,
    pub tier: Tier,
    pub scores: ProductScores,
    /// Within-tier ordering bonus from external mention counts. Not part of `total_score`.
    pub mention_bonus: f64,
    /// Pulled from a tier other than the winning one.
    pub cross_tier: bool,
    pub keyword_metrics: Option<KeywordMetrics>,
    pub selection_reasons: Vec<String>,
    /// Assigned downstream by content generation.
    #[serde(default)]
    pub differentiation: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pass,
    /// Non-fatal: the constraint was knowingly relaxed and flagged.
    Relaxed,
    Fail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub status: ValidationStatus,
    pub message: String,
}

impl ValidationOutcome {
    pub fn pass(message: impl Into<String>) -> Self {
        Self { status: ValidationStatus::Pass, message: message.into() }
    }

    pub fn relaxed(message: impl Into<String>) -> Self {
        Self { status: ValidationStatus::Relaxed, message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { status: ValidationStatus::Fail, message: message.into() }
    }

    pub fn is_failure(&self) -> bool {
        self.status == ValidationStatus::Fail
    }
}

/// Advisory post-selection checks. Failures are reported, never enforced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionValidation {
    pub brand_diversity: ValidationOutcome,
    pub tier_depth: ValidationOutcome,
    pub keyword_data: ValidationOutcome,
    pub price_spread: ValidationOutcome,
}

impl SelectionValidation {
    pub fn failed_checks(&self) -> Vec<&'static str> {
        [
            ("brand_diversity", &self.brand_diversity),
            ("tier_depth", &self.tier_depth),
            ("keyword_data", &self.keyword_data),
            ("price_spread", &self.price_spread),
        ]
        .into_iter()
        .filter(|(_, outcome)| outcome.is_failure())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    /// Products were selected, possibly through fallbacks.
    Selected,
    /// The pool had no candidates in any tier.
    Empty,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub category: String,
    pub status: SelectionStatus,
    pub selected_tier: Option<Tier>,
    pub tier_scores: TierMap<f64>,
    pub tier_product_counts: TierMap<usize>,
    pub candidate_pool_size: usize,
    pub diversity_relaxed: bool,
    pub cross_tier_fallback: bool,
    pub selected_products: Vec<SelectedProduct>,
    pub validation: SelectionValidation,
    /// Discovery records left out of the pool before classification.
    #[serde(default)]
    pub excluded_candidates: Vec<ExcludedProduct>,
}

impl SelectionResult {
    pub fn is_empty(&self) -> bool {
        self.status == SelectionStatus::Empty
    }
}
