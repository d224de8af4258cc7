//! Tiered product selection.
//!
//! classify -> score -> tier-score -> mention bonus -> slot selection ->
//! validation, as one pure pass over already-fetched data.

pub mod bonus;
pub mod classifier;
pub mod scorer;
pub mod slot_selector;
pub mod tier_scorer;
pub mod validator;

use tracing::{debug, info};

use crate::config::SelectionConfig;
use crate::domain::candidate::CandidateProduct;
use crate::domain::metrics::KeywordMetrics;
use crate::domain::selection::{SelectionResult, SelectionStatus};

use self::{
    bonus::MentionBonus,
    classifier::PriceClassifier,
    scorer::ProductScorer,
    slot_selector::{PoolEntry, SlotSelector},
    tier_scorer::TierScorer,
    validator::{SelectionValidator, ValidationContext},
};

/// Keyword metrics lookup for a candidate.
pub trait MetricsSource {
    fn metrics_for(&self, candidate: &CandidateProduct) -> Option<KeywordMetrics>;
}

/// External mention counts (blog and community recommendations).
pub trait MentionSource {
    fn mentions_for(&self, candidate: &CandidateProduct) -> u32;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoMetrics;

impl MetricsSource for NoMetrics {
    fn metrics_for(&self, _candidate: &CandidateProduct) -> Option<KeywordMetrics> {
        None
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoMentions;

impl MentionSource for NoMentions {
    fn mentions_for(&self, _candidate: &CandidateProduct) -> u32 {
        0
    }
}

pub trait SelectionEngine {
    fn select(
        &self,
        category: &str,
        candidates: &[CandidateProduct],
        metrics: &dyn MetricsSource,
        mentions: &dyn MentionSource,
    ) -> SelectionResult;
}

#[derive(Clone, Debug, Default)]
pub struct DeterministicSelectionEngine {
    classifier: PriceClassifier,
    scorer: ProductScorer,
    tier_scorer: TierScorer,
    bonus: MentionBonus,
    slot_selector: SlotSelector,
    validator: SelectionValidator,
}

impl DeterministicSelectionEngine {
    pub fn new(config: &SelectionConfig) -> Self {
        let classifier = if config.enforce_tier_price_ratio {
            PriceClassifier::with_max_ratio(config.max_tier_price_ratio)
        } else {
            PriceClassifier::new()
        };

        Self {
            classifier,
            scorer: ProductScorer::with_weights(config.weights),
            tier_scorer: TierScorer,
            bonus: MentionBonus::from(config.mention_bonus),
            slot_selector: SlotSelector::default(),
            validator: SelectionValidator::new(config.max_tier_price_ratio),
        }
    }
}

impl SelectionEngine for DeterministicSelectionEngine {
    fn select(
        &self,
        category: &str,
        candidates: &[CandidateProduct],
        metrics: &dyn MetricsSource,
        mentions: &dyn MentionSource,
    ) -> SelectionResult {
        let tiers = self.classifier.classify(candidates);
        let keyword_metrics: Vec<Option<KeywordMetrics>> =
            candidates.iter().map(|candidate| metrics.metrics_for(candidate)).collect();
        let scores = self.scorer.score(&keyword_metrics);
        let ranking = self.tier_scorer.rank(&tiers, &scores);
        debug!(
            event_name = "selection.tiers.ranked",
            category,
            premium = ranking.scores.premium,
            mid = ranking.scores.mid,
            budget = ranking.scores.budget,
            "tier aggregates computed"
        );

        let winner = ranking.winner();
        let winner_tier_size = winner.map_or(0, |tier| *ranking.counts.get(tier));

        // Bonus is applied only now that the winner is fixed.
        let pool: Vec<PoolEntry> = candidates
            .iter()
            .zip(tiers)
            .zip(scores)
            .zip(keyword_metrics)
            .map(|(((candidate, tier), scores), keyword_metrics)| {
                let mentions = mentions.mentions_for(candidate);
                PoolEntry {
                    candidate: candidate.clone(),
                    tier,
                    scores,
                    keyword_metrics,
                    mentions,
                    mention_bonus: self.bonus.for_mentions(mentions),
                }
            })
            .collect();

        let selection = self.slot_selector.select(&pool, &ranking.order());
        let validation = self.validator.validate(
            &selection.products,
            ValidationContext {
                winner,
                winner_tier_size,
                diversity_relaxed: selection.diversity_relaxed,
            },
        );

        let status = match winner {
            Some(tier) => {
                info!(
                    event_name = "selection.tier.selected",
                    category,
                    tier = tier.as_str(),
                    pool_size = candidates.len(),
                    picks = selection.products.len(),
                    "winning tier selected"
                );
                SelectionStatus::Selected
            }
            None => {
                info!(event_name = "selection.pool.empty", category, "no candidates to select from");
                SelectionStatus::Empty
            }
        };

        let failed = validation.failed_checks();
        if !failed.is_empty() {
            info!(
                event_name = "selection.validation.failed",
                category,
                checks = %failed.join(","),
                "advisory validation checks failed"
            );
        }

        SelectionResult {
            category: category.to_string(),
            status,
            selected_tier: winner,
            tier_scores: ranking.scores,
            tier_product_counts: ranking.counts,
            candidate_pool_size: candidates.len(),
            diversity_relaxed: selection.diversity_relaxed,
            cross_tier_fallback: selection.cross_tier_fallback,
            selected_products: selection.products,
            validation,
            excluded_candidates: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DeterministicSelectionEngine, NoMentions, NoMetrics, SelectionEngine};
    use crate::domain::candidate::CandidateProduct;
    use crate::domain::manufacturer::ManufacturerResolver;
    use crate::domain::selection::SelectionStatus;
    use crate::domain::tier::Tier;

    #[test]
    fn empty_pool_yields_explicit_empty_result() {
        let result = DeterministicSelectionEngine::default().select(
            "로봇청소기",
            &[],
            &NoMetrics,
            &NoMentions,
        );

        assert_eq!(result.status, SelectionStatus::Empty);
        assert!(result.is_empty());
        assert_eq!(result.selected_tier, None);
        assert!(result.selected_products.is_empty());
        assert_eq!(result.tier_product_counts.mid, 0);
    }

    #[test]
    fn pool_without_metrics_still_selects_three() {
        let resolver = ManufacturerResolver::default();
        let candidates: Vec<CandidateProduct> = [
            ("삼성 제트 A", 300_000),
            ("LG 코드제로 A", 320_000),
            ("다이슨 V12", 340_000),
            ("로보락 H7", 360_000),
            ("샤오미 G10", 380_000),
        ]
        .into_iter()
        .enumerate()
        .map(|(index, (name, price))| {
            CandidateProduct::new(name, "", "무선청소기", "", price, index as u32 + 1, &resolver)
                .expect("valid candidate")
        })
        .collect();

        let result = DeterministicSelectionEngine::default().select(
            "무선청소기",
            &candidates,
            &NoMetrics,
            &NoMentions,
        );

        assert_eq!(result.status, SelectionStatus::Selected);
        assert_eq!(result.selected_products.len(), 3);
        // All scores are zero: budget and premium have 2 each, mid has 1, so
        // depth decides and premium wins over budget on the fixed order.
        assert_eq!(result.selected_tier, Some(Tier::Premium));
        assert!(result.cross_tier_fallback);
        assert!(result.validation.keyword_data.is_failure());
    }

    #[test]
    fn two_candidate_pool_fails_brand_diversity() {
        let resolver = ManufacturerResolver::default();
        let candidates = vec![
            CandidateProduct::new("삼성 제트", "", "무선청소기", "", 300_000, 1, &resolver)
                .expect("valid candidate"),
            CandidateProduct::new("LG 코드제로", "", "무선청소기", "", 320_000, 2, &resolver)
                .expect("valid candidate"),
        ];

        let result = DeterministicSelectionEngine::default().select(
            "무선청소기",
            &candidates,
            &NoMetrics,
            &NoMentions,
        );

        assert_eq!(result.selected_products.len(), 2);
        assert!(result.validation.brand_diversity.is_failure());
        assert!(result.validation.failed_checks().contains(&"brand_diversity"));
    }
}
