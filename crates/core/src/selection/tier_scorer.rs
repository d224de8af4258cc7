//! Tier aggregation and winner selection.

use serde::{Deserialize, Serialize};

use crate::domain::selection::ProductScores;
use crate::domain::tier::{Tier, TierMap};

/// Number of top scores summed per tier.
pub const TOP_N: usize = 3;

const SCORE_GRID: f64 = 1e9;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierScore {
    pub tier: Tier,
    pub score: f64,
    pub candidate_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TierRanking {
    /// Non-empty tiers, best first.
    pub ranked: Vec<TierScore>,
    pub scores: TierMap<f64>,
    pub counts: TierMap<usize>,
}

impl TierRanking {
    pub fn winner(&self) -> Option<Tier> {
        self.ranked.first().map(|entry| entry.tier)
    }

    /// Runner-up tier, first source for cross-tier fallback.
    pub fn adjacent(&self) -> Option<Tier> {
        self.ranked.get(1).map(|entry| entry.tier)
    }

    pub fn order(&self) -> Vec<Tier> {
        self.ranked.iter().map(|entry| entry.tier).collect()
    }
}

/// Multiplier applied to shallow tiers so two strong products cannot beat
/// three decent ones by default.
pub fn depth_penalty(candidate_count: usize) -> f64 {
    match candidate_count {
        0 => 0.0,
        1 => 1.0 / 3.0,
        2 => 2.0 / 3.0,
        _ => 1.0,
    }
}

/// Sum of the top three scores times the depth penalty.
pub fn aggregate(scores: &[f64]) -> f64 {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|left, right| right.total_cmp(left));
    let top: f64 = sorted.iter().take(TOP_N).sum();
    top * depth_penalty(scores.len())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TierScorer;

impl TierScorer {
    /// `tiers` and `scores` are index-aligned with the candidate pool.
    pub fn rank(&self, tiers: &[Tier], scores: &[ProductScores]) -> TierRanking {
        let per_tier = TierMap::from_fn(|tier| {
            tiers
                .iter()
                .zip(scores)
                .filter(|(assigned, _)| **assigned == tier)
                .map(|(_, score)| score.total_score)
                .collect::<Vec<f64>>()
        });

        let counts = TierMap::from_fn(|tier| per_tier.get(tier).len());
        let aggregates = TierMap::from_fn(|tier| aggregate(per_tier.get(tier)));

        let mut ranked: Vec<TierScore> = Tier::ALL
            .into_iter()
            .filter(|tier| *counts.get(*tier) > 0)
            .map(|tier| TierScore {
                tier,
                score: *aggregates.get(tier),
                candidate_count: *counts.get(tier),
            })
            .collect();

        ranked.sort_by(|left, right| {
            quantize(right.score)
                .cmp(&quantize(left.score))
                .then_with(|| right.candidate_count.cmp(&left.candidate_count))
                .then_with(|| left.tier.tie_break_order().cmp(&right.tier.tie_break_order()))
        });

        TierRanking { ranked, scores: aggregates, counts }
    }
}

fn quantize(score: f64) -> i64 {
    (score * SCORE_GRID).round() as i64
}

#[cfg(test)]
mod tests {
    use super::{aggregate, depth_penalty, TierScorer};
    use crate::domain::selection::ProductScores;
    use crate::domain::tier::Tier;

    fn scored(total: f64) -> ProductScores {
        ProductScores { total_score: total, ..ProductScores::default() }
    }

    #[test]
    fn aggregate_sums_top_three_only() {
        assert!((aggregate(&[0.1, 0.9, 0.5, 0.7]) - 2.1).abs() < 1e-12);
    }

    #[test]
    fn shallow_tiers_are_penalized() {
        assert!((aggregate(&[0.9, 0.9]) - 1.2).abs() < 1e-12);
        assert!((aggregate(&[0.9]) - 0.3).abs() < 1e-12);
        assert_eq!(aggregate(&[]), 0.0);
        assert_eq!(depth_penalty(7), 1.0);
    }

    #[test]
    fn two_perfect_products_lose_to_three_solid_ones() {
        let tiers = [Tier::Premium, Tier::Premium, Tier::Mid, Tier::Mid, Tier::Mid];
        let scores = [scored(1.0), scored(1.0), scored(0.5), scored(0.5), scored(0.5)];

        let ranking = TierScorer.rank(&tiers, &scores);

        assert_eq!(ranking.winner(), Some(Tier::Mid));
        assert_eq!(ranking.adjacent(), Some(Tier::Premium));
        assert_eq!(*ranking.counts.get(Tier::Budget), 0);
        assert_eq!(ranking.order(), vec![Tier::Mid, Tier::Premium]);
    }

    #[test]
    fn ties_break_on_depth_then_fixed_order() {
        let tiers = [Tier::Budget, Tier::Budget, Tier::Budget, Tier::Premium, Tier::Premium, Tier::Premium];
        let scores = [scored(0.0); 6];
        let ranking = TierScorer.rank(&tiers, &scores);
        assert_eq!(ranking.order(), vec![Tier::Premium, Tier::Budget]);

        let tiers = [Tier::Budget, Tier::Budget, Tier::Budget, Tier::Budget, Tier::Premium, Tier::Premium, Tier::Premium];
        let scores = [scored(0.0); 7];
        let ranking = TierScorer.rank(&tiers, &scores);
        assert_eq!(ranking.winner(), Some(Tier::Budget));
    }

    #[test]
    fn equal_sums_in_different_orders_tie_on_the_grid() {
        let tiers = [Tier::Mid, Tier::Mid, Tier::Mid, Tier::Premium, Tier::Premium, Tier::Premium];
        let scores = [scored(0.1), scored(0.2), scored(0.3), scored(0.3), scored(0.2), scored(0.1)];

        let ranking = TierScorer.rank(&tiers, &scores);

        assert_eq!(ranking.winner(), Some(Tier::Mid));
    }
}
