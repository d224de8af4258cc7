//! Demand scoring from keyword metrics.
//!
//! Score = clicks x 0.4 + cpc x 0.3 + search_volume x 0.2 + competition x 0.1
//! with every dimension min-max normalized across the candidates that have
//! metrics.

use serde::{Deserialize, Serialize};

use crate::domain::metrics::KeywordMetrics;
use crate::domain::selection::ProductScores;

pub const DEFAULT_WEIGHTS: ScoreWeights =
    ScoreWeights { clicks: 0.4, cpc: 0.3, search_volume: 0.2, competition: 0.1 };

/// Weights for scoring components
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight for monthly clicks (default: 0.40)
    pub clicks: f64,
    /// Weight for average cost per click (default: 0.30)
    pub cpc: f64,
    /// Weight for monthly search volume (default: 0.20)
    pub search_volume: f64,
    /// Weight for advertiser competition (default: 0.10)
    pub competition: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProductScorer {
    weights: ScoreWeights,
}

impl ProductScorer {
    pub fn new() -> Self {
        Self { weights: ScoreWeights::default() }
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Scores index-aligned with `metrics`. Candidates without metrics score
    /// zero on every dimension but stay in the pool.
    pub fn score(&self, metrics: &[Option<KeywordMetrics>]) -> Vec<ProductScores> {
        let clicks = Normalizer::over(metrics, |m| m.monthly_clicks as f64);
        let cpc = Normalizer::over(metrics, |m| m.avg_cpc as f64);
        let volume = Normalizer::over(metrics, |m| m.monthly_search_volume as f64);
        let competition = Normalizer::over(metrics, |m| m.competition.signal());

        metrics
            .iter()
            .map(|entry| match entry {
                None => ProductScores::default(),
                Some(m) => {
                    let mut scores = ProductScores {
                        clicks_score: clicks.apply(m.monthly_clicks as f64),
                        cpc_score: cpc.apply(m.avg_cpc as f64),
                        search_volume_score: volume.apply(m.monthly_search_volume as f64),
                        competition_score: competition.apply(m.competition.signal()),
                        total_score: 0.0,
                    };
                    scores.total_score = self.total(&scores);
                    scores
                }
            })
            .collect()
    }

    pub fn total(&self, scores: &ProductScores) -> f64 {
        let total = scores.clicks_score * self.weights.clicks
            + scores.cpc_score * self.weights.cpc
            + scores.search_volume_score * self.weights.search_volume
            + scores.competition_score * self.weights.competition;

        total.clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct Normalizer {
    min: f64,
    max: f64,
}

impl Normalizer {
    fn over(metrics: &[Option<KeywordMetrics>], value: impl Fn(&KeywordMetrics) -> f64) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in metrics.iter().flatten().map(value) {
            min = min.min(v);
            max = max.max(v);
        }
        Self { min, max }
    }

    fn apply(self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 1.0;
        }
        ((value - self.min) / range).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{ProductScorer, ScoreWeights};
    use crate::domain::metrics::{Competition, KeywordMetrics};

    fn metrics(volume: u64, clicks: u64, cpc: u64, competition: Competition) -> KeywordMetrics {
        KeywordMetrics {
            monthly_search_volume: volume,
            monthly_clicks: clicks,
            avg_cpc: cpc,
            competition,
        }
    }

    #[test]
    fn min_max_normalizes_each_dimension() {
        let scorer = ProductScorer::new();
        let scores = scorer.score(&[
            Some(metrics(1_000, 100, 500, Competition::High)),
            Some(metrics(500, 50, 250, Competition::Medium)),
            Some(metrics(0, 0, 0, Competition::Low)),
        ]);

        assert!((scores[0].total_score - 1.0).abs() < 1e-12);
        assert!((scores[1].clicks_score - 0.5).abs() < 1e-12);
        assert!((scores[1].competition_score - 0.5).abs() < 1e-12);
        assert!((scores[1].total_score - 0.5).abs() < 1e-12);
        assert_eq!(scores[2].total_score, 0.0);
    }

    #[test]
    fn identical_values_score_one_on_that_dimension() {
        let scorer = ProductScorer::new();
        let scores = scorer.score(&[
            Some(metrics(700, 10, 300, Competition::Medium)),
            Some(metrics(700, 20, 300, Competition::Medium)),
        ]);

        for score in &scores {
            assert_eq!(score.search_volume_score, 1.0);
            assert_eq!(score.cpc_score, 1.0);
            assert_eq!(score.competition_score, 1.0);
        }
        assert_eq!(scores[0].clicks_score, 0.0);
        assert_eq!(scores[1].clicks_score, 1.0);
    }

    #[test]
    fn missing_metrics_score_zero_without_shifting_the_range() {
        let scorer = ProductScorer::new();
        let scores = scorer.score(&[
            None,
            Some(metrics(900, 90, 900, Competition::High)),
            Some(metrics(100, 10, 100, Competition::Low)),
        ]);

        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].total_score, 0.0);
        assert_eq!(scores[0].clicks_score, 0.0);
        assert!((scores[1].total_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn custom_weights_change_the_total() {
        let scorer = ProductScorer::with_weights(ScoreWeights {
            clicks: 1.0,
            cpc: 0.0,
            search_volume: 0.0,
            competition: 0.0,
        });
        let scores = scorer.score(&[
            Some(metrics(0, 0, 900, Competition::High)),
            Some(metrics(100, 40, 100, Competition::Low)),
        ]);

        assert_eq!(scores[0].total_score, 0.0);
        assert_eq!(scores[1].total_score, 1.0);
    }
}
