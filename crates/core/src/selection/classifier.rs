//! Percentile price tiers over the current candidate pool.

use tracing::warn;

use crate::domain::candidate::CandidateProduct;
use crate::domain::tier::Tier;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PriceClassifier {
    /// When set, budget and mid tiers wider than this max/min price ratio are
    /// split at their largest gap and the upper part promoted.
    max_tier_price_ratio: Option<f64>,
}

impl PriceClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_ratio(max_tier_price_ratio: f64) -> Self {
        Self { max_tier_price_ratio: Some(max_tier_price_ratio) }
    }

    /// Tier per candidate, index-aligned with the input.
    pub fn classify(&self, candidates: &[CandidateProduct]) -> Vec<Tier> {
        let prices: Vec<i64> = candidates.iter().map(CandidateProduct::price).collect();
        self.classify_prices(&prices)
    }

    pub fn classify_prices(&self, prices: &[i64]) -> Vec<Tier> {
        let mut tiers = percentile_tiers(prices);
        if let Some(max_ratio) = self.max_tier_price_ratio {
            enforce_max_ratio(prices, &mut tiers, max_ratio);
        }
        tiers
    }
}

/// Number of budget (and of premium) slots for a pool of `n`: `ceil(0.3 * n)`.
pub fn edge_tier_size(n: usize) -> usize {
    (n * 3).div_ceil(10)
}

fn percentile_tiers(prices: &[i64]) -> Vec<Tier> {
    let n = prices.len();
    let mut tiers = vec![Tier::Mid; n];
    if n < 2 {
        return tiers;
    }

    // Stable: equal prices keep input order.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&index| prices[index]);

    let edge = edge_tier_size(n);
    for (position, &index) in order.iter().enumerate() {
        tiers[index] = if position < edge {
            Tier::Budget
        } else if position >= n - edge {
            Tier::Premium
        } else {
            Tier::Mid
        };
    }

    tiers
}

fn enforce_max_ratio(prices: &[i64], tiers: &mut [Tier], max_ratio: f64) {
    for tier in Tier::ALL {
        loop {
            let mut members: Vec<usize> =
                (0..tiers.len()).filter(|&index| tiers[index] == tier).collect();
            if members.len() < 2 {
                break;
            }
            members.sort_by_key(|&index| prices[index]);

            let min_price = prices[members[0]];
            let max_price = prices[members[members.len() - 1]];
            if min_price <= 0 {
                break;
            }
            let ratio = max_price as f64 / min_price as f64;
            if ratio <= max_ratio {
                break;
            }

            let Some(promoted) = tier.promoted() else {
                warn!(
                    event_name = "selection.classifier.premium_spread",
                    tier = tier.as_str(),
                    ratio,
                    max_ratio,
                    "premium tier exceeds price ratio and cannot be promoted"
                );
                break;
            };

            let mut gap_at = 1;
            let mut largest_gap = 0_i64;
            for window in 1..members.len() {
                let gap = prices[members[window]] - prices[members[window - 1]];
                if gap > largest_gap {
                    largest_gap = gap;
                    gap_at = window;
                }
            }

            warn!(
                event_name = "selection.classifier.tier_split",
                tier = tier.as_str(),
                promoted_to = promoted.as_str(),
                ratio,
                max_ratio,
                promoted_count = members.len() - gap_at,
                "tier price ratio exceeded, splitting at largest gap"
            );
            for &index in &members[gap_at..] {
                tiers[index] = promoted;
            }
        }
    }
}
