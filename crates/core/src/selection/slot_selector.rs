//! Top-N picks inside the winning tier with manufacturer diversity.
//!
//! Order of fallbacks: distinct manufacturers in the winning tier, then any
//! remaining product of the winning tier, then the next-ranked tiers one at a
//! time, each exhausted (distinct manufacturers first) before the next. A pool
//! with at least `slots` candidates always yields exactly `slots` picks.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::info;

use crate::domain::candidate::CandidateProduct;
use crate::domain::metrics::KeywordMetrics;
use crate::domain::selection::{ProductScores, SelectedProduct};
use crate::domain::tier::Tier;

pub const DEFAULT_SLOTS: usize = 3;

/// A classified, scored candidate ready for slot selection.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolEntry {
    pub candidate: CandidateProduct,
    pub tier: Tier,
    pub scores: ProductScores,
    pub keyword_metrics: Option<KeywordMetrics>,
    pub mentions: u32,
    pub mention_bonus: f64,
}

impl PoolEntry {
    /// Score used for within-tier ordering. Tier scoring never sees the bonus.
    pub fn ranking_score(&self) -> f64 {
        self.scores.total_score + self.mention_bonus
    }
}

/// Total order: ranking score desc, source rank asc, name asc.
pub fn ranking_order(left: &PoolEntry, right: &PoolEntry) -> Ordering {
    right
        .ranking_score()
        .total_cmp(&left.ranking_score())
        .then_with(|| left.candidate.source_rank().cmp(&right.candidate.source_rank()))
        .then_with(|| left.candidate.name().cmp(right.candidate.name()))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotSelection {
    pub products: Vec<SelectedProduct>,
    pub diversity_relaxed: bool,
    pub cross_tier_fallback: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PickKind {
    Distinct,
    Relaxed,
    CrossTier,
    CrossTierRelaxed,
}

impl PickKind {
    fn is_relaxed(self) -> bool {
        matches!(self, Self::Relaxed | Self::CrossTierRelaxed)
    }

    fn is_cross_tier(self) -> bool {
        matches!(self, Self::CrossTier | Self::CrossTierRelaxed)
    }
}

struct Pick<'a> {
    entry: &'a PoolEntry,
    kind: PickKind,
    rank_in_tier: usize,
    tier_size: usize,
}

struct RankedTier<'a> {
    entries: Vec<&'a PoolEntry>,
    taken: Vec<bool>,
}

impl<'a> RankedTier<'a> {
    fn new(pool: &'a [PoolEntry], tier: Tier) -> Self {
        let mut entries: Vec<&PoolEntry> =
            pool.iter().filter(|entry| entry.tier == tier).collect();
        entries.sort_by(|left, right| ranking_order(left, right));
        let taken = vec![false; entries.len()];
        Self { entries, taken }
    }

    fn fill(
        &mut self,
        picks: &mut Vec<Pick<'a>>,
        used: &mut BTreeSet<&'a str>,
        slots: usize,
        kind: PickKind,
    ) {
        let tier_size = self.entries.len();
        for (position, &entry) in self.entries.iter().enumerate() {
            if picks.len() >= slots {
                return;
            }
            if self.taken[position] {
                continue;
            }
            let manufacturer = entry.candidate.manufacturer();
            if !kind.is_relaxed() && used.contains(manufacturer) {
                continue;
            }

            self.taken[position] = true;
            used.insert(manufacturer);
            picks.push(Pick { entry, kind, rank_in_tier: position + 1, tier_size });
        }
    }

    fn distinct_manufacturers(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.candidate.manufacturer())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotSelector {
    slots: usize,
}

impl Default for SlotSelector {
    fn default() -> Self {
        Self { slots: DEFAULT_SLOTS }
    }
}

impl SlotSelector {
    pub fn with_slots(slots: usize) -> Self {
        Self { slots }
    }

    /// `tier_order` is the tier ranking, winner first.
    pub fn select(&self, pool: &[PoolEntry], tier_order: &[Tier]) -> SlotSelection {
        let Some((&winner, fallback_tiers)) = tier_order.split_first() else {
            return SlotSelection::default();
        };

        let mut picks: Vec<Pick<'_>> = Vec::with_capacity(self.slots);
        let mut used: BTreeSet<&str> = BTreeSet::new();

        let mut winning = RankedTier::new(pool, winner);
        winning.fill(&mut picks, &mut used, self.slots, PickKind::Distinct);
        winning.fill(&mut picks, &mut used, self.slots, PickKind::Relaxed);
        picks.sort_by(|left, right| ranking_order(left.entry, right.entry));

        if picks.len() < self.slots {
            // The adjacent tier is used up before the next one is touched.
            for tier in fallback_tiers {
                let mut other = RankedTier::new(pool, *tier);
                other.fill(&mut picks, &mut used, self.slots, PickKind::CrossTier);
                other.fill(&mut picks, &mut used, self.slots, PickKind::CrossTierRelaxed);
            }
        }

        let diversity_relaxed = picks.iter().any(|pick| pick.kind.is_relaxed());
        let cross_tier_fallback = picks.iter().any(|pick| pick.kind.is_cross_tier());
        let winner_size = winning.entries.len();
        let winner_distinct = winning.distinct_manufacturers();

        if diversity_relaxed {
            info!(
                event_name = "selection.diversity.relaxed",
                tier = winner.as_str(),
                distinct_manufacturers = winner_distinct,
                "not enough distinct manufacturers, diversity relaxed"
            );
        }
        if cross_tier_fallback {
            info!(
                event_name = "selection.fallback.cross_tier",
                tier = winner.as_str(),
                tier_size = winner_size,
                "winning tier too shallow, pulling from next-ranked tiers"
            );
        }

        let products = picks
            .iter()
            .enumerate()
            .map(|(index, pick)| {
                let mut reasons = pick_reasons(pick, winner, winner_size);
                if diversity_relaxed {
                    reasons.push(format!(
                        "brand diversity relaxed: {winner} tier has {winner_distinct} distinct manufacturer(s) among {winner_size} candidate(s)"
                    ));
                }

                SelectedProduct {
                    rank: u32::try_from(index + 1).unwrap_or(u32::MAX),
                    candidate: pick.entry.candidate.clone(),
                    tier: pick.entry.tier,
                    scores: pick.entry.scores,
                    mention_bonus: pick.entry.mention_bonus,
                    cross_tier: pick.kind.is_cross_tier(),
                    keyword_metrics: pick.entry.keyword_metrics,
                    selection_reasons: reasons,
                    differentiation: String::new(),
                }
            })
            .collect();

        SlotSelection { products, diversity_relaxed, cross_tier_fallback }
    }
}

fn pick_reasons(pick: &Pick<'_>, winner: Tier, winner_size: usize) -> Vec<String> {
    let entry = pick.entry;
    let tier = entry.tier;
    let mut reasons = Vec::new();

    if pick.kind.is_cross_tier() {
        reasons.push(format!(
            "tier: {tier} (cross-tier fallback: winning {winner} tier had only {winner_size} candidate(s))"
        ));
    } else {
        reasons.push(format!("tier: {tier} (winning tier)"));
    }

    reasons.push(format!("rank {} of {} in {tier} tier", pick.rank_in_tier, pick.tier_size));

    match entry.keyword_metrics {
        Some(metrics) => reasons.push(format!(
            "demand score {:.3} (clicks {}, cpc {}, search volume {})",
            entry.scores.total_score,
            metrics.monthly_clicks,
            metrics.avg_cpc,
            metrics.monthly_search_volume
        )),
        None => reasons.push(format!(
            "demand score {:.3} (no keyword metrics)",
            entry.scores.total_score
        )),
    }

    if entry.mention_bonus > 0.0 {
        reasons.push(format!(
            "mention bonus +{:.3} from {} mention(s), ordering only",
            entry.mention_bonus, entry.mentions
        ));
    }

    if pick.kind.is_relaxed() {
        let manufacturer = match entry.candidate.manufacturer() {
            "" => "unknown",
            other => other,
        };
        reasons.push(format!("shares manufacturer {manufacturer} with an earlier pick"));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::{PoolEntry, SlotSelector};
    use crate::domain::candidate::CandidateProduct;
    use crate::domain::manufacturer::ManufacturerResolver;
    use crate::domain::selection::ProductScores;
    use crate::domain::tier::Tier;

    fn entry(name: &str, brand: &str, tier: Tier, score: f64, rank: u32) -> PoolEntry {
        let candidate = CandidateProduct::new(
            name,
            brand,
            "test",
            "",
            100_000,
            rank,
            &ManufacturerResolver::default(),
        )
        .expect("valid candidate");
        PoolEntry {
            candidate,
            tier,
            scores: ProductScores { total_score: score, ..ProductScores::default() },
            keyword_metrics: None,
            mentions: 0,
            mention_bonus: 0.0,
        }
    }

    fn names(selection: &super::SlotSelection) -> Vec<&str> {
        selection.products.iter().map(|product| product.candidate.name()).collect()
    }

    #[test]
    fn picks_distinct_manufacturers_by_score() {
        let pool = vec![
            entry("A1", "에이", Tier::Mid, 0.9, 1),
            entry("A2", "에이", Tier::Mid, 0.8, 2),
            entry("B1", "비", Tier::Mid, 0.7, 3),
            entry("C1", "씨", Tier::Mid, 0.6, 4),
        ];

        let selection = SlotSelector::default().select(&pool, &[Tier::Mid]);

        assert_eq!(names(&selection), vec!["A1", "B1", "C1"]);
        assert!(!selection.diversity_relaxed);
        assert!(!selection.cross_tier_fallback);
        assert_eq!(selection.products[2].rank, 3);
    }

    #[test]
    fn relaxes_diversity_inside_the_tier_before_leaving_it() {
        let pool = vec![
            entry("D1", "디", Tier::Premium, 0.9, 1),
            entry("D2", "디", Tier::Premium, 0.8, 2),
            entry("D3", "디", Tier::Premium, 0.7, 3),
            entry("E1", "이", Tier::Mid, 0.1, 4),
        ];

        let selection = SlotSelector::default().select(&pool, &[Tier::Premium, Tier::Mid]);

        assert_eq!(names(&selection), vec!["D1", "D2", "D3"]);
        assert!(selection.diversity_relaxed);
        assert!(!selection.cross_tier_fallback);
        for product in &selection.products {
            assert!(product.selection_reasons.iter().any(|reason| reason.contains("relaxed")));
        }
    }

    #[test]
    fn shallow_tier_pulls_from_next_ranked_tier_with_reason() {
        let pool = vec![
            entry("P1", "피", Tier::Premium, 0.9, 1),
            entry("P2", "큐", Tier::Premium, 0.8, 2),
            entry("M1", "피", Tier::Mid, 0.9, 3),
            entry("M2", "알", Tier::Mid, 0.2, 4),
            entry("B1", "에스", Tier::Budget, 0.5, 5),
        ];

        let selection =
            SlotSelector::default().select(&pool, &[Tier::Premium, Tier::Mid, Tier::Budget]);

        assert_eq!(names(&selection), vec!["P1", "P2", "M2"]);
        assert!(selection.cross_tier_fallback);
        assert!(!selection.diversity_relaxed);
        let pulled = &selection.products[2];
        assert!(pulled.cross_tier);
        assert!(pulled.selection_reasons[0].contains("cross-tier fallback"));
    }

    #[test]
    fn adjacent_tier_is_exhausted_before_the_third_tier() {
        let pool = vec![
            entry("P1", "피", Tier::Premium, 0.9, 1),
            entry("M1", "엠", Tier::Mid, 0.8, 2),
            entry("M2", "엠", Tier::Mid, 0.7, 3),
            entry("B1", "비", Tier::Budget, 0.9, 4),
        ];

        let selection =
            SlotSelector::default().select(&pool, &[Tier::Premium, Tier::Mid, Tier::Budget]);

        assert_eq!(names(&selection), vec!["P1", "M1", "M2"]);
        assert!(selection.cross_tier_fallback);
        assert!(selection.diversity_relaxed);
        assert!(selection.products.iter().skip(1).all(|product| product.tier == Tier::Mid));
    }

    #[test]
    fn ties_resolve_by_source_rank_then_name() {
        let pool = vec![
            entry("Zeta", "가", Tier::Mid, 0.5, 2),
            entry("Beta", "나", Tier::Mid, 0.5, 1),
            entry("Alpha", "다", Tier::Mid, 0.5, 2),
        ];

        let selection = SlotSelector::default().select(&pool, &[Tier::Mid]);

        assert_eq!(names(&selection), vec!["Beta", "Alpha", "Zeta"]);
    }

    #[test]
    fn mention_bonus_reorders_within_tier() {
        let mut boosted = entry("Quiet", "가", Tier::Mid, 0.50, 3);
        boosted.mentions = 20;
        boosted.mention_bonus = 0.08;
        let pool = vec![entry("Loud", "나", Tier::Mid, 0.55, 1), boosted, entry("Other", "다", Tier::Mid, 0.1, 2)];

        let selection = SlotSelector::default().select(&pool, &[Tier::Mid]);

        assert_eq!(names(&selection), vec!["Quiet", "Loud", "Other"]);
        assert_eq!(selection.products[0].scores.total_score, 0.50);
        assert!(selection.products[0].selection_reasons.iter().any(|reason| reason.contains("mention bonus")));
    }

    #[test]
    fn empty_order_selects_nothing() {
        let selection = SlotSelector::default().select(&[], &[]);
        assert!(selection.products.is_empty());
    }
}
