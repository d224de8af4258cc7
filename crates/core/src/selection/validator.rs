use std::collections::BTreeSet;

use crate::domain::selection::{SelectedProduct, SelectionValidation, ValidationOutcome};
use crate::domain::tier::Tier;

use super::slot_selector::DEFAULT_SLOTS;

/// What the validator needs to know about how the picks were made.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidationContext {
    pub winner: Option<Tier>,
    /// Winning tier size before any cross-tier fallback.
    pub winner_tier_size: usize,
    pub diversity_relaxed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionValidator {
    max_price_ratio: f64,
}

impl Default for SelectionValidator {
    fn default() -> Self {
        Self { max_price_ratio: 3.0 }
    }
}

impl SelectionValidator {
    pub fn new(max_price_ratio: f64) -> Self {
        Self { max_price_ratio }
    }

    /// Advisory only: reads the picks, never changes them.
    pub fn validate(
        &self,
        products: &[SelectedProduct],
        context: ValidationContext,
    ) -> SelectionValidation {
        SelectionValidation {
            brand_diversity: brand_diversity(products, context.diversity_relaxed),
            tier_depth: tier_depth(context),
            keyword_data: keyword_data(products),
            price_spread: self.price_spread(products),
        }
    }

    fn price_spread(&self, products: &[SelectedProduct]) -> ValidationOutcome {
        let prices = products.iter().map(|product| product.candidate.price());
        let (Some(min), Some(max)) = (prices.clone().min(), prices.max()) else {
            return ValidationOutcome::pass("no picks to compare");
        };
        if min <= 0 {
            return ValidationOutcome::fail("a pick has a non-positive price");
        }

        let ratio = max as f64 / min as f64;
        let message = format!(
            "price ratio {ratio:.2}x across picks (limit {:.2}x, {min}..{max} KRW)",
            self.max_price_ratio
        );
        if ratio <= self.max_price_ratio {
            ValidationOutcome::pass(message)
        } else {
            ValidationOutcome::fail(message)
        }
    }
}

fn brand_diversity(products: &[SelectedProduct], diversity_relaxed: bool) -> ValidationOutcome {
    let distinct: BTreeSet<&str> =
        products.iter().map(|product| product.candidate.manufacturer()).collect();

    if distinct.len() == products.len() && products.len() >= DEFAULT_SLOTS {
        ValidationOutcome::pass(format!("{} distinct manufacturer(s)", distinct.len()))
    } else if distinct.len() == products.len() {
        ValidationOutcome::fail(format!(
            "only {} pick(s); {DEFAULT_SLOTS} distinct manufacturers are needed",
            products.len()
        ))
    } else if diversity_relaxed {
        ValidationOutcome::relaxed(format!(
            "only {} distinct manufacturer(s) across {} picks; diversity was relaxed",
            distinct.len(),
            products.len()
        ))
    } else {
        ValidationOutcome::fail(format!(
            "duplicate manufacturers: {} distinct across {} picks",
            distinct.len(),
            products.len()
        ))
    }
}

fn tier_depth(context: ValidationContext) -> ValidationOutcome {
    let Some(winner) = context.winner else {
        return ValidationOutcome::fail("no winning tier: candidate pool is empty");
    };

    if context.winner_tier_size >= 3 {
        ValidationOutcome::pass(format!(
            "{winner} tier had {} candidates",
            context.winner_tier_size
        ))
    } else {
        ValidationOutcome::fail(format!(
            "{winner} tier had only {} candidate(s) before fallback",
            context.winner_tier_size
        ))
    }
}

fn keyword_data(products: &[SelectedProduct]) -> ValidationOutcome {
    let with_demand = products
        .iter()
        .filter(|product| product.keyword_metrics.is_some_and(|metrics| metrics.has_demand()))
        .count();

    if with_demand > 0 {
        ValidationOutcome::pass(format!("{with_demand} pick(s) have keyword clicks"))
    } else {
        ValidationOutcome::fail("no pick has keyword metrics with clicks > 0")
    }
}
