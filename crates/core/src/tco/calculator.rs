//! Total cost of ownership.
//!
//! `total_cost = purchase_price + annual_recurring_cost x horizon_years - resale_value`
//!
//! The `annual x horizon` multiplication happens only in [`compute_total`].
//! All arithmetic is checked integer KRW.

use tracing::warn;

use crate::config::{ResaleThresholds, TcoConfig};
use crate::domain::selection::SelectedProduct;
use crate::domain::tco::{CostEvidence, ExcludedProduct, ResaleConfidence, TcoRecord};
use crate::errors::DomainError;

/// Recurring total and grand total for one product, `None` on overflow.
pub fn compute_total(
    purchase_price: i64,
    annual_recurring_cost: i64,
    horizon_years: u32,
    resale_value: i64,
) -> Option<(i64, i64)> {
    let recurring_cost_total = annual_recurring_cost.checked_mul(i64::from(horizon_years))?;
    let total_cost =
        purchase_price.checked_add(recurring_cost_total)?.checked_sub(resale_value)?;
    Some((recurring_cost_total, total_cost))
}

/// Confidence derived from the number of real secondhand transactions.
pub fn resale_confidence(sample_count: u32, thresholds: ResaleThresholds) -> ResaleConfidence {
    if sample_count >= thresholds.high {
        ResaleConfidence::High
    } else if sample_count >= thresholds.medium {
        ResaleConfidence::Medium
    } else if sample_count >= thresholds.low {
        ResaleConfidence::Low
    } else {
        ResaleConfidence::None
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TcoOutcome {
    Included(TcoRecord),
    Excluded(ExcludedProduct),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcoCalculator {
    thresholds: ResaleThresholds,
    min_resale_confidence: ResaleConfidence,
}

impl Default for TcoCalculator {
    fn default() -> Self {
        Self {
            thresholds: ResaleThresholds { low: 1, medium: 3, high: 10 },
            min_resale_confidence: ResaleConfidence::Medium,
        }
    }
}

impl TcoCalculator {
    pub fn new(config: &TcoConfig) -> Self {
        Self {
            thresholds: config.resale_thresholds,
            min_resale_confidence: config.min_resale_confidence,
        }
    }

    /// One TCO record, or an exclusion when no usable purchase price exists.
    ///
    /// Purchase price comes from the evidence when given, else from the
    /// selected candidate. A zero price is only accepted when the evidence
    /// marks it confirmed.
    pub fn calculate(
        &self,
        product: &SelectedProduct,
        evidence: Option<&CostEvidence>,
        horizon_years: u32,
    ) -> Result<TcoOutcome, DomainError> {
        let name = product.candidate.name();
        if horizon_years == 0 {
            return Err(DomainError::invalid(
                format!("tco `{name}`"),
                "horizon_years",
                "must be greater than zero",
            ));
        }

        let default_evidence = CostEvidence::default();
        let evidence = evidence.unwrap_or(&default_evidence);

        let purchase_price = evidence.purchase_price.unwrap_or(product.candidate.price());
        let usable = purchase_price > 0 || (purchase_price == 0 && evidence.price_confirmed);
        if !usable {
            let reason = if purchase_price == 0 {
                "purchase price is 0 and not confirmed".to_string()
            } else {
                format!("purchase price {purchase_price} is negative")
            };
            warn!(
                event_name = "tco.product.excluded",
                product = name,
                reason = reason.as_str(),
                "product excluded from tco export"
            );
            return Ok(TcoOutcome::Excluded(ExcludedProduct { name: name.to_string(), reason }));
        }

        let annual_recurring_cost = annual_recurring_cost(name, evidence)?;

        let resale = evidence.resale.unwrap_or_default();
        let resale_confidence = resale_confidence(resale.sample_count, self.thresholds);
        let mut notes = vec![];
        if !evidence.notes.trim().is_empty() {
            notes.push(evidence.notes.trim().to_string());
        }

        let resale_value = match resale.value {
            Some(value) if value < 0 => {
                return Err(DomainError::invalid(
                    format!("tco `{name}`"),
                    "resale.value",
                    "must not be negative",
                ))
            }
            // Without a single transaction the value is an estimate.
            Some(_) if resale_confidence == ResaleConfidence::None => 0,
            Some(value) if resale_confidence >= self.min_resale_confidence => value,
            Some(value) if value > 0 => {
                notes.push(format!(
                    "resale value {value} ignored: {} confidence from {} sample(s)",
                    confidence_label(resale_confidence),
                    resale.sample_count
                ));
                0
            }
            _ => 0,
        };

        let (recurring_cost_total, total_cost) =
            compute_total(purchase_price, annual_recurring_cost, horizon_years, resale_value)
                .ok_or_else(|| DomainError::ArithmeticOverflow { product: name.to_string() })?;

        Ok(TcoOutcome::Included(TcoRecord {
            name: name.to_string(),
            brand: product.candidate.brand().to_string(),
            manufacturer: product.candidate.manufacturer().to_string(),
            selection_rank: product.rank,
            purchase_price,
            annual_recurring_cost,
            horizon_years,
            recurring_cost_total,
            resale_value,
            resale_confidence,
            resale_sample_count: resale.sample_count,
            total_cost,
            consumable_breakdown: evidence.consumables.clone(),
            notes: notes.join("; "),
        }))
    }
}

/// Yearly recurring cost. An explicit figure wins over the consumable and
/// repair breakdown; missing data counts as zero.
pub fn annual_recurring_cost(name: &str, evidence: &CostEvidence) -> Result<i64, DomainError> {
    let overflow = || DomainError::ArithmeticOverflow { product: name.to_string() };

    let mut breakdown = 0_i64;
    for item in &evidence.consumables {
        let yearly = item.yearly_cost().ok_or_else(overflow)?;
        breakdown = breakdown.checked_add(yearly).ok_or_else(overflow)?;
    }
    let has_breakdown = !evidence.consumables.is_empty() || evidence.annual_repair_cost.is_some();
    breakdown =
        breakdown.checked_add(evidence.annual_repair_cost.unwrap_or(0)).ok_or_else(overflow)?;

    let annual = match evidence.annual_recurring_cost {
        Some(explicit) => {
            if has_breakdown && explicit != breakdown {
                warn!(
                    event_name = "tco.recurring.mismatch",
                    product = name,
                    explicit,
                    breakdown,
                    "explicit annual cost differs from consumable breakdown, using explicit"
                );
            }
            explicit
        }
        None => breakdown,
    };

    if annual < 0 {
        return Err(DomainError::invalid(
            format!("tco `{name}`"),
            "annual_recurring_cost",
            "must not be negative",
        ));
    }
    Ok(annual)
}

fn confidence_label(confidence: ResaleConfidence) -> &'static str {
    match confidence {
        ResaleConfidence::None => "no",
        ResaleConfidence::Low => "low",
        ResaleConfidence::Medium => "medium",
        ResaleConfidence::High => "high",
    }
}
