use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::selection::SelectionResult;
use crate::domain::tco::{CostExtreme, ResaleConfidence, TcoExport, TcoRecord, TcoSummary};
use crate::errors::DomainError;

use super::calculator::{compute_total, TcoCalculator, TcoOutcome};
use super::CostSource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcoExporter {
    calculator: TcoCalculator,
}

impl TcoExporter {
    pub fn new(calculator: TcoCalculator) -> Self {
        Self { calculator }
    }

    /// Build the interchange document for one selection. Tier metadata is
    /// passed through untouched.
    pub fn export(
        &self,
        selection: &SelectionResult,
        costs: &dyn CostSource,
        horizon_years: u32,
    ) -> Result<TcoExport, DomainError> {
        let mut products = Vec::with_capacity(selection.selected_products.len());
        let mut excluded = Vec::new();

        for product in &selection.selected_products {
            let evidence = costs.evidence_for(&product.candidate);
            match self.calculator.calculate(product, evidence.as_ref(), horizon_years)? {
                TcoOutcome::Included(record) => products.push(record),
                TcoOutcome::Excluded(product) => excluded.push(product),
            }
        }

        let summary = summarize(&products);
        info!(
            event_name = "tco.export.built",
            category = selection.category.as_str(),
            horizon_years,
            products = products.len(),
            excluded = excluded.len(),
            "tco export built"
        );

        Ok(TcoExport {
            category: selection.category.clone(),
            horizon_years,
            selected_tier: selection.selected_tier,
            tier_scores: selection.tier_scores,
            tier_product_counts: selection.tier_product_counts,
            products,
            excluded,
            summary,
        })
    }
}

/// Cheapest and most expensive totals; ties keep selection order.
pub fn summarize(products: &[TcoRecord]) -> Option<TcoSummary> {
    let mut cheapest = products.first()?;
    let mut most_expensive = cheapest;
    for record in products {
        if record.total_cost < cheapest.total_cost {
            cheapest = record;
        }
        if record.total_cost > most_expensive.total_cost {
            most_expensive = record;
        }
    }

    let cost_difference = most_expensive.total_cost.saturating_sub(cheapest.total_cost);
    let cost_difference_pct = if cheapest.total_cost > 0 {
        (cost_difference as f64 / cheapest.total_cost as f64 * 100.0).round() as i64
    } else {
        0
    };

    Some(TcoSummary {
        cheapest: CostExtreme { name: cheapest.name.clone(), total_cost: cheapest.total_cost },
        most_expensive: CostExtreme {
            name: most_expensive.name.clone(),
            total_cost: most_expensive.total_cost,
        },
        cost_difference,
        cost_difference_pct,
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportIssue {
    pub product: String,
    pub message: String,
}

impl ExportIssue {
    fn new(product: &str, message: impl Into<String>) -> Self {
        Self { product: product.to_string(), message: message.into() }
    }
}

/// Re-derive every numeric field of an export. Empty means consistent.
pub fn verify_export(export: &TcoExport) -> Vec<ExportIssue> {
    let mut issues = Vec::new();

    for record in &export.products {
        let name = record.name.as_str();
        if record.purchase_price < 0 {
            issues.push(ExportIssue::new(name, "purchase_price is negative"));
        }
        if record.annual_recurring_cost < 0 {
            issues.push(ExportIssue::new(name, "annual_recurring_cost is negative"));
        }
        if record.resale_value < 0 {
            issues.push(ExportIssue::new(name, "resale_value is negative"));
        }
        if record.horizon_years == 0 {
            issues.push(ExportIssue::new(name, "horizon_years must be positive"));
        }
        if record.horizon_years != export.horizon_years {
            issues.push(ExportIssue::new(
                name,
                format!(
                    "horizon_years {} differs from export horizon {}",
                    record.horizon_years, export.horizon_years
                ),
            ));
        }
        if record.resale_confidence == ResaleConfidence::None && record.resale_value != 0 {
            issues.push(ExportIssue::new(name, "resale_value must be 0 without confidence"));
        }

        match compute_total(
            record.purchase_price,
            record.annual_recurring_cost,
            record.horizon_years,
            record.resale_value,
        ) {
            Some((recurring, total)) => {
                if recurring != record.recurring_cost_total {
                    issues.push(ExportIssue::new(
                        name,
                        format!(
                            "recurring_cost_total {} != {} x {} = {recurring}",
                            record.recurring_cost_total,
                            record.annual_recurring_cost,
                            record.horizon_years
                        ),
                    ));
                }
                if total != record.total_cost {
                    issues.push(ExportIssue::new(
                        name,
                        format!("total_cost {} != recomputed {total}", record.total_cost),
                    ));
                }
            }
            None => issues.push(ExportIssue::new(name, "total_cost overflows")),
        }
    }

    if summarize(&export.products) != export.summary {
        issues.push(ExportIssue::new("summary", "summary does not match product totals"));
    }

    issues
}
