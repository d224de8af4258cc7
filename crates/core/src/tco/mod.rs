pub mod calculator;
pub mod exporter;

use crate::domain::candidate::CandidateProduct;
use crate::domain::tco::CostEvidence;

pub use calculator::{TcoCalculator, TcoOutcome};
pub use exporter::{verify_export, ExportIssue, TcoExporter};

/// Already-collected cost evidence lookup for a selected product.
pub trait CostSource {
    fn evidence_for(&self, candidate: &CandidateProduct) -> Option<CostEvidence>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoCostEvidence;

impl CostSource for NoCostEvidence {
    fn evidence_for(&self, _candidate: &CandidateProduct) -> Option<CostEvidence> {
        None
    }
}
