pub mod boundary;
pub mod config;
pub mod domain;
pub mod errors;
pub mod selection;
pub mod tco;

pub use boundary::{CandidatePool, CostTable, MentionTable, MetricsTable};
pub use domain::candidate::CandidateProduct;
pub use domain::manufacturer::ManufacturerResolver;
pub use domain::metrics::{Competition, KeywordMetrics};
pub use domain::selection::{
    ProductScores, SelectedProduct, SelectionResult, SelectionStatus, SelectionValidation,
    ValidationOutcome, ValidationStatus,
};
pub use domain::tco::{CostEvidence, ResaleConfidence, TcoExport, TcoRecord, TcoSummary};
pub use domain::tier::{Tier, TierMap};
pub use errors::{ApplicationError, DomainError};
pub use selection::{
    DeterministicSelectionEngine, MentionSource, MetricsSource, NoMentions, NoMetrics,
    SelectionEngine,
};
pub use tco::{verify_export, CostSource, ExportIssue, NoCostEvidence, TcoCalculator, TcoExporter};
