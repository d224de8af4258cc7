use thiserror::Error;

use crate::config::ConfigError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {record} record: `{field}` {message}")]
    InvalidRecord { record: String, field: &'static str, message: String },
    #[error("arithmetic overflow while computing total cost for `{product}`")]
    ArithmeticOverflow { product: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn invalid(
        record: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidRecord { record: record.into(), field, message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("could not access `{path}`: {message}")]
    Io { path: String, message: String },
    #[error("could not decode `{path}`: {message}")]
    Serialization { path: String, message: String },
}

impl ApplicationError {
    /// Stable machine-readable class used in CLI payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::InvalidRecord { .. }) => "invalid_input",
            Self::Domain(DomainError::ArithmeticOverflow { .. })
            | Self::Domain(DomainError::InvariantViolation(_)) => "invariant_violation",
            Self::Configuration(_) => "config_validation",
            Self::Io { .. } => "io",
            Self::Serialization { .. } => "serialization",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Io { .. } => 3,
            Self::Serialization { .. } | Self::Domain(DomainError::InvalidRecord { .. }) => 4,
            Self::Domain(_) => 5,
        }
    }
}
