//! Engine error types
//!
//! Only malformed or missing required input is an error. Undefined ratios and
//! degenerate inputs are reported inside results instead.

use thiserror::Error;

/// Hard failures raised before any evaluation takes place
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// No treatment is designated as the control
    #[error("no control treatment designated; flag one treatment or pass an explicit control id")]
    MissingControl,

    /// More than one treatment claims to be the control
    #[error("control designation is ambiguous: {ids:?}")]
    AmbiguousControl { ids: Vec<String> },

    /// Explicit control id does not match any treatment
    #[error("control treatment '{0}' not found")]
    UnknownControl(String),

    /// Output price catalog is empty
    #[error("output price catalog is empty")]
    EmptyOutputCatalog,

    /// Treatment delta refers to an output missing from the catalog
    #[error("treatment '{treatment}' references unknown output '{output}'")]
    UnknownOutput { treatment: String, output: String },

    /// Two records of the same kind share an id
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    /// Configuration value out of range
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl EngineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
