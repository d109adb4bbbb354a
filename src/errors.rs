use thiserror::Error;

use crate::domain::category::Category;

pub type EngineResult<T> = Result<T, EngineError>;

/// Faults raised by category store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection '{0}' is unavailable")]
    Unavailable(String),
    #[error("record '{id}' not found in collection '{collection}'")]
    Missing { collection: String, id: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Error type that captures engine failures.
///
/// `Validation` is always recoverable locally and never retried by the
/// engine. `ReadFailure` names the category whose read voided the pass;
/// an empty category is an ordinary success, never a `ReadFailure`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("could not read the {category} category")]
    ReadFailure { category: Category },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}
