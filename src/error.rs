use thiserror::Error;

/// Errors raised by the caller-side layers around the amortization engine.
///
/// The engine itself never fails; these describe requests or configuration
/// that would make its output meaningless.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinancingError {
    #[error("Invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid rate policy: {0}")]
    InvalidConfig(String),
}

impl FinancingError {
    pub(crate) fn invalid_input(field: &str, reason: &str) -> Self {
        FinancingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The offending field for input errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            FinancingError::InvalidInput { field, .. } => Some(field),
            FinancingError::InvalidConfig(_) => None,
        }
    }
}
