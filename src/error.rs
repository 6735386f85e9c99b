use thiserror::Error;

/// Every fallible operation of the crate reports one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlgebraError {
    #[error("division by zero")]
    DivisionByZero,

    /// source/target/degree mismatch between the operands of `operation`
    #[error("incompatible operands for {operation}: {detail}")]
    IncompatibleOperands {
        operation: &'static str,
        detail: String,
    },

    #[error("undefined algebraic object: {0}")]
    UndefinedObject(String),

    /// a basis key does not have the nested shape a regrouping needs
    #[error("malformed basis key {key} for {operation}")]
    MalformedKey {
        operation: &'static str,
        key: String,
    },

    #[error("invariant violated in {context}: {detail}")]
    InvariantViolation { context: String, detail: String },
}

impl AlgebraError {
    pub(crate) fn incompatible(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::IncompatibleOperands {
            operation,
            detail: detail.into(),
        }
    }

    pub(crate) fn violation(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            context: context.into(),
            detail: detail.into(),
        }
    }
}

pub type AlgebraResult<T> = Result<T, AlgebraError>;
