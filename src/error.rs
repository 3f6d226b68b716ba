//! Error types for clause translation.

use thiserror::Error;

/// Raised while turning a WHERE clause into an expression tree.
///
/// Evaluation never fails; every variant here surfaces before any record
/// is inspected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AqlError {
    /// The clause could not be parsed as SQL at all.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// The clause parsed, but uses a construct the engine does not evaluate.
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    /// Comparison operator outside the supported table.
    #[error("Unsupported operator: '{0}'")]
    UnsupportedOperator(String),

    /// Function outside the allow-list.
    #[error("Unsupported function: '{0}'")]
    UnsupportedFunction(String),

    #[error("Function '{name}' expects {expected} argument(s), got {actual}")]
    FunctionArity {
        name: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, AqlError>;
