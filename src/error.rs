use crate::reference::ExprId;
use crate::types::{Lit, Var};

pub type Result<T, E = ExprError> = std::result::Result<T, E>;

/// Recoverable failures of expression operations.
///
/// Every operation checks its preconditions before touching the store, so
/// receiving any of these means the store is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("expression {0} does not exist")]
    ExpressionNotFound(ExprId),
    #[error("conjunction index {index} is out of range for an expression with {len} conjunctions")]
    ConjunctionIndexOutOfRange { index: usize, len: usize },
    #[error("variable value not provided for {0}")]
    VariableValueNotProvided(Var),

    #[error("conjunction has {size} literals, at most {max} allowed")]
    TooManyLiterals { size: usize, max: usize },
    #[error("expression has {size} conjunctions, at most {max} allowed")]
    TooManyConjunctions { size: usize, max: usize },

    #[error("value {value} of {var} exceeds the fixed-point scale")]
    ValueOutOfRange { var: Var, value: u128 },
    #[error("value {value} of {var} is not a settled boolean (0 or scale)")]
    NonBooleanValue { var: Var, value: u128 },

    #[error("expressions cannot be merged: a conjunction of {expression} lacks {literal}")]
    MissingSplitLiteral { expression: ExprId, literal: Lit },
    #[error("expressions cannot be merged: the remaining parts differ")]
    SplitHalvesDiffer,
    #[error("got {ids} variable ids but {values} values")]
    LengthMismatch { ids: usize, values: usize },

    #[error("literal must be non-zero")]
    ZeroLiteral,

    #[error(transparent)]
    Format(#[from] std::fmt::Error),
}
