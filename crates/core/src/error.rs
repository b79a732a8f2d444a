//! Domain error model.

use thiserror::Error;

use crate::id::{BeverageName, IngredientId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (validation, invariants).
/// Failures a dispense request reports back to a caller are [`DispenseError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A thread panicked while holding the inventory lock.
    #[error("inventory lock poisoned")]
    LockPoisoned,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

/// Failure of a single dispense/refill request or command line.
///
/// The `Display` output is the exact message shown to the machine user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispenseError {
    #[error("Unknown beverage selected")]
    UnknownBeverage,

    /// One or more required ingredients are missing or insufficient.
    #[error("{beverage} cannot be prepared because {missing} {} not available", verb(.missing))]
    IngredientShortage {
        beverage: BeverageName,
        missing: IngredientList,
    },

    /// The request did not complete within the dispatcher's deadline.
    #[error("Something went wrong. Please try again after some time.")]
    Timeout,

    /// Unexpected internal failure. The detail is for logs only.
    #[error("Something went wrong. Please try again after some time.")]
    Fault(String),

    #[error("Unknown command! :{0}")]
    UnknownCommand(TokenList),
}

impl DispenseError {
    pub fn shortage(beverage: BeverageName, missing: Vec<IngredientId>) -> Self {
        Self::IngredientShortage {
            beverage,
            missing: IngredientList(missing),
        }
    }

    pub fn fault(detail: impl Into<String>) -> Self {
        Self::Fault(detail.into())
    }

    pub fn unknown_command(tokens: Vec<String>) -> Self {
        Self::UnknownCommand(TokenList(tokens))
    }
}

impl From<DomainError> for DispenseError {
    fn from(value: DomainError) -> Self {
        DispenseError::Fault(value.to_string())
    }
}

fn verb(missing: &IngredientList) -> &'static str {
    if missing.0.len() > 1 { "are" } else { "is" }
}

/// Ingredient ids rendered as `[a, b, c]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientList(pub Vec<IngredientId>);

impl core::fmt::Display for IngredientList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write_bracketed(f, self.0.iter())
    }
}

/// Raw command tokens rendered as `[a, b, c]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenList(pub Vec<String>);

impl core::fmt::Display for TokenList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write_bracketed(f, self.0.iter())
    }
}

fn write_bracketed<T: core::fmt::Display>(
    f: &mut core::fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> core::fmt::Result {
    f.write_str("[")?;
    for (idx, item) in items.enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}
