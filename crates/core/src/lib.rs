//! `brewline-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every other crate:
//! identifiers, the terminal [`Outcome`] of an operation, and the error model.

pub mod error;
pub mod id;
pub mod outcome;

pub use error::{DispenseError, DomainError, DomainResult, IngredientList, TokenList};
pub use id::{BeverageName, IngredientId};
pub use outcome::Outcome;
