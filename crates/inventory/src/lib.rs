//! Ingredient stock and beverage recipes.
//!
//! This crate contains the only mutable state of a machine: the [`Inventory`]
//! of ingredient quantities. It is shared across outlets through
//! [`SharedInventory`], whose single mutex is the one synchronization point
//! every check-then-debit sequence goes through.

pub mod recipe;
pub mod shared;
pub mod stock;

pub use recipe::{Recipe, Requirements};
pub use shared::SharedInventory;
pub use stock::{Inventory, Quantities};
