//! Machine aggregate and the dispenser that operates it.
//!
//! The [`Machine`] is read-only after construction; its [`SharedInventory`]
//! is the only part that changes. The [`Dispenser`] is the single entry
//! point for prepare and refill requests and owns the locking discipline.
//!
//! [`SharedInventory`]: brewline_inventory::SharedInventory

pub mod dispenser;
pub mod machine;

pub use dispenser::{Dispenser, Preparer};
pub use machine::Machine;
