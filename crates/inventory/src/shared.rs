//! Shared, lock-guarded inventory.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

use brewline_core::{DomainError, DomainResult};

use crate::stock::{Inventory, Quantities};

/// Inventory shared between the machine and every outlet.
///
/// - One mutex per inventory; critical sections are totally ordered
/// - Availability checks and the debit that follows must use one guard
/// - Poisoning is surfaced as [`DomainError::LockPoisoned`], never a panic
#[derive(Debug, Clone, Default)]
pub struct SharedInventory {
    inner: Arc<Mutex<Inventory>>,
}

impl SharedInventory {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inventory)),
        }
    }

    /// Acquire exclusive access for one check-and-mutate sequence.
    pub fn lock(&self) -> DomainResult<MutexGuard<'_, Inventory>> {
        self.inner.lock().map_err(|_| {
            error!("inventory mutex poisoned by a panicking operation");
            DomainError::LockPoisoned
        })
    }

    /// Consistent copy of every quantity at one point in time.
    pub fn snapshot(&self) -> DomainResult<Quantities> {
        Ok(self.lock()?.quantities().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use brewline_core::IngredientId;

    #[test]
    fn clones_share_the_same_stock() {
        let shared = SharedInventory::new(Inventory::from_pairs([("milk", 10)]).unwrap());
        let other = shared.clone();
        other
            .lock()
            .unwrap()
            .refill(IngredientId::new("milk").unwrap(), 5)
            .unwrap();
        assert_eq!(shared.snapshot().unwrap().get("milk"), Some(&15));
    }

    #[test]
    fn poisoned_lock_is_reported_as_error() {
        let shared = SharedInventory::new(Inventory::default());
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("boom");
        })
        .join();

        assert_eq!(shared.lock().err(), Some(DomainError::LockPoisoned));
    }
}
