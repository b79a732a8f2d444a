use std::collections::BTreeMap;

use brewline_core::{DomainError, DomainResult, IngredientId};

use crate::recipe::Requirements;

/// Ingredient id → quantity on hand.
pub type Quantities = BTreeMap<IngredientId, u64>;

/// Store of ingredient quantities.
///
/// Quantities are unsigned, so no stock can ever be observed negative. All
/// mutation takes `&mut self`, which in a running machine is only reachable
/// through the [`SharedInventory`](crate::SharedInventory) guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    quantities: Quantities,
}

impl Inventory {
    pub fn new(quantities: Quantities) -> Self {
        Self { quantities }
    }

    /// Build an inventory from raw string pairs (tests, fixtures).
    pub fn from_pairs<'a>(
        quantities: impl IntoIterator<Item = (&'a str, u64)>,
    ) -> DomainResult<Self> {
        let quantities = quantities
            .into_iter()
            .map(|(id, qty)| IngredientId::new(id).map(|id| (id, qty)))
            .collect::<DomainResult<Quantities>>()?;
        Ok(Self { quantities })
    }

    pub fn quantity(&self, ingredient: &str) -> Option<u64> {
        self.quantities.get(ingredient).copied()
    }

    pub fn quantities(&self) -> &Quantities {
        &self.quantities
    }

    /// Every required ingredient that is absent or short, in the iteration
    /// order of `required`. Empty means the requirement can be debited.
    pub fn unavailable(&self, required: &Requirements) -> Vec<IngredientId> {
        required
            .iter()
            .filter(|&(id, needed)| match self.quantities.get(id.as_str()) {
                Some(on_hand) => on_hand < needed,
                None => true,
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Subtract `required` from stock, all or nothing.
    ///
    /// Callers run [`unavailable`](Self::unavailable) first under the same
    /// lock. The re-check here can only fail if that contract is broken, in
    /// which case nothing is mutated.
    pub fn debit(&mut self, required: &Requirements) -> DomainResult<()> {
        let mut remaining = Vec::with_capacity(required.len());
        for (id, needed) in required {
            let left = self
                .quantities
                .get(id.as_str())
                .and_then(|on_hand| on_hand.checked_sub(*needed))
                .ok_or_else(|| {
                    DomainError::invariant(format!("debit would drive {id} below zero"))
                })?;
            remaining.push((id, left));
        }

        for (id, left) in remaining {
            if let Some(slot) = self.quantities.get_mut(id.as_str()) {
                *slot = left;
            }
        }
        Ok(())
    }

    /// Add `amount` to an ingredient, creating it when absent.
    ///
    /// Negative amounts are accepted as long as the result stays non-negative.
    /// Returns the new quantity.
    pub fn refill(&mut self, ingredient: IngredientId, amount: i64) -> DomainResult<u64> {
        let current = self.quantities.get(ingredient.as_str()).copied().unwrap_or(0);
        let updated = current.checked_add_signed(amount).ok_or_else(|| {
            DomainError::invariant(format!(
                "refill of {amount} would take {ingredient} out of range (currently {current})"
            ))
        })?;
        self.quantities.insert(ingredient, updated);
        Ok(updated)
    }
}
