use std::collections::{BTreeMap, BTreeSet};

use brewline_core::{BeverageName, DomainError, DomainResult};
use brewline_inventory::{Inventory, Recipe, SharedInventory};

/// Beverage machine: outlets, shared stock, and the recipes it knows.
#[derive(Debug, Clone)]
pub struct Machine {
    outlets: usize,
    inventory: SharedInventory,
    recipes: BTreeMap<BeverageName, Recipe>,
}

impl Machine {
    /// Assemble a machine. Recipes are keyed by their own name, so a
    /// duplicate name is rejected rather than silently replaced.
    pub fn new(
        outlets: usize,
        inventory: Inventory,
        recipes: impl IntoIterator<Item = Recipe>,
    ) -> DomainResult<Self> {
        if outlets == 0 {
            return Err(DomainError::validation("machine needs at least one outlet"));
        }

        let mut by_name = BTreeMap::new();
        for recipe in recipes {
            let name = recipe.name().clone();
            if by_name.insert(name.clone(), recipe).is_some() {
                return Err(DomainError::validation(format!("duplicate recipe: {name}")));
            }
        }

        Ok(Self {
            outlets,
            inventory: SharedInventory::new(inventory),
            recipes: by_name,
        })
    }

    pub fn outlets(&self) -> usize {
        self.outlets
    }

    pub fn inventory(&self) -> &SharedInventory {
        &self.inventory
    }

    pub fn find_recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    pub fn list_recipe_names(&self) -> BTreeSet<&BeverageName> {
        self.recipes.keys().collect()
    }
}
