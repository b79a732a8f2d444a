//! Machine configuration loading and representation.
//!
//! The file layout is:
//!
//! ```json
//! {
//!   "machine": {
//!     "outlets": { "count_n": 3 },
//!     "total_items_quantity": { "hot_water": 500, "hot_milk": 500 },
//!     "beverages": {
//!       "hot_tea": { "hot_water": 200, "hot_milk": 100 }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use brewline_core::{BeverageName, DomainError, IngredientId};
use brewline_inventory::{Inventory, Quantities, Recipe, Requirements};
use brewline_machine::Machine;

use crate::dispatcher::DispatcherConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MachineConfig {
    pub machine: MachineSection,
}

/// Keys stay raw strings here; they are validated and trimmed when the
/// machine is built, so `"milk"` and `" milk "` are caught as duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MachineSection {
    pub outlets: OutletsSection,
    pub total_items_quantity: BTreeMap<String, u64>,
    pub beverages: BTreeMap<String, BTreeMap<String, u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OutletsSection {
    pub count_n: usize,
}

impl MachineConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: MachineConfig = serde_json::from_str(raw)?;
        if config.machine.outlets.count_n == 0 {
            return Err(DomainError::validation("outlets.count_n must be positive").into());
        }
        Ok(config)
    }

    pub fn outlets(&self) -> usize {
        self.machine.outlets.count_n
    }

    /// Dispatcher defaults for this machine: one worker per outlet.
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig::default().with_max_concurrent(self.outlets())
    }

    pub fn into_machine(self) -> Result<Machine, ConfigError> {
        let MachineSection {
            outlets,
            total_items_quantity,
            beverages,
        } = self.machine;

        let quantities: Quantities = typed_quantities("total_items_quantity", total_items_quantity)?;
        let mut recipes = Vec::with_capacity(beverages.len());
        let mut seen = BTreeMap::new();
        for (raw, ingredients) in beverages {
            let name = BeverageName::new(raw.as_str())?;
            if let Some(previous) = seen.insert(name.clone(), raw.clone()) {
                return Err(duplicate_key("beverages", &previous, &raw));
            }
            let section = format!("beverages.{name}");
            let requirements: Requirements = typed_quantities(&section, ingredients)?;
            recipes.push(Recipe::new(name, requirements));
        }

        Ok(Machine::new(
            outlets.count_n,
            Inventory::new(quantities),
            recipes,
        )?)
    }
}

fn typed_quantities(
    section: &str,
    raw: BTreeMap<String, u64>,
) -> Result<BTreeMap<IngredientId, u64>, ConfigError> {
    let mut typed = BTreeMap::new();
    let mut seen: BTreeMap<IngredientId, String> = BTreeMap::new();
    for (key, qty) in raw {
        let id = IngredientId::new(key.as_str())?;
        if let Some(previous) = seen.insert(id.clone(), key.clone()) {
            return Err(duplicate_key(section, &previous, &key));
        }
        typed.insert(id, qty);
    }
    Ok(typed)
}

fn duplicate_key(section: &str, first: &str, second: &str) -> ConfigError {
    DomainError::validation(format!(
        "{section}: {first:?} and {second:?} name the same entry"
    ))
    .into()
}
