use std::collections::BTreeMap;

use brewline_core::{BeverageName, DomainError, IngredientId};

/// Ingredient id → quantity required for one unit of a beverage.
pub type Requirements = BTreeMap<IngredientId, u64>;

/// Immutable beverage formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    name: BeverageName,
    ingredients: Requirements,
}

impl Recipe {
    pub fn new(name: BeverageName, ingredients: Requirements) -> Self {
        Self { name, ingredients }
    }

    /// Build a recipe from raw string pairs (tests, fixtures).
    pub fn from_pairs<'a>(
        name: &str,
        ingredients: impl IntoIterator<Item = (&'a str, u64)>,
    ) -> Result<Self, DomainError> {
        let name = BeverageName::new(name)?;
        let ingredients = ingredients
            .into_iter()
            .map(|(id, qty)| IngredientId::new(id).map(|id| (id, qty)))
            .collect::<Result<Requirements, DomainError>>()?;
        Ok(Self { name, ingredients })
    }

    pub fn name(&self) -> &BeverageName {
        &self.name
    }

    pub fn ingredients(&self) -> &Requirements {
        &self.ingredients
    }
}
