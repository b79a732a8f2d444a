//! Prepare and refill requests against a machine.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error, warn};

use brewline_core::{BeverageName, DispenseError, DomainError, IngredientId, Outcome};
use brewline_inventory::Recipe;

use crate::machine::Machine;

/// Something that can prepare a beverage by name.
///
/// This is the seam the dispatcher runs on; [`Dispenser`] is the production
/// implementation. Implementations must resolve every failure to an
/// [`Outcome`] rather than panicking or returning early.
pub trait Preparer: Send + Sync + 'static {
    fn prepare(&self, beverage: &str) -> Outcome;
}

impl<P> Preparer for Arc<P>
where
    P: Preparer + ?Sized,
{
    fn prepare(&self, beverage: &str) -> Outcome {
        (**self).prepare(beverage)
    }
}

/// Operator of a [`Machine`].
///
/// Holds no state of its own. Every prepare and refill runs inside exactly
/// one acquisition of the machine's inventory lock, so check-and-debit
/// sequences never interleave.
#[derive(Debug, Clone)]
pub struct Dispenser {
    machine: Machine,
}

impl Dispenser {
    pub fn new(machine: Machine) -> Self {
        Self { machine }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Names of every beverage the machine can make, for display.
    pub fn menu(&self) -> BTreeSet<&BeverageName> {
        self.machine.list_recipe_names()
    }

    /// Prepare one unit of `beverage`, debiting its ingredients on success.
    pub fn prepare(&self, beverage: &str) -> Outcome {
        let Some(recipe) = self.machine.find_recipe(beverage) else {
            warn!(beverage, "unknown beverage requested");
            return DispenseError::UnknownBeverage.into();
        };

        match self.brew(recipe) {
            Ok(outcome) => outcome,
            Err(err) => {
                match &err {
                    DispenseError::IngredientShortage { missing, .. } => {
                        warn!(beverage, %missing, "insufficient ingredients");
                    }
                    other => error!(beverage, error = ?other, "preparation failed"),
                }
                err.into()
            }
        }
    }

    /// Add `amount` of `ingredient` to the machine's stock.
    pub fn refill(&self, ingredient: &str, amount: i64) -> Outcome {
        match self.try_refill(ingredient, amount) {
            Ok(total) => {
                debug!(ingredient, amount, total, "ingredient refilled");
                Outcome::success("Refill successful")
            }
            Err(err) => {
                warn!(ingredient, amount, error = %err, "refill rejected");
                Outcome::error(format!("Refill of {ingredient} rejected: {err}"))
            }
        }
    }

    fn brew(&self, recipe: &Recipe) -> Result<Outcome, DispenseError> {
        let mut inventory = self.machine.inventory().lock()?;

        let missing = inventory.unavailable(recipe.ingredients());
        if !missing.is_empty() {
            return Err(DispenseError::shortage(recipe.name().clone(), missing));
        }
        inventory.debit(recipe.ingredients())?;
        drop(inventory);

        debug!(beverage = %recipe.name(), "beverage prepared");
        Ok(Outcome::success(format!("{} is prepared", recipe.name())))
    }

    fn try_refill(&self, ingredient: &str, amount: i64) -> Result<u64, DomainError> {
        let ingredient = IngredientId::new(ingredient)?;
        let mut inventory = self.machine.inventory().lock()?;
        inventory.refill(ingredient, amount)
    }
}

impl Preparer for Dispenser {
    fn prepare(&self, beverage: &str) -> Outcome {
        Dispenser::prepare(self, beverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use proptest::prelude::*;

    use brewline_inventory::Inventory;

    fn dispenser(tea: u64) -> Dispenser {
        let inventory =
            Inventory::from_pairs([("milk", 500), ("water", 500), ("tea", tea)]).unwrap();
        let recipes = vec![
            Recipe::from_pairs("hot_tea", [("milk", 50), ("water", 50), ("tea", 10)]).unwrap(),
            Recipe::from_pairs("hot_milk", [("milk", 100)]).unwrap(),
            Recipe::from_pairs("green_tea", [("water", 100), ("green_mixture", 30)]).unwrap(),
        ];
        Dispenser::new(Machine::new(3, inventory, recipes).unwrap())
    }

    fn stock(d: &Dispenser, id: &str) -> Option<u64> {
        d.machine().inventory().snapshot().unwrap().get(id).copied()
    }

    #[test]
    fn prepare_debits_stock() {
        let d = dispenser(100);
        let outcome = d.prepare("hot_tea");
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "hot_tea is prepared");
        assert_eq!(stock(&d, "milk"), Some(450));
        assert_eq!(stock(&d, "water"), Some(450));
        assert_eq!(stock(&d, "tea"), Some(90));
    }

    #[test]
    fn unknown_beverage_leaves_stock_untouched() {
        let d = dispenser(100);
        let before = d.machine().inventory().snapshot().unwrap();
        let outcome = d.prepare("mocha");
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), "Unknown beverage selected");
        assert_eq!(d.machine().inventory().snapshot().unwrap(), before);
    }

    #[test]
    fn missing_ingredient_is_named() {
        let d = dispenser(100);
        let outcome = d.prepare("green_tea");
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.message(),
            "green_tea cannot be prepared because [green_mixture] is not available"
        );
        assert_eq!(stock(&d, "water"), Some(500));
    }

    #[test]
    fn concurrent_shortage_fails_both_and_changes_nothing() {
        let d = Arc::new(dispenser(5));
        let before = d.machine().inventory().snapshot().unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let d = d.clone();
                thread::spawn(move || d.prepare("hot_tea"))
            })
            .collect();

        for handle in handles {
            let outcome = handle.join().unwrap();
            assert!(!outcome.is_success());
            assert_eq!(
                outcome.message(),
                "hot_tea cannot be prepared because [tea] is not available"
            );
        }
        assert_eq!(d.machine().inventory().snapshot().unwrap(), before);
    }

    #[test]
    fn refills_interleaved_with_prepares_lose_nothing() {
        let inventory = Inventory::from_pairs([("tea", 100)]).unwrap();
        let recipes = vec![Recipe::from_pairs("plain_tea", [("tea", 1)]).unwrap()];
        let d = Arc::new(Dispenser::new(Machine::new(4, inventory, recipes).unwrap()));

        let refillers: Vec<_> = (0..4)
            .map(|_| {
                let d = d.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        assert!(d.refill("tea", 1).is_success());
                    }
                })
            })
            .collect();
        let brewers: Vec<_> = (0..4)
            .map(|_| {
                let d = d.clone();
                thread::spawn(move || {
                    (0..1000)
                        .filter(|_| d.prepare("plain_tea").is_success())
                        .count() as u64
                })
            })
            .collect();

        for handle in refillers {
            handle.join().unwrap();
        }
        let prepared: u64 = brewers.into_iter().map(|h| h.join().unwrap()).sum();
        let left = stock(&d, "tea").unwrap();

        // initial 100 + refilled 4 * 500
        assert_eq!(prepared + left, 100 + 2000);
    }

    #[test]
    fn refill_adds_new_ingredient() {
        let d = dispenser(100);
        let outcome = d.refill("sugar", 50);
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "Refill successful");
        assert_eq!(stock(&d, "sugar"), Some(50));
        assert_eq!(stock(&d, "milk"), Some(500));
    }

    #[test]
    fn refill_unblocks_a_short_recipe() {
        let d = dispenser(5);
        assert!(!d.prepare("hot_tea").is_success());
        assert!(d.refill("tea", 5).is_success());
        assert!(d.prepare("hot_tea").is_success());
        assert_eq!(stock(&d, "tea"), Some(0));
    }

    #[test]
    fn refill_that_would_go_negative_is_rejected() {
        let d = dispenser(5);
        let outcome = d.refill("tea", -10);
        assert!(!outcome.is_success());
        assert!(outcome.message().starts_with("Refill of tea rejected"));
        assert_eq!(stock(&d, "tea"), Some(5));
    }

    #[test]
    fn blank_refill_ingredient_is_rejected() {
        let d = dispenser(5);
        assert!(!d.refill("  ", 10).is_success());
    }

    #[test]
    fn menu_lists_every_recipe() {
        let d = dispenser(5);
        let menu: Vec<&str> = d.menu().into_iter().map(BeverageName::as_str).collect();
        assert_eq!(menu, vec!["green_tea", "hot_milk", "hot_tea"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            ..ProptestConfig::default()
        })]

        /// Property: under concurrent contention, final stock equals initial
        /// stock minus exactly the debits of the requests that succeeded.
        #[test]
        fn concurrent_prepares_are_atomic(
            milk in 0u64..1_000,
            tea in 0u64..200,
            orders in prop::collection::vec(prop_oneof![Just("hot_tea"), Just("hot_milk"), Just("mocha")], 1..24),
        ) {
            let inventory = Inventory::from_pairs([("milk", milk), ("water", 10_000), ("tea", tea)]).unwrap();
            let recipes = vec![
                Recipe::from_pairs("hot_tea", [("milk", 50), ("water", 50), ("tea", 10)]).unwrap(),
                Recipe::from_pairs("hot_milk", [("milk", 100)]).unwrap(),
            ];
            let d = Arc::new(Dispenser::new(Machine::new(4, inventory, recipes).unwrap()));

            let handles: Vec<_> = orders
                .iter()
                .map(|name| {
                    let d = d.clone();
                    let name = name.to_string();
                    thread::spawn(move || (name.clone(), d.prepare(&name)))
                })
                .collect();

            let (mut used_milk, mut used_water, mut used_tea) = (0u64, 0u64, 0u64);
            for handle in handles {
                let (name, outcome) = handle.join().unwrap();
                if !outcome.is_success() {
                    continue;
                }
                match name.as_str() {
                    "hot_tea" => {
                        used_milk += 50;
                        used_water += 50;
                        used_tea += 10;
                    }
                    "hot_milk" => used_milk += 100,
                    other => prop_assert!(false, "unexpected success for {}", other),
                }
            }

            let after = d.machine().inventory().snapshot().unwrap();
            prop_assert_eq!(after.get("milk").copied(), Some(milk - used_milk));
            prop_assert_eq!(after.get("water").copied(), Some(10_000 - used_water));
            prop_assert_eq!(after.get("tea").copied(), Some(tea - used_tea));
        }
    }
}
