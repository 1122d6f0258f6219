//! Age-bucketed inventory for a single blood type within one region.
use crate::blood::BloodType;
use crate::supply::DaysOfSupply;
use serde::Serialize;
use std::collections::BTreeMap;

/// Inventory for one blood type, bucketed by unit age in days.
///
/// Units are issued oldest first (FEFO), age by one day per simulated day and are discarded once
/// their age reaches the product's shelf life.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BloodInventory {
    /// The blood type this inventory holds
    pub blood_type: BloodType,
    /// Unit counts keyed by age in days
    units_by_age: BTreeMap<u32, u32>,
    /// Total units across all age buckets. Always equals the sum of `units_by_age`.
    total_units: u32,
    /// Expected units consumed per day for this type in this region
    pub daily_demand: f64,
    /// Current days of supply. Updated by [`BloodInventory::recompute_days_of_supply`].
    pub days_of_supply: DaysOfSupply,
    /// Maximum age in days before a unit expires
    shelf_life: u32,
}

impl BloodInventory {
    /// Create an empty inventory for the given blood type.
    pub fn new(blood_type: BloodType, daily_demand: f64, shelf_life: u32) -> Self {
        let mut inventory = Self {
            blood_type,
            units_by_age: BTreeMap::new(),
            total_units: 0,
            daily_demand,
            days_of_supply: DaysOfSupply::Unbounded,
            shelf_life,
        };
        inventory.recompute_days_of_supply();

        inventory
    }

    /// Create an inventory seeded with a starting stock spread evenly over an age range.
    ///
    /// # Arguments
    ///
    /// * `daily_demand` - Expected daily consumption for this type
    /// * `supply_days` - Days of supply the starting stock should cover
    /// * `age_spread_days` - Starting stock is spread over ages `0..age_spread_days`
    /// * `shelf_life` - Maximum unit age in days
    pub fn with_starting_stock(
        blood_type: BloodType,
        daily_demand: f64,
        supply_days: f64,
        age_spread_days: u32,
        shelf_life: u32,
    ) -> Self {
        let mut inventory = Self::new(blood_type, daily_demand, shelf_life);

        // Round up so even very-low-demand types start with at least one unit
        let initial_units = (daily_demand * supply_days).ceil() as u32;
        let per_bucket = initial_units / age_spread_days;
        for age in 0..age_spread_days {
            inventory.add_units(per_bucket, age);
        }
        // Units that don't divide evenly over the age profile are fresh stock
        inventory.add_units(initial_units % age_spread_days, 0);
        inventory.recompute_days_of_supply();

        inventory
    }

    /// Total units across all age buckets
    pub fn total_units(&self) -> u32 {
        self.total_units
    }

    /// Age every bucket by one day, discarding buckets that reach the shelf life.
    ///
    /// Returns the number of units that expired.
    pub fn age_one_day(&mut self) -> u32 {
        let mut aged = BTreeMap::new();
        let mut expired = 0;

        for (age, count) in std::mem::take(&mut self.units_by_age) {
            let new_age = age + 1;
            if new_age >= self.shelf_life {
                expired += count;
            } else {
                *aged.entry(new_age).or_insert(0) += count;
            }
        }

        self.units_by_age = aged;
        self.total_units = self.units_by_age.values().sum();

        expired
    }

    /// Add `count` units at the given age. Zero counts are a no-op.
    pub fn add_units(&mut self, count: u32, age: u32) {
        if count == 0 {
            return;
        }

        *self.units_by_age.entry(age).or_insert(0) += count;
        self.total_units = self.units_by_age.values().sum();
    }

    /// Remove up to `count` units, consuming the oldest buckets first.
    ///
    /// Returns the number of units actually removed, which is less than `count` if the inventory
    /// is insufficient. The shortfall is unmet demand, not an error.
    pub fn remove_units(&mut self, count: u32) -> u32 {
        let mut removed = 0;

        // Oldest first (FEFO)
        for (_, available) in self.units_by_age.iter_mut().rev() {
            if removed >= count {
                break;
            }

            let to_remove = (*available).min(count - removed);
            *available -= to_remove;
            removed += to_remove;
        }

        self.units_by_age.retain(|_, count| *count > 0);
        self.total_units = self.units_by_age.values().sum();

        removed
    }

    /// Recalculate days of supply from the current stock and demand.
    pub fn recompute_days_of_supply(&mut self) -> DaysOfSupply {
        self.days_of_supply = DaysOfSupply::calculate(self.total_units, self.daily_demand);
        self.days_of_supply
    }

    #[cfg(test)]
    fn units_at_age(&self, age: u32) -> u32 {
        self.units_by_age.get(&age).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn inventory() -> BloodInventory {
        BloodInventory::new(BloodType::OPos, 10.0, 42)
    }

    #[rstest]
    fn test_add_units(mut inventory: BloodInventory) {
        inventory.add_units(5, 0);
        inventory.add_units(3, 7);
        inventory.add_units(2, 7);
        assert_eq!(inventory.total_units(), 10);
        assert_eq!(inventory.units_at_age(7), 5);

        // Zero counts are a no-op
        inventory.add_units(0, 3);
        assert_eq!(inventory.total_units(), 10);
        assert_eq!(inventory.units_at_age(3), 0);
    }

    #[rstest]
    fn test_remove_units_oldest_first(mut inventory: BloodInventory) {
        inventory.add_units(5, 0);
        inventory.add_units(5, 3);

        // 4 units must come from the age-3 bucket before age 0 is touched
        assert_eq!(inventory.remove_units(4), 4);
        assert_eq!(inventory.units_at_age(3), 1);
        assert_eq!(inventory.units_at_age(0), 5);
        assert_eq!(inventory.total_units(), 6);
    }

    #[rstest]
    fn test_remove_units_insufficient(mut inventory: BloodInventory) {
        inventory.add_units(4, 2);
        assert_eq!(inventory.remove_units(10), 4);
        assert_eq!(inventory.total_units(), 0);

        // Emptied buckets are deleted
        assert_eq!(inventory.units_at_age(2), 0);
    }

    #[rstest]
    fn test_age_one_day(mut inventory: BloodInventory) {
        inventory.add_units(5, 0);
        inventory.add_units(3, 41);
        let expired = inventory.age_one_day();

        // The age-41 bucket reached the 42-day shelf life
        assert_eq!(expired, 3);
        assert_eq!(inventory.total_units(), 5);
        assert_eq!(inventory.units_at_age(1), 5);

        // Expired units never reappear
        assert_eq!(inventory.age_one_day(), 0);
        assert_eq!(inventory.total_units(), 5);
        assert_eq!(inventory.units_at_age(2), 5);
    }

    #[test]
    fn test_age_one_day_merges_buckets() {
        // Shelf life 5: ages {3, 4} -> 4 expires, 3 -> 4
        let mut inventory = BloodInventory::new(BloodType::ONeg, 1.0, 5);
        inventory.add_units(2, 3);
        inventory.add_units(7, 4);
        assert_eq!(inventory.age_one_day(), 7);
        assert_eq!(inventory.units_at_age(4), 2);
    }

    #[rstest]
    fn test_total_units_invariant(mut inventory: BloodInventory) {
        inventory.add_units(10, 0);
        inventory.add_units(10, 20);
        inventory.remove_units(7);
        inventory.age_one_day();
        inventory.add_units(3, 0);

        let sum: u32 = (0..=42).map(|age| inventory.units_at_age(age)).sum();
        assert_eq!(inventory.total_units(), sum);
    }

    #[rstest]
    fn test_days_of_supply(mut inventory: BloodInventory) {
        inventory.add_units(25, 0);
        assert_eq!(
            inventory.recompute_days_of_supply(),
            DaysOfSupply::Finite(2.5)
        );

        // Zero demand gives an unbounded supply, not a division error
        inventory.daily_demand = 0.0;
        assert_eq!(inventory.recompute_days_of_supply(), DaysOfSupply::Unbounded);
    }

    #[test]
    fn test_with_starting_stock() {
        let inventory = BloodInventory::with_starting_stock(BloodType::APos, 100.0, 3.0, 21, 42);

        // ~3 days of supply spread over a 3-week age profile, remainder at age 0
        assert_eq!(inventory.total_units(), 300);
        for age in 1..21 {
            assert_eq!(inventory.units_at_age(age), 300 / 21);
        }
        assert_eq!(inventory.units_at_age(0), 300 / 21 + 300 % 21);
        let days = inventory.days_of_supply.value().unwrap();
        assert_approx_eq!(f64, days, 3.0);
    }

    #[test]
    fn test_with_starting_stock_low_demand() {
        // Even a near-zero-demand type starts with at least one unit
        let inventory = BloodInventory::with_starting_stock(BloodType::ABNeg, 0.05, 3.0, 21, 42);
        assert_eq!(inventory.total_units(), 1);
    }
}
