//! A regional blood bank: per-type aged inventories and the daily simulation step.
use crate::blood::BloodType;
use crate::calendar::{self, Season};
use crate::inventory::BloodInventory;
use crate::model::Parameters;
use crate::region::{Region, RegionID};
use crate::signals::{FluSignal, WeatherSignal};
use crate::supply::{DaysOfSupply, SupplyStatus};
use anyhow::{Result, ensure};
use chrono::NaiveDate;
use indexmap::IndexMap;
use rand::Rng;
use rand_distr::Normal;
use serde::Serialize;
use strum::IntoEnumIterator;

/// The donation-reducing modifiers in effect for one simulated day
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Modifiers {
    /// Donation impact of influenza activity, in [0, 1]
    pub flu_impact: f64,
    /// Donation impact of severe weather, in [0, 1]
    pub weather_impact: f64,
}

/// Point-in-time state of one blood type after a simulated day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDaySnapshot {
    /// Units in stock at the end of the day
    pub units_available: u32,
    /// Days of supply at the end of the day
    pub days_of_supply: DaysOfSupply,
    /// Units collected during the day
    pub collected: u32,
    /// Units transfused during the day
    pub transfused: u32,
    /// Units that expired during the day
    pub expired: u32,
    /// Demand that could not be met from stock
    pub unmet_demand: u32,
    /// Supply status classified with the daily-step bands
    pub status: SupplyStatus,
}

/// Point-in-time state of one region after a simulated day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDaySnapshot {
    /// The region's ID
    pub region_id: RegionID,
    /// The region's name
    pub region_name: String,
    /// Mean days of supply across all blood types
    pub overall_days_of_supply: DaysOfSupply,
    /// Minimum days of supply across all blood types
    pub min_days_of_supply: DaysOfSupply,
    /// Supply status of the scarcest blood type
    pub status: SupplyStatus,
    /// Blood types below the critical alert threshold
    pub critical_types: Vec<BloodType>,
    /// Total units collected across all types
    pub total_collections: u32,
    /// Total units transfused across all types
    pub total_transfusions: u32,
    /// Total units expired across all types
    pub total_expired: u32,
    /// The modifiers used for this day
    pub modifiers: Modifiers,
    /// Per-type state
    pub inventory: IndexMap<BloodType, TypeDaySnapshot>,
}

/// A regional blood bank holding one aged inventory per blood type.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalBank {
    /// The region's ID
    pub region_id: RegionID,
    /// The region's name
    pub region_name: String,
    /// The resident population served by the bank
    pub population: u64,
    /// One inventory per supported blood type
    pub inventory: IndexMap<BloodType, BloodInventory>,

    // Per-day counters, reset at the start of every simulated day
    daily_collections: u32,
    daily_transfusions: u32,
    daily_expired: u32,
    daily_transfers_in: u32,
    daily_transfers_out: u32,

    /// Donation impact of influenza activity, recomputed daily
    pub flu_impact: f64,
    /// Donation impact of severe weather, recomputed daily
    pub weather_impact: f64,
}

impl RegionalBank {
    /// Create a bank for the given region, seeded with a synthetic starting stock.
    ///
    /// Each blood type starts with roughly `initial_supply_days` of supply spread across a
    /// three-week age profile.
    pub fn new(region: &Region, parameters: &Parameters) -> Result<Self> {
        ensure!(
            region.population > 0,
            "Region {} has zero population",
            region.id
        );

        let inventory = BloodType::iter()
            .map(|blood_type| {
                let daily_demand = (region.population as f64 / 100_000.0)
                    * parameters.base_demand_per_100k
                    * blood_type.distribution_fraction();
                let inventory = BloodInventory::with_starting_stock(
                    blood_type,
                    daily_demand,
                    parameters.initial_supply_days,
                    parameters.initial_age_spread_days,
                    parameters.shelf_life_days,
                );
                (blood_type, inventory)
            })
            .collect();

        Ok(Self {
            region_id: region.id,
            region_name: region.name.clone(),
            population: region.population,
            inventory,
            daily_collections: 0,
            daily_transfusions: 0,
            daily_expired: 0,
            daily_transfers_in: 0,
            daily_transfers_out: 0,
            flu_impact: 0.0,
            weather_impact: 0.0,
        })
    }

    /// Simulate one day of bank operations: age stock, collect donations, fulfil demand.
    ///
    /// # Arguments
    ///
    /// * `flu` / `weather` - Risk signals for the day
    /// * `event_multiplier` - Demand multiplier from external events (1.0 = no events)
    /// * `date` - The simulated date, used for seasonal and weekday adjustment
    /// * `parameters` - Simulation parameters
    /// * `rng` - Source of the daily variance terms
    pub fn simulate_day<R: Rng>(
        &mut self,
        flu: FluSignal,
        weather: WeatherSignal,
        event_multiplier: f64,
        date: NaiveDate,
        parameters: &Parameters,
        rng: &mut R,
    ) -> RegionDaySnapshot {
        self.reset_daily_counters();
        self.flu_impact = flu.activity_level.impact();
        self.weather_impact = weather.impact_score;

        let season = parameters.seasonal_factors.get(Season::from_date(date));
        let mut inventory = IndexMap::with_capacity(self.inventory.len());

        for (&blood_type, stock) in &mut self.inventory {
            let expired = stock.age_one_day();
            self.daily_expired += expired;

            // Collections, reduced by flu and weather, adjusted for season and daily variance
            let mut collection_modifier = (1.0
                - self.flu_impact * parameters.flu_collection_weight)
                * (1.0 - self.weather_impact * parameters.weather_collection_weight);
            collection_modifier *= season.donation;
            collection_modifier *= rng.gen_range(
                1.0 - parameters.collection_variance..=1.0 + parameters.collection_variance,
            );

            let expected_collections = stock.daily_demand * collection_modifier;
            let noise = Normal::new(0.0, expected_collections * parameters.collection_noise_std)
                .map(|normal| rng.sample(normal))
                .unwrap_or(0.0);
            let collected = (expected_collections + noise).max(0.0) as u32;
            stock.add_units(collected, 0);
            self.daily_collections += collected;

            // Demand, adjusted for season, external events, weekday and daily variance
            let mut demand_modifier = season.demand * event_multiplier;
            demand_modifier *=
                rng.gen_range(1.0 - parameters.demand_variance..=1.0 + parameters.demand_variance);
            if calendar::is_weekend(date) {
                demand_modifier *= parameters.weekend_demand_factor;
            }

            let demand = (stock.daily_demand * demand_modifier) as u32;
            let transfused = stock.remove_units(demand);
            self.daily_transfusions += transfused;

            let days_of_supply = stock.recompute_days_of_supply();
            inventory.insert(
                blood_type,
                TypeDaySnapshot {
                    units_available: stock.total_units(),
                    days_of_supply,
                    collected,
                    transfused,
                    expired,
                    unmet_demand: demand - transfused,
                    status: parameters.status_bands.classify(days_of_supply),
                },
            );
        }

        self.snapshot(inventory, parameters)
    }

    fn reset_daily_counters(&mut self) {
        self.daily_collections = 0;
        self.daily_transfusions = 0;
        self.daily_expired = 0;
        self.daily_transfers_in = 0;
        self.daily_transfers_out = 0;
    }

    fn snapshot(
        &self,
        inventory: IndexMap<BloodType, TypeDaySnapshot>,
        parameters: &Parameters,
    ) -> RegionDaySnapshot {
        let overall = DaysOfSupply::mean(self.inventory.values().map(|inv| inv.days_of_supply))
            .unwrap_or(DaysOfSupply::Unbounded);
        let min = DaysOfSupply::min(self.inventory.values().map(|inv| inv.days_of_supply))
            .unwrap_or(DaysOfSupply::Unbounded);
        let critical_types = self
            .inventory
            .iter()
            .filter(|(_, inv)| {
                inv.days_of_supply
                    .is_below(parameters.critical_type_threshold)
            })
            .map(|(&blood_type, _)| blood_type)
            .collect();

        RegionDaySnapshot {
            region_id: self.region_id,
            region_name: self.region_name.clone(),
            overall_days_of_supply: overall,
            min_days_of_supply: min,
            status: parameters.status_bands.classify(min),
            critical_types,
            total_collections: self.daily_collections,
            total_transfusions: self.daily_transfusions,
            total_expired: self.daily_expired,
            modifiers: Modifiers {
                flu_impact: self.flu_impact,
                weather_impact: self.weather_impact,
            },
            inventory,
        }
    }

    /// Transfer up to `units` of `blood_type` to another bank.
    ///
    /// Units are taken oldest first from this bank and arrive in the target one day older than
    /// fresh, modelling a day in transit. Returns the units actually moved, bounded by this
    /// bank's stock.
    pub fn transfer_to(
        &mut self,
        target: &mut RegionalBank,
        blood_type: BloodType,
        units: u32,
    ) -> u32 {
        let Some(source) = self.inventory.get_mut(&blood_type) else {
            return 0;
        };
        let Some(destination) = target.inventory.get_mut(&blood_type) else {
            return 0;
        };

        let actual = source.remove_units(units);
        destination.add_units(actual, 1);
        source.recompute_days_of_supply();
        destination.recompute_days_of_supply();

        self.daily_transfers_out += actual;
        target.daily_transfers_in += actual;

        actual
    }

    /// Units transferred out of this bank today
    pub fn daily_transfers_out(&self) -> u32 {
        self.daily_transfers_out
    }

    /// Units transferred into this bank today
    pub fn daily_transfers_in(&self) -> u32 {
        self.daily_transfers_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{bank, parameters, test_region, weekday};
    use crate::signals::FluActivity;
    use float_cmp::assert_approx_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    #[rstest]
    fn test_new_zero_population(parameters: Parameters) {
        let region = Region {
            id: RegionID(1),
            name: "Empty".to_string(),
            population: 0,
        };
        assert!(RegionalBank::new(&region, &parameters).is_err());
    }

    #[rstest]
    fn test_new_seeds_all_types(bank: RegionalBank) {
        assert_eq!(bank.inventory.len(), 8);
        for inventory in bank.inventory.values() {
            assert!(inventory.total_units() > 0);
            assert!(inventory.daily_demand > 0.0);
        }
    }

    #[rstest]
    fn test_simulate_day(mut bank: RegionalBank, parameters: Parameters, weekday: NaiveDate) {
        let mut rng = StdRng::seed_from_u64(0);
        let snapshot = bank.simulate_day(
            FluSignal::default(),
            WeatherSignal::default(),
            1.0,
            weekday,
            &parameters,
            &mut rng,
        );

        assert_eq!(snapshot.inventory.len(), 8);
        assert_eq!(
            snapshot.total_collections,
            snapshot.inventory.values().map(|t| t.collected).sum::<u32>()
        );
        assert_eq!(
            snapshot.total_transfusions,
            snapshot.inventory.values().map(|t| t.transfused).sum::<u32>()
        );
        for type_snapshot in snapshot.inventory.values() {
            assert!(type_snapshot.days_of_supply.is_above(0.0));
        }
    }

    #[rstest]
    fn test_simulate_day_resets_counters(
        mut bank: RegionalBank,
        parameters: Parameters,
        weekday: NaiveDate,
    ) {
        let mut rng = StdRng::seed_from_u64(0);
        let first = bank.simulate_day(
            FluSignal::default(),
            WeatherSignal::default(),
            1.0,
            weekday,
            &parameters,
            &mut rng,
        );
        let second = bank.simulate_day(
            FluSignal::default(),
            WeatherSignal::default(),
            1.0,
            weekday,
            &parameters,
            &mut rng,
        );

        // Counters are per-day, not cumulative: the second day's total would roughly double if
        // the first day's collections leaked into it
        assert!(second.total_collections > 0);
        assert!(second.total_collections < first.total_collections * 2);
    }

    #[rstest]
    fn test_simulate_day_updates_modifiers(
        mut bank: RegionalBank,
        parameters: Parameters,
        weekday: NaiveDate,
    ) {
        let mut rng = StdRng::seed_from_u64(0);
        let flu = FluSignal {
            activity_level: FluActivity::VeryHigh,
        };
        let weather = WeatherSignal { impact_score: 0.8 };
        let snapshot = bank.simulate_day(flu, weather, 1.0, weekday, &parameters, &mut rng);

        assert_approx_eq!(f64, snapshot.modifiers.flu_impact, 0.6);
        assert_approx_eq!(f64, snapshot.modifiers.weather_impact, 0.8);
        assert_approx_eq!(f64, bank.flu_impact, 0.6);
    }

    #[rstest]
    fn test_transfer_to(parameters: Parameters) {
        let mut source = RegionalBank::new(&test_region(1, 1_000_000), &parameters).unwrap();
        let mut target = RegionalBank::new(&test_region(2, 100_000), &parameters).unwrap();

        let before_source = source.inventory[&BloodType::OPos].total_units();
        let before_target = target.inventory[&BloodType::OPos].total_units();

        let moved = source.transfer_to(&mut target, BloodType::OPos, 50);
        assert_eq!(moved, 50);
        assert_eq!(
            source.inventory[&BloodType::OPos].total_units(),
            before_source - 50
        );
        assert_eq!(
            target.inventory[&BloodType::OPos].total_units(),
            before_target + 50
        );
        assert_eq!(source.daily_transfers_out(), 50);
        assert_eq!(target.daily_transfers_in(), 50);
    }

    #[rstest]
    fn test_transfer_to_bounded_by_stock(parameters: Parameters) {
        let mut source = RegionalBank::new(&test_region(1, 100_000), &parameters).unwrap();
        let mut target = RegionalBank::new(&test_region(2, 100_000), &parameters).unwrap();

        let available = source.inventory[&BloodType::ABNeg].total_units();
        let moved = source.transfer_to(&mut target, BloodType::ABNeg, available + 1_000);
        assert_eq!(moved, available);
        assert_eq!(source.inventory[&BloodType::ABNeg].total_units(), 0);
    }
}
