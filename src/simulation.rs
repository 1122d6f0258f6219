//! Functionality for running the national blood-supply simulation.
use crate::bank::{Modifiers, RegionDaySnapshot, RegionalBank};
use crate::blood::BloodType;
use crate::model::Model;
use crate::output;
use crate::region::RegionID;
use crate::signals::RiskSignals;
use crate::supply::{DaysOfSupply, SupplyStatus};
use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;

pub mod events;
pub mod transfers;
pub use events::ExternalEvent;
pub use transfers::TransferRecommendation;

use events::{EventType, demand_multipliers};
use transfers::recommend_transfers;

/// Daily probability of a random mass casualty event in demo runs
const DEMO_EVENT_PROBABILITY: f64 = 0.1;

/// National supply status derived from the number of regions in shortage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NationalStatus {
    /// More regions in shortage than the configured limit
    Critical,
    /// At least one region in shortage
    Low,
    /// No regions in shortage
    Adequate,
}

/// National aggregate statistics for one simulated day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationalSummary {
    /// Population-weighted average days of supply across regions
    pub overall_days_of_supply: DaysOfSupply,
    /// Units collected across all regions
    pub total_collections: u32,
    /// Units transfused across all regions
    pub total_transfusions: u32,
    /// Units expired across all regions
    pub total_expired: u32,
    /// Regions whose status is critical or low
    pub critical_regions: Vec<RegionID>,
    /// Blood types critical in at least one region
    pub critical_blood_types: Vec<BloodType>,
    /// The number of regions in shortage
    pub regions_in_shortage: usize,
    /// The national supply status
    pub status: NationalStatus,
}

/// An immutable record of one simulated day across all regions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    /// The day number, starting at 1
    pub day: u32,
    /// The simulated date
    pub date: NaiveDate,
    /// Per-region snapshots
    pub regions: IndexMap<RegionID, RegionDaySnapshot>,
    /// National aggregates
    pub national: NationalSummary,
}

/// Per-type state in a current-state query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeState {
    /// Units in stock
    pub units: u32,
    /// Days of supply
    pub days_of_supply: DaysOfSupply,
    /// Status classified with the state-query bands
    pub status: SupplyStatus,
}

/// Per-region state in a current-state query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionState {
    /// The region's name
    pub region_name: String,
    /// Mean days of supply across types
    pub overall_days_of_supply: DaysOfSupply,
    /// Minimum days of supply across types
    pub min_days_of_supply: DaysOfSupply,
    /// Region status classified with the coarser region-level bands
    pub status: SupplyStatus,
    /// Per-type state
    pub inventory: IndexMap<BloodType, TypeState>,
    /// The modifiers currently in effect
    pub modifiers: Modifiers,
}

/// A current-state snapshot of every region, keyed by region ID
pub type CurrentState = IndexMap<RegionID, RegionState>;

/// Manages the simulation across all regions.
pub struct NationalSimulation {
    model: Model,
    banks: IndexMap<RegionID, RegionalBank>,
    history: Vec<DayRecord>,
    current_day: u32,
    date: NaiveDate,
    rng: StdRng,
}

impl NationalSimulation {
    /// Create a simulation from a model, starting at the given date.
    ///
    /// # Arguments
    ///
    /// * `model` - Region definitions and simulation parameters
    /// * `start_date` - The date of the first simulated day
    /// * `seed` - RNG seed; if `None`, the variance terms are seeded from entropy
    pub fn new(model: Model, start_date: NaiveDate, seed: Option<u64>) -> Result<Self> {
        ensure!(!model.regions.is_empty(), "Cannot simulate zero regions");
        model.parameters.validate()?;

        let banks = model
            .regions
            .values()
            .map(|region| {
                let bank = RegionalBank::new(region, &model.parameters)?;
                Ok((region.id, bank))
            })
            .collect::<Result<_>>()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            model,
            banks,
            history: Vec::new(),
            current_day: 0,
            date: start_date,
            rng,
        })
    }

    /// Simulate one day across all regions and append the result to the history.
    ///
    /// # Arguments
    ///
    /// * `signals` - Per-region risk signals; missing entries degrade to zero impact
    /// * `events` - Discrete shocks for the day, consumed once and not retained
    pub fn simulate_day(&mut self, signals: &RiskSignals, events: &[ExternalEvent]) -> &DayRecord {
        self.current_day += 1;
        let multipliers = demand_multipliers(events, &self.model.regions);

        let mut regions = IndexMap::with_capacity(self.banks.len());
        for (&region_id, bank) in &mut self.banks {
            let snapshot = bank.simulate_day(
                signals.flu_for(region_id),
                signals.weather_for(region_id),
                multipliers.get(&region_id).copied().unwrap_or(1.0),
                self.date,
                &self.model.parameters,
                &mut self.rng,
            );
            regions.insert(region_id, snapshot);
        }

        let national = self.national_summary(&regions);
        self.history.push(DayRecord {
            day: self.current_day,
            date: self.date,
            regions,
            national,
        });
        self.date = self.date.succ_opt().expect("Simulated date out of range");

        self.history.last().expect("History cannot be empty")
    }

    /// Calculate national aggregate statistics from the day's regional snapshots
    fn national_summary(&self, regions: &IndexMap<RegionID, RegionDaySnapshot>) -> NationalSummary {
        let total_population: u64 = self.banks.values().map(|bank| bank.population).sum();
        let mut weighted_sum = 0.0;
        let mut unbounded = false;
        for (region_id, snapshot) in regions {
            match snapshot.overall_days_of_supply {
                DaysOfSupply::Finite(days) => {
                    weighted_sum += days * self.banks[region_id].population as f64;
                }
                DaysOfSupply::Unbounded => unbounded = true,
            }
        }
        let overall_days_of_supply = if unbounded {
            DaysOfSupply::Unbounded
        } else {
            DaysOfSupply::Finite(weighted_sum / total_population as f64)
        };

        let critical_regions: Vec<RegionID> = regions
            .iter()
            .filter(|(_, snapshot)| {
                matches!(snapshot.status, SupplyStatus::Critical | SupplyStatus::Low)
            })
            .map(|(&region_id, _)| region_id)
            .collect();
        let critical_blood_types: IndexSet<BloodType> = regions
            .values()
            .flat_map(|snapshot| snapshot.critical_types.iter().copied())
            .collect();

        let regions_in_shortage = critical_regions.len();
        let status = if regions_in_shortage > self.model.parameters.critical_region_count {
            NationalStatus::Critical
        } else if regions_in_shortage > 0 {
            NationalStatus::Low
        } else {
            NationalStatus::Adequate
        };

        NationalSummary {
            overall_days_of_supply,
            total_collections: regions.values().map(|s| s.total_collections).sum(),
            total_transfusions: regions.values().map(|s| s.total_transfusions).sum(),
            total_expired: regions.values().map(|s| s.total_expired).sum(),
            critical_regions,
            critical_blood_types: critical_blood_types.into_iter().collect(),
            regions_in_shortage,
            status,
        }
    }

    /// Recommend transfers from surplus regions to shortage regions.
    ///
    /// This is an advisory query over current inventory; nothing is moved until
    /// [`NationalSimulation::execute_transfer`] is called.
    pub fn get_transfer_recommendations(&self) -> Vec<TransferRecommendation> {
        recommend_transfers(&self.banks, &self.model.parameters.transfers)
    }

    /// Execute a transfer between two regions.
    ///
    /// Returns the units actually moved, bounded by the source region's stock.
    pub fn execute_transfer(
        &mut self,
        from: RegionID,
        to: RegionID,
        blood_type: BloodType,
        units: u32,
    ) -> Result<u32> {
        ensure!(from != to, "Cannot transfer from region {from} to itself");
        let [source, target] = self.banks.get_disjoint_mut([&from, &to]);
        let source = source.with_context(|| format!("Unknown region {from}"))?;
        let target = target.with_context(|| format!("Unknown region {to}"))?;

        Ok(source.transfer_to(target, blood_type, units))
    }

    /// A state summary of every region, classified with the state-query bands.
    pub fn get_current_state(&self) -> CurrentState {
        let parameters = &self.model.parameters;

        self.banks
            .iter()
            .map(|(&region_id, bank)| {
                let inventory: IndexMap<BloodType, TypeState> = bank
                    .inventory
                    .iter()
                    .map(|(&blood_type, stock)| {
                        (
                            blood_type,
                            TypeState {
                                units: stock.total_units(),
                                days_of_supply: stock.days_of_supply,
                                status: parameters.state_status_bands.classify(stock.days_of_supply),
                            },
                        )
                    })
                    .collect();
                let overall =
                    DaysOfSupply::mean(bank.inventory.values().map(|inv| inv.days_of_supply))
                        .unwrap_or(DaysOfSupply::Unbounded);
                let min = DaysOfSupply::min(bank.inventory.values().map(|inv| inv.days_of_supply))
                    .unwrap_or(DaysOfSupply::Unbounded);

                let state = RegionState {
                    region_name: bank.region_name.clone(),
                    overall_days_of_supply: overall,
                    min_days_of_supply: min,
                    status: parameters.state_region_bands.classify(min),
                    inventory,
                    modifiers: Modifiers {
                        flu_impact: bank.flu_impact,
                        weather_impact: bank.weather_impact,
                    },
                };
                (region_id, state)
            })
            .collect()
    }

    /// The day-indexed history of the simulation so far
    pub fn history(&self) -> &[DayRecord] {
        &self.history
    }

    /// The number of days simulated so far
    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    /// The regional banks, keyed by region ID
    pub fn banks(&self) -> &IndexMap<RegionID, RegionalBank> {
        &self.banks
    }
}

/// Run a simulation for the given number of days, writing results to CSV.
///
/// Each day has a small chance of a random mass casualty event, so demo runs exercise the surge
/// demand path. No risk signals are applied; wiring in live epidemiological and weather feeds is
/// the job of the surrounding services.
///
/// # Arguments
///
/// * `model` - The model to run
/// * `days` - The number of days to simulate
/// * `start_date` - The date of the first simulated day
/// * `seed` - RNG seed for reproducible runs
/// * `output_path` - Folder to write output files to
pub fn run(
    model: Model,
    days: u32,
    start_date: NaiveDate,
    seed: Option<u64>,
    output_path: &Path,
) -> Result<()> {
    ensure!(days > 0, "Cannot simulate zero days");
    let region_ids: Vec<RegionID> = model.regions.keys().copied().collect();
    let mut simulation = NationalSimulation::new(model, start_date, seed)?;
    let mut event_rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };
    let signals = RiskSignals::default();

    for _ in 0..days {
        let mut events = Vec::new();
        if event_rng.gen_range(0.0..1.0) < DEMO_EVENT_PROBABILITY {
            let region_id = region_ids[event_rng.gen_range(0..region_ids.len())];
            let severity = event_rng.gen_range(1.5..3.0);
            info!("Mass casualty event in region {region_id} (severity {severity:.1})");
            events.push(ExternalEvent {
                event_type: EventType::MassCasualty,
                region_id: Some(region_id),
                severity: Some(severity),
            });
        }

        let record = simulation.simulate_day(&signals, &events);
        info!(
            "Day {} ({}): national status {}, {} units collected, {} regions in shortage",
            record.day,
            record.date,
            record.national.status,
            record.national.total_collections,
            record.national.regions_in_shortage
        );
    }

    let recommendations = simulation.get_transfer_recommendations();
    info!("{} transfer recommendations", recommendations.len());

    output::write_history_to_csv(output_path, simulation.history())?;
    output::write_recommendations_to_csv(output_path, &recommendations)?;
    output::write_final_state_to_json(output_path, &simulation.get_current_state())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{simulation, start_date, two_region_model};
    use rstest::rstest;

    #[rstest]
    fn test_new_zero_regions(start_date: NaiveDate) {
        let mut model = Model::builtin();
        model.regions.clear();
        assert!(NationalSimulation::new(model, start_date, Some(0)).is_err());
    }

    #[rstest]
    fn test_simulate_day_appends_history(mut simulation: NationalSimulation) {
        let signals = RiskSignals::default();
        assert_eq!(simulation.current_day(), 0);

        simulation.simulate_day(&signals, &[]);
        simulation.simulate_day(&signals, &[]);

        assert_eq!(simulation.current_day(), 2);
        assert_eq!(simulation.history().len(), 2);
        assert_eq!(simulation.history()[0].day, 1);
        assert_eq!(simulation.history()[1].day, 2);
        assert_eq!(
            simulation.history()[1].date,
            simulation.history()[0].date.succ_opt().unwrap()
        );
    }

    #[rstest]
    fn test_national_totals_sum_regions(mut simulation: NationalSimulation) {
        let record = simulation.simulate_day(&RiskSignals::default(), &[]);
        let collections: u32 = record.regions.values().map(|r| r.total_collections).sum();
        assert_eq!(record.national.total_collections, collections);
        let expired: u32 = record.regions.values().map(|r| r.total_expired).sum();
        assert_eq!(record.national.total_expired, expired);
    }

    #[rstest]
    fn test_execute_transfer(mut simulation: NationalSimulation) {
        let from = RegionID(1);
        let to = RegionID(2);
        let before = simulation.banks()[&from].inventory[&BloodType::OPos].total_units();

        let moved = simulation
            .execute_transfer(from, to, BloodType::OPos, 10)
            .unwrap();
        assert_eq!(moved, 10);
        assert_eq!(
            simulation.banks()[&from].inventory[&BloodType::OPos].total_units(),
            before - 10
        );

        // Invalid transfers
        assert!(simulation
            .execute_transfer(from, from, BloodType::OPos, 10)
            .is_err());
        assert!(simulation
            .execute_transfer(from, RegionID(99), BloodType::OPos, 10)
            .is_err());
    }

    #[rstest]
    fn test_get_current_state(mut simulation: NationalSimulation) {
        simulation.simulate_day(&RiskSignals::default(), &[]);
        let state = simulation.get_current_state();

        assert_eq!(state.len(), 2);
        for region_state in state.values() {
            assert_eq!(region_state.inventory.len(), 8);
            assert!(!region_state.min_days_of_supply.is_above(
                region_state
                    .overall_days_of_supply
                    .value()
                    .unwrap_or(f64::MAX)
            ));
        }
    }

    #[rstest]
    fn test_run(two_region_model: Model, start_date: NaiveDate) {
        let dir = tempfile::tempdir().unwrap();
        run(two_region_model, 3, start_date, Some(42), dir.path()).unwrap();

        assert!(dir.path().join("national_daily.csv").is_file());
        assert!(dir.path().join("regional_daily.csv").is_file());
        assert!(dir.path().join("transfer_recommendations.csv").is_file());
        assert!(dir.path().join("final_state.json").is_file());
    }
}
