//! Fixtures for tests
use crate::bank::RegionalBank;
use crate::model::{Model, Parameters};
use crate::region::{Region, RegionID, RegionMap};
use crate::simulation::NationalSimulation;
use chrono::NaiveDate;
use rstest::fixture;

/// A region with the given ID and population
pub fn test_region(id: u32, population: u64) -> Region {
    Region {
        id: RegionID(id),
        name: format!("Region {id}"),
        population,
    }
}

#[fixture]
pub fn parameters() -> Parameters {
    Parameters::default()
}

/// Two regions with a tenfold population difference
#[fixture]
pub fn regions() -> RegionMap {
    [test_region(1, 1_000_000), test_region(2, 100_000)]
        .into_iter()
        .map(|region| (region.id, region))
        .collect()
}

#[fixture]
pub fn two_region_model(parameters: Parameters, regions: RegionMap) -> Model {
    Model {
        parameters,
        regions,
    }
}

#[fixture]
pub fn bank(parameters: Parameters) -> RegionalBank {
    RegionalBank::new(&test_region(1, 1_000_000), &parameters).unwrap()
}

/// A Monday, so weekday demand factors apply
#[fixture]
pub fn weekday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

#[fixture]
pub fn start_date(weekday: NaiveDate) -> NaiveDate {
    weekday
}

#[fixture]
pub fn simulation(two_region_model: Model, start_date: NaiveDate) -> NationalSimulation {
    NationalSimulation::new(two_region_model, start_date, Some(42)).unwrap()
}
