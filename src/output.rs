//! The module responsible for writing simulation results to disk.
use crate::blood::BloodType;
use crate::region::RegionID;
use crate::simulation::{CurrentState, DayRecord, TransferRecommendation};
use crate::supply::{DaysOfSupply, SupplyStatus};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::path::Path;

/// The output file name for national daily aggregates
const NATIONAL_DAILY_FILE_NAME: &str = "national_daily.csv";

/// The output file name for per-region, per-type daily results
const REGIONAL_DAILY_FILE_NAME: &str = "regional_daily.csv";

/// The output file name for transfer recommendations
const RECOMMENDATIONS_FILE_NAME: &str = "transfer_recommendations.csv";

/// The output file name for the final state snapshot
const FINAL_STATE_FILE_NAME: &str = "final_state.json";

/// Create the output directory if it does not already exist.
pub fn create_output_directory(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        // already exists
        return Ok(());
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Could not create output directory {}", output_dir.display()))
}

/// A row in the national daily aggregates CSV file
#[derive(Serialize)]
struct NationalDailyRow {
    day: u32,
    date: NaiveDate,
    status: String,
    overall_days_of_supply: DaysOfSupply,
    total_collections: u32,
    total_transfusions: u32,
    total_expired: u32,
    regions_in_shortage: usize,
}

/// A row in the per-region, per-type daily results CSV file
#[derive(Serialize)]
struct RegionalDailyRow {
    day: u32,
    region_id: RegionID,
    blood_type: BloodType,
    units_available: u32,
    days_of_supply: DaysOfSupply,
    collected: u32,
    transfused: u32,
    expired: u32,
    unmet_demand: u32,
    status: SupplyStatus,
}

/// Write the full day-by-day history to the national and regional CSV files.
pub fn write_history_to_csv(output_dir: &Path, history: &[DayRecord]) -> Result<()> {
    create_output_directory(output_dir)?;

    let mut national = csv::Writer::from_path(output_dir.join(NATIONAL_DAILY_FILE_NAME))?;
    let mut regional = csv::Writer::from_path(output_dir.join(REGIONAL_DAILY_FILE_NAME))?;

    for record in history {
        national.serialize(NationalDailyRow {
            day: record.day,
            date: record.date,
            status: record.national.status.to_string(),
            overall_days_of_supply: record.national.overall_days_of_supply,
            total_collections: record.national.total_collections,
            total_transfusions: record.national.total_transfusions,
            total_expired: record.national.total_expired,
            regions_in_shortage: record.national.regions_in_shortage,
        })?;

        for (&region_id, snapshot) in &record.regions {
            for (&blood_type, type_snapshot) in &snapshot.inventory {
                regional.serialize(RegionalDailyRow {
                    day: record.day,
                    region_id,
                    blood_type,
                    units_available: type_snapshot.units_available,
                    days_of_supply: type_snapshot.days_of_supply,
                    collected: type_snapshot.collected,
                    transfused: type_snapshot.transfused,
                    expired: type_snapshot.expired,
                    unmet_demand: type_snapshot.unmet_demand,
                    status: type_snapshot.status,
                })?;
            }
        }
    }
    national.flush()?;
    regional.flush()?;

    Ok(())
}

/// Write transfer recommendations to CSV.
pub fn write_recommendations_to_csv(
    output_dir: &Path,
    recommendations: &[TransferRecommendation],
) -> Result<()> {
    create_output_directory(output_dir)?;

    let mut writer = csv::Writer::from_path(output_dir.join(RECOMMENDATIONS_FILE_NAME))?;
    for recommendation in recommendations {
        writer.serialize(recommendation)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the final state snapshot to a JSON file for downstream consumers.
pub fn write_final_state_to_json(output_dir: &Path, state: &CurrentState) -> Result<()> {
    create_output_directory(output_dir)?;

    let file = File::create(output_dir.join(FINAL_STATE_FILE_NAME))?;
    serde_json::to_writer_pretty(file, state).context("Could not serialise final state")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::simulation;
    use crate::signals::RiskSignals;
    use crate::simulation::NationalSimulation;
    use rstest::rstest;
    use tempfile::tempdir;

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");
        create_output_directory(&output_dir).unwrap();
        assert!(output_dir.is_dir());

        // Idempotent
        create_output_directory(&output_dir).unwrap();
    }

    #[rstest]
    fn test_write_history_to_csv(mut simulation: NationalSimulation) {
        simulation.simulate_day(&RiskSignals::default(), &[]);
        simulation.simulate_day(&RiskSignals::default(), &[]);

        let dir = tempdir().unwrap();
        write_history_to_csv(dir.path(), simulation.history()).unwrap();

        let national = fs::read_to_string(dir.path().join(NATIONAL_DAILY_FILE_NAME)).unwrap();
        // Header plus one row per day
        assert_eq!(national.lines().count(), 3);
        assert!(national.starts_with("day,date,status,"));

        let regional = fs::read_to_string(dir.path().join(REGIONAL_DAILY_FILE_NAME)).unwrap();
        // Header plus 2 days x 2 regions x 8 types
        assert_eq!(regional.lines().count(), 1 + 2 * 2 * 8);
    }

    #[rstest]
    fn test_write_final_state_to_json(mut simulation: NationalSimulation) {
        simulation.simulate_day(&RiskSignals::default(), &[]);

        let dir = tempdir().unwrap();
        write_final_state_to_json(dir.path(), &simulation.get_current_state()).unwrap();

        let json = fs::read_to_string(dir.path().join(FINAL_STATE_FILE_NAME)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.as_object().unwrap().len() == 2);
    }
}
