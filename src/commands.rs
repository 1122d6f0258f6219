//! The command line interface for the simulation.
use crate::log;
use crate::model::Model;
use crate::settings::Settings;
use crate::simulation;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// The default folder in which output files are written
const DEFAULT_OUTPUT_DIRECTORY: &str = "hemosim_results";

/// The default number of days to simulate
const DEFAULT_DAYS: u32 = 7;

#[derive(Parser)]
#[command(version, about)]
/// The command line interface for the simulation.
pub struct Cli {
    #[command(subcommand)]
    /// The available commands.
    pub command: Commands,
}

#[derive(Subcommand)]
/// The available commands.
pub enum Commands {
    /// Run a simulation.
    Run {
        /// Path to the model directory (built-in HHS regions model if omitted).
        #[arg(long)]
        model_dir: Option<PathBuf>,
        /// The number of days to simulate.
        #[arg(long, default_value_t = DEFAULT_DAYS)]
        days: u32,
        /// The date of the first simulated day (today if omitted).
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// RNG seed for reproducible runs.
        #[arg(long)]
        seed: Option<u64>,
        /// Directory to write output files to.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// Handle the `run` command.
pub fn handle_run_command(
    model_dir: Option<&Path>,
    days: u32,
    start_date: Option<NaiveDate>,
    seed: Option<u64>,
    output_dir: Option<&Path>,
) -> Result<()> {
    let settings = match model_dir {
        Some(model_dir) => Settings::from_path(model_dir)?,
        None => Settings::default(),
    };
    log::init(settings.log_level.as_deref()).context("Failed to initialise logging.")?;

    let model = match model_dir {
        Some(model_dir) => Model::from_path(model_dir).context("Failed to load model.")?,
        None => Model::builtin(),
    };
    let start_date = start_date.unwrap_or_else(|| Local::now().date_naive());
    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIRECTORY));

    simulation::run(model, days, start_date, seed, &output_dir)
}
