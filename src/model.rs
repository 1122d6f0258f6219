//! The model for a simulation: region definitions plus simulation parameters.
use crate::region::{RegionMap, builtin_regions, read_regions};
use anyhow::{Context, Result};
use std::path::Path;

pub mod parameters;
pub use parameters::Parameters;

/// A complete simulation model
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Simulation parameters
    pub parameters: Parameters,
    /// The regions to simulate
    pub regions: RegionMap,
}

impl Model {
    /// Load a model from the specified directory (`model.toml` + `regions.csv`).
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let parameters = Parameters::from_path(model_dir).context("Failed to read parameters")?;
        let regions = read_regions(model_dir).context("Failed to read regions")?;

        Ok(Model {
            parameters,
            regions,
        })
    }

    /// The built-in model: default parameters over the ten US HHS regions.
    pub fn builtin() -> Model {
        Model {
            parameters: Parameters::default(),
            regions: builtin_regions(),
        }
    }
}
