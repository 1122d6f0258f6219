//! Defines the `Parameters` struct, which represents the contents of `model.toml`.
use crate::calendar::Season;
use crate::supply::{RegionStatusBands, StatusBands};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

use crate::input::read_toml;

const PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_shelf_life_days, u32, 42);
define_param_default!(default_base_demand_per_100k, f64, 8.5);
define_param_default!(default_initial_supply_days, f64, 3.0);
define_param_default!(default_initial_age_spread_days, u32, 21);
define_param_default!(default_flu_collection_weight, f64, 0.3);
define_param_default!(default_weather_collection_weight, f64, 0.5);
define_param_default!(default_collection_variance, f64, 0.15);
define_param_default!(default_collection_noise_std, f64, 0.1);
define_param_default!(default_demand_variance, f64, 0.1);
define_param_default!(default_weekend_demand_factor, f64, 0.75);
define_param_default!(default_critical_type_threshold, f64, 1.5);
define_param_default!(default_critical_region_count, usize, 3);
define_param_default!(default_shortage_below, f64, 1.5);
define_param_default!(default_surplus_above, f64, 4.0);
define_param_default!(default_min_surplus_units, u32, 100);
define_param_default!(default_surplus_share, f64, 0.1);
define_param_default!(default_max_units_per_transfer, u32, 100);
define_param_default!(default_high_priority_below, f64, 1.0);
define_param_default!(default_max_recommendations, usize, 10);

/// Seasonal adjustment factors for donations and demand
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeasonFactor {
    /// Multiplier applied to expected donations
    pub donation: f64,
    /// Multiplier applied to expected demand
    pub demand: f64,
}

/// Per-season adjustment factors.
///
/// Winter and summer see fewer donations (holidays and vacations); winter sees slightly more
/// demand from accidents.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeasonalFactors {
    /// Factors for December to February
    #[serde(default = "default_winter_factor")]
    pub winter: SeasonFactor,
    /// Factors for March to May
    #[serde(default = "default_neutral_factor")]
    pub spring: SeasonFactor,
    /// Factors for June to August
    #[serde(default = "default_summer_factor")]
    pub summer: SeasonFactor,
    /// Factors for September to November
    #[serde(default = "default_neutral_factor")]
    pub fall: SeasonFactor,
}

fn default_winter_factor() -> SeasonFactor {
    SeasonFactor {
        donation: 0.85,
        demand: 1.05,
    }
}

fn default_summer_factor() -> SeasonFactor {
    SeasonFactor {
        donation: 0.88,
        demand: 1.02,
    }
}

fn default_neutral_factor() -> SeasonFactor {
    SeasonFactor {
        donation: 1.0,
        demand: 1.0,
    }
}

impl Default for SeasonalFactors {
    fn default() -> Self {
        Self {
            winter: default_winter_factor(),
            spring: default_neutral_factor(),
            summer: default_summer_factor(),
            fall: default_neutral_factor(),
        }
    }
}

impl SeasonalFactors {
    /// The adjustment factors for the given season
    pub fn get(&self, season: Season) -> SeasonFactor {
        match season {
            Season::Winter => self.winter,
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Fall => self.fall,
        }
    }
}

/// Parameters controlling the transfer recommendation query
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferParameters {
    /// Days of supply below which a region counts as being in shortage for a type
    #[serde(default = "default_shortage_below")]
    pub shortage_below: f64,
    /// Days of supply above which a region counts as holding surplus for a type
    #[serde(default = "default_surplus_above")]
    pub surplus_above: f64,
    /// Minimum units a surplus region must hold for a transfer to be meaningful
    #[serde(default = "default_min_surplus_units")]
    pub min_surplus_units: u32,
    /// Fraction of a surplus region's units that may be proposed per recommendation
    #[serde(default = "default_surplus_share")]
    pub surplus_share: f64,
    /// Hard cap on units per recommendation
    #[serde(default = "default_max_units_per_transfer")]
    pub max_units_per_transfer: u32,
    /// Shortage days of supply below which a recommendation is high priority
    #[serde(default = "default_high_priority_below")]
    pub high_priority_below: f64,
    /// Maximum number of recommendations returned
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

impl Default for TransferParameters {
    fn default() -> Self {
        Self {
            shortage_below: default_shortage_below(),
            surplus_above: default_surplus_above(),
            min_surplus_units: default_min_surplus_units(),
            surplus_share: default_surplus_share(),
            max_units_per_transfer: default_max_units_per_transfer(),
            high_priority_below: default_high_priority_below(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

impl TransferParameters {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.shortage_below < self.surplus_above,
            "shortage_below must be less than surplus_above"
        );
        ensure!(
            self.surplus_share > 0.0 && self.surplus_share <= 1.0,
            "surplus_share must be in (0, 1]"
        );
        ensure!(
            self.max_recommendations > 0,
            "max_recommendations cannot be zero"
        );

        Ok(())
    }
}

/// Represents the contents of the entire model parameters file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameters {
    /// Maximum age in days before a unit is discarded
    #[serde(default = "default_shelf_life_days")]
    pub shelf_life_days: u32,
    /// Baseline daily demand in units per 100,000 population, across all blood types
    #[serde(default = "default_base_demand_per_100k")]
    pub base_demand_per_100k: f64,
    /// Days of supply each region starts the simulation with
    #[serde(default = "default_initial_supply_days")]
    pub initial_supply_days: f64,
    /// The starting inventory is spread evenly over ages up to this many days
    #[serde(default = "default_initial_age_spread_days")]
    pub initial_age_spread_days: u32,
    /// Weight of the flu impact in the collection modifier
    #[serde(default = "default_flu_collection_weight")]
    pub flu_collection_weight: f64,
    /// Weight of the weather impact in the collection modifier
    #[serde(default = "default_weather_collection_weight")]
    pub weather_collection_weight: f64,
    /// Half-width of the uniform daily variance applied to collections
    #[serde(default = "default_collection_variance")]
    pub collection_variance: f64,
    /// Gaussian noise applied to collections, as a fraction of the expected value
    #[serde(default = "default_collection_noise_std")]
    pub collection_noise_std: f64,
    /// Half-width of the uniform daily variance applied to demand
    #[serde(default = "default_demand_variance")]
    pub demand_variance: f64,
    /// Demand multiplier applied on weekends (less elective surgery)
    #[serde(default = "default_weekend_demand_factor")]
    pub weekend_demand_factor: f64,
    /// Seasonal adjustment factors
    #[serde(default)]
    pub seasonal_factors: SeasonalFactors,
    /// Status bands used by the daily simulation step
    #[serde(default)]
    pub status_bands: StatusBands,
    /// Per-type status bands used by the current-state query.
    ///
    /// Deliberately configured separately from `status_bands`; the two schemes are independently
    /// tunable.
    #[serde(default)]
    pub state_status_bands: StatusBands,
    /// Region-level status bands used by the current-state query
    #[serde(default)]
    pub state_region_bands: RegionStatusBands,
    /// Days of supply below which a blood type counts as critical in national aggregates
    #[serde(default = "default_critical_type_threshold")]
    pub critical_type_threshold: f64,
    /// More than this many regions in shortage makes the national status critical
    #[serde(default = "default_critical_region_count")]
    pub critical_region_count: usize,
    /// Parameters for the transfer recommendation query
    #[serde(default)]
    pub transfers: TransferParameters,
}

impl Default for Parameters {
    fn default() -> Self {
        // All fields have serde defaults, so an empty TOML file is a valid parameters file
        toml::from_str("").expect("Cannot create parameters from empty TOML file")
    }
}

impl Parameters {
    /// Read a model parameters file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The file contents as a [`Parameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Parameters> {
        let file_path = model_dir.as_ref().join(PARAMETERS_FILE_NAME);
        let parameters: Parameters = read_toml(&file_path)?;

        parameters
            .validate()
            .with_context(|| format!("Invalid parameters in {}", file_path.display()))?;

        Ok(parameters)
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        ensure!(self.shelf_life_days > 0, "shelf_life_days cannot be zero");
        ensure!(
            self.base_demand_per_100k > 0.0,
            "base_demand_per_100k must be positive"
        );
        ensure!(
            self.initial_age_spread_days > 0
                && self.initial_age_spread_days <= self.shelf_life_days,
            "initial_age_spread_days must be positive and no greater than shelf_life_days"
        );
        for (name, value) in [
            ("collection_variance", self.collection_variance),
            ("collection_noise_std", self.collection_noise_std),
            ("demand_variance", self.demand_variance),
        ] {
            ensure!(
                (0.0..1.0).contains(&value),
                "{name} must be in the range [0, 1)"
            );
        }
        ensure!(
            self.weekend_demand_factor > 0.0 && self.weekend_demand_factor <= 1.0,
            "weekend_demand_factor must be in (0, 1]"
        );

        self.status_bands
            .validate()
            .context("Invalid status_bands")?;
        self.state_status_bands
            .validate()
            .context("Invalid state_status_bands")?;
        self.state_region_bands
            .validate()
            .context("Invalid state_region_bands")?;
        self.transfers.validate().context("Invalid transfers")?;

        Ok(())
    }
}
