//! Supply metrics: days of supply and the status bands derived from it.
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The primary scarcity metric: current units divided by expected daily consumption.
///
/// A product with zero expected daily demand has an unbounded supply rather than a division by
/// zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DaysOfSupply {
    /// Finite number of days the current stock will last
    Finite(f64),
    /// Demand is zero, so the current stock never runs out
    Unbounded,
}

impl DaysOfSupply {
    /// Calculate days of supply from a unit count and an expected daily demand
    pub fn calculate(total_units: u32, daily_demand: f64) -> Self {
        if daily_demand > 0.0 {
            Self::Finite(f64::from(total_units) / daily_demand)
        } else {
            Self::Unbounded
        }
    }

    /// The finite value, if there is one
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Finite(days) => Some(*days),
            Self::Unbounded => None,
        }
    }

    /// Whether this supply lies strictly below the given threshold.
    ///
    /// An unbounded supply is below no threshold.
    pub fn is_below(&self, threshold: f64) -> bool {
        match self {
            Self::Finite(days) => *days < threshold,
            Self::Unbounded => false,
        }
    }

    /// Whether this supply lies strictly above the given threshold
    pub fn is_above(&self, threshold: f64) -> bool {
        match self {
            Self::Finite(days) => *days > threshold,
            Self::Unbounded => true,
        }
    }

    /// The arithmetic mean of a set of supplies.
    ///
    /// Any unbounded element makes the mean unbounded. Returns `None` for an empty set.
    pub fn mean<I: IntoIterator<Item = DaysOfSupply>>(values: I) -> Option<Self> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for value in values {
            match value {
                Self::Finite(days) => sum += days,
                Self::Unbounded => return Some(Self::Unbounded),
            }
            count += 1;
        }

        (count > 0).then(|| Self::Finite(sum / count as f64))
    }

    /// The minimum of a set of supplies. Returns `None` for an empty set.
    pub fn min<I: IntoIterator<Item = DaysOfSupply>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .reduce(|a, b| if b.is_below_supply(&a) { b } else { a })
    }

    fn is_below_supply(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => a < b,
            (Self::Finite(_), Self::Unbounded) => true,
            (Self::Unbounded, _) => false,
        }
    }
}

impl Display for DaysOfSupply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(days) => write!(f, "{days:.2}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl Serialize for DaysOfSupply {
    fn serialize<S>(&self, serialiser: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialiser.collect_str(self)
    }
}

/// Supply status for a single product type or for a region's scarcest product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SupplyStatus {
    /// Supply will be exhausted imminently
    Critical,
    /// Supply is below the comfortable operating level
    Low,
    /// Supply covers normal operations
    Adequate,
    /// Supply comfortably exceeds normal operations
    Healthy,
}

/// Threshold bands for the four-way supply status classification.
///
/// The bands partition the whole range: anything below `critical_below` is critical, then low,
/// then adequate, and everything at or above `adequate_below` is healthy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusBands {
    /// Days of supply below which the status is critical
    #[serde(default = "default_critical_below")]
    pub critical_below: f64,
    /// Days of supply below which the status is low
    #[serde(default = "default_low_below")]
    pub low_below: f64,
    /// Days of supply below which the status is adequate (healthy above)
    #[serde(default = "default_adequate_below")]
    pub adequate_below: f64,
}

fn default_critical_below() -> f64 {
    1.0
}

fn default_low_below() -> f64 {
    2.0
}

fn default_adequate_below() -> f64 {
    3.0
}

impl Default for StatusBands {
    fn default() -> Self {
        Self {
            critical_below: default_critical_below(),
            low_below: default_low_below(),
            adequate_below: default_adequate_below(),
        }
    }
}

impl StatusBands {
    /// Classify a days-of-supply value into a status band
    pub fn classify(&self, days: DaysOfSupply) -> SupplyStatus {
        if days.is_below(self.critical_below) {
            SupplyStatus::Critical
        } else if days.is_below(self.low_below) {
            SupplyStatus::Low
        } else if days.is_below(self.adequate_below) {
            SupplyStatus::Adequate
        } else {
            SupplyStatus::Healthy
        }
    }

    /// Check that the thresholds are strictly increasing
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.critical_below < self.low_below && self.low_below < self.adequate_below,
            "Status band thresholds must be strictly increasing \
            (critical_below < low_below < adequate_below)"
        );

        Ok(())
    }
}

/// Threshold bands for the coarser three-way region status used by state queries.
///
/// Everything at or above `low_below` is adequate; there is no healthy band.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionStatusBands {
    /// Days of supply below which the status is critical
    #[serde(default = "default_critical_below")]
    pub critical_below: f64,
    /// Days of supply below which the status is low (adequate above)
    #[serde(default = "default_low_below")]
    pub low_below: f64,
}

impl Default for RegionStatusBands {
    fn default() -> Self {
        Self {
            critical_below: default_critical_below(),
            low_below: default_low_below(),
        }
    }
}

impl RegionStatusBands {
    /// Classify a days-of-supply value into a status band
    pub fn classify(&self, days: DaysOfSupply) -> SupplyStatus {
        if days.is_below(self.critical_below) {
            SupplyStatus::Critical
        } else if days.is_below(self.low_below) {
            SupplyStatus::Low
        } else {
            SupplyStatus::Adequate
        }
    }

    /// Check that the thresholds are strictly increasing
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.critical_below < self.low_below,
            "Region status band thresholds must be strictly increasing \
            (critical_below < low_below)"
        );

        Ok(())
    }
}
