//! Blood product types and their distribution in the donor population.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// One of the eight ABO/Rh blood types
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum BloodType {
    /// O positive
    #[strum(serialize = "O+")]
    #[serde(rename = "O+")]
    OPos,
    /// O negative
    #[strum(serialize = "O-")]
    #[serde(rename = "O-")]
    ONeg,
    /// A positive
    #[strum(serialize = "A+")]
    #[serde(rename = "A+")]
    APos,
    /// A negative
    #[strum(serialize = "A-")]
    #[serde(rename = "A-")]
    ANeg,
    /// B positive
    #[strum(serialize = "B+")]
    #[serde(rename = "B+")]
    BPos,
    /// B negative
    #[strum(serialize = "B-")]
    #[serde(rename = "B-")]
    BNeg,
    /// AB positive
    #[strum(serialize = "AB+")]
    #[serde(rename = "AB+")]
    ABPos,
    /// AB negative
    #[strum(serialize = "AB-")]
    #[serde(rename = "AB-")]
    ABNeg,
}

impl BloodType {
    /// The fraction of the US population with this blood type
    pub fn distribution_fraction(&self) -> f64 {
        match self {
            Self::OPos => 0.374,
            Self::ONeg => 0.066,
            Self::APos => 0.316,
            Self::ANeg => 0.063,
            Self::BPos => 0.094,
            Self::BNeg => 0.015,
            Self::ABPos => 0.034,
            Self::ABNeg => 0.006,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_distribution_sums_to_one() {
        let total: f64 = BloodType::iter().map(|bt| bt.distribution_fraction()).sum();
        assert_approx_eq!(f64, total, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_display() {
        assert_eq!(BloodType::OPos.to_string(), "O+");
        assert_eq!(BloodType::ABNeg.to_string(), "AB-");
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&BloodType::ONeg).unwrap();
        assert_eq!(json, "\"O-\"");
        let parsed: BloodType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BloodType::ONeg);
    }
}
