//! Externally supplied risk signals that modulate daily collections.
//!
//! Signals are produced by upstream data fetchers (epidemiological and weather feeds) and
//! consumed once per simulated day. Missing entries degrade to the lowest-impact defaults; a
//! day-advance never fails because upstream data is unavailable.
use crate::region::RegionID;
use serde::Deserialize;
use std::collections::HashMap;

/// Influenza activity bands as reported by epidemiological surveillance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluActivity {
    /// No notable activity (the default when no signal is available)
    #[default]
    Minimal,
    /// Low activity
    Low,
    /// Moderate activity
    Moderate,
    /// High activity
    High,
    /// Very high activity
    VeryHigh,
}

impl FluActivity {
    /// The donation impact for this activity band, in [0, 1]
    pub fn impact(&self) -> f64 {
        match self {
            Self::Minimal => 0.0,
            Self::Low => 0.1,
            Self::Moderate => 0.25,
            Self::High => 0.4,
            Self::VeryHigh => 0.6,
        }
    }
}

/// A per-region influenza signal
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct FluSignal {
    /// The reported activity band
    #[serde(default)]
    pub activity_level: FluActivity,
}

/// A per-region weather signal
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct WeatherSignal {
    /// Donation impact score in [0, 1], already normalised by the upstream feed
    #[serde(default)]
    pub impact_score: f64,
}

/// The full set of per-region risk signals for one simulated day
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RiskSignals {
    /// Influenza signals, keyed by region ID
    #[serde(default)]
    pub flu: HashMap<RegionID, FluSignal>,
    /// Weather signals, keyed by region ID
    #[serde(default)]
    pub weather: HashMap<RegionID, WeatherSignal>,
}

impl RiskSignals {
    /// The flu signal for a region, defaulting to minimal activity if absent
    pub fn flu_for(&self, region_id: RegionID) -> FluSignal {
        self.flu.get(&region_id).copied().unwrap_or_default()
    }

    /// The weather signal for a region, defaulting to zero impact if absent
    pub fn weather_for(&self, region_id: RegionID) -> WeatherSignal {
        self.weather.get(&region_id).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_flu_impact_is_monotonic() {
        let bands = [
            FluActivity::Minimal,
            FluActivity::Low,
            FluActivity::Moderate,
            FluActivity::High,
            FluActivity::VeryHigh,
        ];
        for pair in bands.windows(2) {
            assert!(pair[0].impact() < pair[1].impact());
        }
    }

    #[test]
    fn test_missing_signals_default() {
        let signals = RiskSignals::default();
        assert_eq!(
            signals.flu_for(RegionID(1)).activity_level,
            FluActivity::Minimal
        );
        assert_approx_eq!(f64, signals.weather_for(RegionID(1)).impact_score, 0.0);
    }

    #[test]
    fn test_deserialise() {
        let signals: RiskSignals = serde_json::from_str(
            r#"{
                "flu": {"1": {"activity_level": "very_high"}},
                "weather": {"2": {"impact_score": 0.4}}
            }"#,
        )
        .unwrap();
        assert_eq!(
            signals.flu_for(RegionID(1)).activity_level,
            FluActivity::VeryHigh
        );
        assert_approx_eq!(f64, signals.weather_for(RegionID(2)).impact_score, 0.4);
    }
}
