//! External events and their translation into per-region demand multipliers.
use crate::region::{RegionID, RegionMap};
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;

/// Demand multiplier for a major surgery day
const MAJOR_SURGERY_MULTIPLIER: f64 = 1.3;

/// Demand multiplier for a holiday (less elective surgery)
const HOLIDAY_MULTIPLIER: f64 = 0.8;

/// Default severity for a mass casualty event with no severity given
const DEFAULT_MASS_CASUALTY_SEVERITY: f64 = 2.0;

/// The kind of discrete shock an event represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A mass casualty incident; multiplies demand by the event's severity
    MassCasualty,
    /// A day with unusually many scheduled surgeries
    MajorSurgeryDay,
    /// A public holiday with reduced elective activity
    Holiday,
}

/// A discrete external event affecting one region's demand for a day
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalEvent {
    /// The kind of event
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// The affected region. Events without a region have no effect (see below).
    #[serde(default)]
    pub region_id: Option<RegionID>,
    /// Severity factor for mass casualty events
    #[serde(default)]
    pub severity: Option<f64>,
}

impl ExternalEvent {
    fn multiplier(&self) -> f64 {
        match self.event_type {
            EventType::MassCasualty => {
                self.severity.unwrap_or(DEFAULT_MASS_CASUALTY_SEVERITY)
            }
            EventType::MajorSurgeryDay => MAJOR_SURGERY_MULTIPLIER,
            EventType::Holiday => HOLIDAY_MULTIPLIER,
        }
    }
}

/// Translate a day's events into a per-region demand multiplier map.
///
/// Every region starts at 1.0; multipliers from multiple events targeting the same region
/// compose multiplicatively. Events without a `region_id` (national scope) are accepted by the
/// schema but currently have no effect; they are logged so the omission is visible.
pub fn demand_multipliers(
    events: &[ExternalEvent],
    regions: &RegionMap,
) -> HashMap<RegionID, f64> {
    let mut multipliers: HashMap<RegionID, f64> =
        regions.keys().map(|&region_id| (region_id, 1.0)).collect();

    for event in events {
        let Some(region_id) = event.region_id else {
            warn!(
                "Ignoring national-scope event {:?}: events without a region ID are not applied",
                event.event_type
            );
            continue;
        };
        let Some(multiplier) = multipliers.get_mut(&region_id) else {
            warn!("Ignoring event targeting unknown region {region_id}");
            continue;
        };
        *multiplier *= event.multiplier();
    }

    multipliers
}
