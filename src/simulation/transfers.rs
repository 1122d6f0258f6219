//! Advisory inter-regional transfer recommendations.
//!
//! Recommendations are a stateless query over current inventory; nothing is moved until a caller
//! explicitly executes a transfer.
use crate::bank::RegionalBank;
use crate::blood::BloodType;
use crate::model::parameters::TransferParameters;
use crate::region::RegionID;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use strum::IntoEnumIterator;

/// How urgently a recommended transfer should happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    /// The shortage region is about to run out
    High,
    /// The shortage region is below the comfortable level
    Medium,
}

/// An advisory suggestion to move units from a surplus region to a shortage region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRecommendation {
    /// The surplus region to take units from
    pub from_region: RegionID,
    /// The shortage region to send units to
    pub to_region: RegionID,
    /// The blood type to move
    pub blood_type: BloodType,
    /// The number of units to move
    pub units: u32,
    /// How urgent the transfer is
    pub priority: Priority,
}

struct TypeStatus {
    region_id: RegionID,
    units_available: u32,
    days_of_supply: crate::supply::DaysOfSupply,
}

/// Recommend transfers from surplus regions to shortage regions.
///
/// For each blood type, every (shortage, surplus) region pair yields one proposal, sized at the
/// lesser of `surplus_share` of the surplus region's stock and the per-recommendation cap.
/// Proposals are sorted by priority, then by unit volume descending, and truncated to
/// `max_recommendations`.
pub fn recommend_transfers(
    banks: &IndexMap<RegionID, RegionalBank>,
    parameters: &TransferParameters,
) -> Vec<TransferRecommendation> {
    let mut recommendations = Vec::new();

    for blood_type in BloodType::iter() {
        let statuses: Vec<TypeStatus> = banks
            .values()
            .filter_map(|bank| {
                let inventory = bank.inventory.get(&blood_type)?;
                Some(TypeStatus {
                    region_id: bank.region_id,
                    units_available: inventory.total_units(),
                    days_of_supply: inventory.days_of_supply,
                })
            })
            .collect();

        let shortage = statuses
            .iter()
            .filter(|s| s.days_of_supply.is_below(parameters.shortage_below));
        let surplus = statuses.iter().filter(|s| {
            s.days_of_supply.is_above(parameters.surplus_above)
                && s.units_available > parameters.min_surplus_units
        });

        for (short, surp) in shortage.cartesian_product(surplus.collect::<Vec<_>>()) {
            let units = ((surp.units_available as f64 * parameters.surplus_share) as u32)
                .min(parameters.max_units_per_transfer);
            let priority = if short.days_of_supply.is_below(parameters.high_priority_below) {
                Priority::High
            } else {
                Priority::Medium
            };

            recommendations.push(TransferRecommendation {
                from_region: surp.region_id,
                to_region: short.region_id,
                blood_type,
                units,
                priority,
            });
        }
    }

    recommendations
        .into_iter()
        .sorted_by_key(|r| (r.priority, std::cmp::Reverse(r.units)))
        .take(parameters.max_recommendations)
        .collect()
}
