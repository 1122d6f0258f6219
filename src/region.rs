//! Regions represent the geographical areas between which blood products are collected, used and
//! transferred.
use crate::input::read_csv;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

const REGIONS_FILE_NAME: &str = "regions.csv";

/// A numeric identifier for a region (e.g. an HHS region number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionID(pub u32);

impl Display for RegionID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RegionID {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A map of [`Region`]s, keyed by region ID
pub type RegionMap = IndexMap<RegionID, Region>;

/// A region with an ID, a descriptive name and a resident population
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Region {
    /// A unique identifier for the region
    pub id: RegionID,
    /// A text description of the region (e.g. "Region 1 - New England")
    pub name: String,
    /// The resident population served by the region's blood banks
    pub population: u64,
}

/// Read region definitions from a `regions.csv` file in the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A map of regions keyed by region ID, or an error if the file is missing or invalid.
pub fn read_regions(model_dir: &Path) -> Result<RegionMap> {
    let file_path = model_dir.join(REGIONS_FILE_NAME);
    let regions = read_csv::<Region>(&file_path)?;
    regions_from_iter(regions).with_context(|| format!("Error reading {}", file_path.display()))
}

fn regions_from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Result<RegionMap> {
    let mut map = RegionMap::new();
    for region in iter {
        let id = region.id;
        ensure!(region.population > 0, "Region {id} has zero population");
        ensure!(
            map.insert(id, region).is_none(),
            "Duplicate region ID {id}"
        );
    }
    ensure!(!map.is_empty(), "No regions defined");

    Ok(map)
}

/// The built-in model regions: the ten US HHS regions.
///
/// Used when no model directory is supplied on the command line.
pub fn builtin_regions() -> RegionMap {
    let regions = [
        (1, "Region 1 - New England", 14_850_000),
        (2, "Region 2 - NY/NJ", 28_500_000),
        (3, "Region 3 - Mid-Atlantic", 31_200_000),
        (4, "Region 4 - Southeast", 65_800_000),
        (5, "Region 5 - Midwest", 52_300_000),
        (6, "Region 6 - South Central", 40_100_000),
        (7, "Region 7 - Central", 13_900_000),
        (8, "Region 8 - Mountain", 12_400_000),
        (9, "Region 9 - Pacific Southwest", 51_600_000),
        (10, "Region 10 - Pacific Northwest", 13_500_000),
    ];

    regions
        .into_iter()
        .map(|(id, name, population)| {
            (
                RegionID(id),
                Region {
                    id: RegionID(id),
                    name: name.to_string(),
                    population,
                },
            )
        })
        .collect()
}
