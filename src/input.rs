//! Common routines for reading model configuration files.
use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Parse a TOML file at the specified path.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path)
        .with_context(|| format!("Could not read file {}", file_path.display()))?;
    toml::from_str(&toml_str)
        .with_context(|| format!("Could not parse TOML file {}", file_path.display()))
}

/// Read a series of records from a CSV file into a `Vec`.
///
/// The file must contain at least one record.
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let context = || format!("Error reading {}", file_path.display());
    let mut reader = csv::Reader::from_path(file_path).with_context(context)?;

    let records = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(context)?;
    ensure!(!records.is_empty(), "CSV file {} is empty", file_path.display());

    Ok(records)
}
