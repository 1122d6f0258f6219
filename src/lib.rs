//! Common functionality for hemosim.
#![warn(missing_docs)]
pub mod bank;
pub mod blood;
pub mod calendar;
pub mod commands;
pub mod input;
pub mod inventory;
pub mod log;
pub mod model;
pub mod output;
pub mod region;
pub mod settings;
pub mod signals;
pub mod simulation;
pub mod supply;

#[cfg(test)]
mod fixture;
