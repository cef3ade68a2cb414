//! Domain types used throughout the fit.
//!
//! This module defines:
//!
//! - validated inputs (`Observations`, `Seed`)
//! - subset membership (`Subset`)
//! - configuration and driver state (`BaconConfig`, `Phase`)
//! - fit outputs (`BaconFit`)

pub mod types;

pub use types::*;
