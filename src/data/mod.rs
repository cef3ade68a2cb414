//! Synthetic data for demonstrations and tests.

pub mod sample;

pub use sample::*;
