//! Core types and utilities for the BioSim island ecosystem simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod fitness;
pub mod stats;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use fitness::*;
pub use stats::*;
