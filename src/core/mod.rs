// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;

// Re-export public types for convenient access via `qrisk::core::TypeName`
pub use error::{CircuitError, WireId};
pub use state::AmplitudeState;

pub mod constants;
pub use constants::qrisk_constants::{DISTRIBUTION_TOLERANCE, PERCENT_MAX, PI};
