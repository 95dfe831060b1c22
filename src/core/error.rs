//! Error handling for circuit construction and evaluation

use std::fmt;
use thiserror::Error;

/// Identifier of a simulated binary wire.
/// Wire `0` is the most significant bit of a readout outcome index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(pub u64);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W({})", self.0)
    }
}

/// Failures raised while building or evaluating a fixed circuit.
/// None of these occur for the built-in signal circuits; they guard the
/// engine against malformed hand-built circuits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// The amplitude state lost its unit norm.
    #[error("Incoherence Violation: {message}")]
    Incoherence {
        /// Incoherence failure message
        message: String,
    },

    /// An operation referenced a wire outside the simulation context.
    #[error("Reference Violation: {message}")]
    ReferenceViolation {
        /// ReferenceViolation failure message
        message: String,
    },

    /// An applied operation is inconsistent with the circuit (e.g. control == target).
    #[error("Invalid Operation: {message}")]
    InvalidOperation {
        /// InvalidOperation failure message
        message: String,
    },

    /// General error encountered during evaluation itself.
    #[error("Simulation Process Error: {message}")]
    SimulationError {
        /// SimulationError failure message
        message: String,
    },
}
