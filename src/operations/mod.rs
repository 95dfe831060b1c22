// src/operations/mod.rs

//! Defines the gate set available to the fixed signal circuits.
//!
//! The set is deliberately small: the signal circuits only ever rotate a wire,
//! entangle neighbouring wires with a controlled flip, optionally shift a
//! phase, and finally read out the joint distribution.

use crate::core::WireId;

/// A single step of a fixed circuit.
#[derive(Debug, Clone, PartialEq)] // f64 fields rule out Eq
pub enum Operation {
    /// Rotation about the Y axis by `theta` radians.
    ///
    /// Matrix `[[cos(θ/2), -sin(θ/2)], [sin(θ/2), cos(θ/2)]]`. Starting from
    /// `|0>` it leaves probability `sin²(θ/2)` on outcome 1, which is how a
    /// normalized telemetry value becomes a bias on a wire.
    Rotate {
        /// The wire being rotated.
        target: WireId,
        /// Rotation angle in radians.
        theta: f64,
    },

    /// Flip `target` when `control` is 1 (CNOT).
    ControlledFlip {
        /// Wire whose value conditions the flip.
        control: WireId,
        /// Wire that is flipped.
        target: WireId,
    },

    /// Multiply the `|1>` component of `target` by `e^(iθ)`.
    /// Invisible in the readout on its own; it only matters if later gates interfere.
    PhaseShift {
        /// The wire whose phase is shifted.
        target: WireId,
        /// Phase angle in radians.
        theta: f64,
    },

    /// Read out the joint distribution over `targets`.
    /// Marks the end of the evaluated circuit; it does not collapse the state.
    Readout {
        /// Wires included in the readout, most significant first.
        targets: Vec<WireId>,
    },
}

impl Operation {
    /// Returns every wire mentioned by this operation.
    pub fn involved_wires(&self) -> Vec<WireId> {
        match self {
            Operation::Rotate { target, .. } => vec![*target],
            Operation::ControlledFlip { control, target } => vec![*control, *target],
            Operation::PhaseShift { target, .. } => vec![*target],
            Operation::Readout { targets } => targets.clone(),
        }
    }
}
