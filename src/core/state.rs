// src/core/state.rs

use num_complex::Complex;
use std::fmt;

/// The joint amplitude state of all simulated wires before readout.
///
/// The vector has `2^N` entries for `N` wires. Entry `k` holds the complex
/// amplitude of the joint outcome whose binary expansion is `k`, with wire 0
/// as the most significant bit. Phase is carried even though the built-in
/// circuits only read out magnitudes, so phase rotations stay representable.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeState {
    state_vector: Vec<Complex<f64>>,
}

impl AmplitudeState {
    /// Creates a new amplitude state from a given vector.
    /// Normalization is not enforced here; see `validation::check_normalization`.
    pub(crate) fn new(initial_vector: Vec<Complex<f64>>) -> Self {
        Self { state_vector: initial_vector }
    }

    /// Provides read-only access to the internal state vector.
    pub fn vector(&self) -> &[Complex<f64>] {
        &self.state_vector
    }

    /// Gets the number of joint outcomes represented.
    pub fn dim(&self) -> usize {
        self.state_vector.len()
    }

    /// Squared magnitudes of every amplitude, in outcome order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.state_vector.iter().map(|c| c.norm_sqr()).collect()
    }
}

impl fmt::Display for AmplitudeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amplitudes[")?;
        for (i, c) in self.state_vector.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}
