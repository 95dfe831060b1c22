// src/simulation/results.rs
use crate::core::{AmplitudeState, WireId};
use std::fmt;

/// Holds the outcome of evaluating a circuit: the readout distribution and
/// the amplitude state it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Wires that were read out, most significant first.
    readout_wires: Vec<WireId>,
    /// Probability of each joint outcome over `readout_wires`.
    distribution: Vec<f64>,
    /// Amplitude state after the last gate.
    final_state: Option<AmplitudeState>,
}

impl SimulationResult {
    /// Creates a new, empty result. (Internal visibility)
    pub(crate) fn new() -> Self {
        Self {
            readout_wires: Vec::new(),
            distribution: Vec::new(),
            final_state: None,
        }
    }

    /// Records a readout. A later readout replaces an earlier one. (Internal visibility)
    pub(crate) fn record_readout(&mut self, wires: Vec<WireId>, distribution: Vec<f64>) {
        self.readout_wires = wires;
        self.distribution = distribution;
    }

    pub(crate) fn record_final_state(&mut self, state: AmplitudeState) {
        self.final_state = Some(state);
    }

    /// Probability of each joint outcome, indexed by the outcome's binary expansion.
    pub fn distribution(&self) -> &[f64] {
        &self.distribution
    }

    /// Wires covered by `distribution`, most significant first.
    pub fn readout_wires(&self) -> &[WireId] {
        &self.readout_wires
    }

    /// The amplitude state after the last gate, if any gate ran.
    pub fn final_state(&self) -> Option<&AmplitudeState> {
        self.final_state.as_ref()
    }

    /// Marginal probability that `wire` reads 1, if it was part of the readout.
    pub fn probability_of_one(&self, wire: &WireId) -> Option<f64> {
        let position = self.readout_wires.iter().position(|w| w == wire)?;
        let shift = self.readout_wires.len() - 1 - position;
        Some(
            self.distribution
                .iter()
                .enumerate()
                .filter(|(k, _)| (k >> shift) & 1 == 1)
                .map(|(_, p)| p)
                .sum(),
        )
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        if self.distribution.is_empty() {
            writeln!(f, "  No wires were read out.")?;
            return Ok(());
        }
        let width = self.readout_wires.len();
        writeln!(f, "  Readout over {} wires:", width)?;
        for (k, p) in self.distribution.iter().enumerate() {
            writeln!(f, "    |{:0width$b}>: {:.6}", k, p, width = width)?;
        }
        Ok(())
    }
}
