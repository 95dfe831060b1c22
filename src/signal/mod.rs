// src/signal/mod.rs

//! The telemetry signal transform.
//!
//! CPU and RAM percentages (and, for the `Hypertime` generation, a
//! time-derived pulse) are mapped onto rotation angles of a fixed circuit.
//! The circuit is evaluated by the state-vector `Simulator` and the joint
//! readout over every wire becomes the `SignalVector`.
//!
//! The transform is a pure function of its scalar inputs. Sampling the pulse
//! from the wall clock is done separately by [`hypertime_pulse`], so a scan
//! with a given pulse can be reproduced exactly.

use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::{CircuitError, PERCENT_MAX, PI, WireId};
use crate::simulation::Simulator;
use crate::validation::check_normalization;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which generation of the scanner the transform (and the rest of the
/// pipeline defaults) follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Generation {
    /// Five wires, telemetry only.
    Classic,
    /// Four wires, telemetry plus a wall-clock pulse.
    #[default]
    Hypertime,
}

impl Generation {
    /// Number of simulated wires.
    pub fn wire_count(&self) -> usize {
        match self {
            Generation::Classic => 5,
            Generation::Hypertime => 4,
        }
    }

    /// Length of every `SignalVector` this generation produces.
    pub fn outcome_count(&self) -> usize {
        1 << self.wire_count()
    }

    /// Whether the transform consumes a pulse.
    pub fn uses_pulse(&self) -> bool {
        matches!(self, Generation::Hypertime)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::Classic => "classic",
            Generation::Hypertime => "hypertime",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Generation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "v1" | "1" => Ok(Generation::Classic),
            "hypertime" | "v2" | "2" => Ok(Generation::Hypertime),
            other => Err(format!("unknown generation '{}', expected classic or hypertime", other)),
        }
    }
}

/// `sin(t) · cos(t/2)` for `t` = seconds since the Unix epoch at `at`.
/// Times before the epoch count as `t = 0`.
pub fn hypertime_pulse(at: SystemTime) -> f64 {
    let t = at.duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0);
    t.sin() * (t / 2.0).cos()
}

/// Maps a percentage onto [0, 1]. Non-finite input counts as 0.
fn normalize_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, PERCENT_MAX) / PERCENT_MAX
    } else {
        0.0
    }
}

fn normalize_pulse(value: f64) -> f64 {
    if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 }
}

/// A probability distribution over the joint outcomes of the signal circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalVector {
    generation: Generation,
    values: Vec<f64>,
}

impl SignalVector {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Probabilities indexed by outcome; wire 0 is the most significant bit.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The most likely joint outcome and its probability.
    /// Ties resolve to the lowest index.
    pub fn dominant_outcome(&self) -> Option<(usize, f64)> {
        self.values
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (k, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((k, p)),
            })
    }
}

impl fmt::Display for SignalVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, p) in self.values.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, p)?;
        }
        write!(f, "]")
    }
}

/// Builds and evaluates the fixed signal circuit for one generation.
#[derive(Default)]
pub struct SignalTransform {
    generation: Generation,
    simulator: Simulator,
}

impl SignalTransform {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            simulator: Simulator::new(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The fixed circuit for the given inputs.
    ///
    /// `pulse` is ignored by `Classic` and treated as 0 by `Hypertime` when absent.
    pub fn circuit(&self, cpu_percent: f64, ram_percent: f64, pulse: Option<f64>) -> Circuit {
        let c = normalize_percent(cpu_percent);
        let r = normalize_percent(ram_percent);
        let w: Vec<WireId> = (0..self.generation.wire_count() as u64).map(WireId).collect();

        match self.generation {
            Generation::Classic => CircuitBuilder::new()
                .rotate(w[0], PI * c)
                .rotate(w[1], PI * r)
                .controlled_flip(w[0], w[1])
                .rotate(w[2], PI * (c + 0.5))
                .controlled_flip(w[1], w[2])
                .rotate(w[3], PI * (r + 0.5))
                .controlled_flip(w[2], w[3])
                .rotate(w[4], PI * (c + r))
                .controlled_flip(w[3], w[4])
                .readout(w)
                .build(),
            Generation::Hypertime => {
                let p = normalize_pulse(pulse.unwrap_or(0.0));
                CircuitBuilder::new()
                    .rotate(w[0], PI * c)
                    .rotate(w[1], PI * r)
                    .controlled_flip(w[0], w[1])
                    .rotate(w[2], PI * p)
                    .controlled_flip(w[1], w[2])
                    .rotate(w[3], PI * (c + r) / 2.0)
                    .phase_shift(w[3], PI * p)
                    .controlled_flip(w[2], w[3])
                    .readout(w)
                    .build()
            }
        }
    }

    /// Evaluates the circuit and returns the normalized readout.
    ///
    /// The amplitude state is checked for unit norm before readout; a
    /// drifted state is an `Incoherence` error rather than a silently
    /// rescaled vector.
    ///
    /// Deterministic in `(cpu_percent, ram_percent, pulse)`: identical inputs
    /// give bit-identical vectors. Every returned vector has
    /// `generation.outcome_count()` non-negative entries summing to 1.
    pub fn compute(&self, cpu_percent: f64, ram_percent: f64, pulse: Option<f64>) -> Result<SignalVector, CircuitError> {
        let circuit = self.circuit(cpu_percent, ram_percent, pulse);
        let result = self.simulator.run(&circuit)?;
        if let Some(state) = result.final_state() {
            check_normalization(state, None)?;
        }

        let mut values: Vec<f64> = result.distribution().iter().map(|p| p.max(0.0)).collect();
        let total: f64 = values.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(CircuitError::Incoherence {
                message: format!("Signal readout has no usable mass: {}", total),
            });
        }
        for p in values.iter_mut() {
            *p /= total;
        }

        Ok(SignalVector {
            generation: self.generation,
            values,
        })
    }
}
