// src/simulation/engine.rs
use crate::core::{AmplitudeState, CircuitError, WireId};
use crate::operations::Operation;
use num_complex::Complex;
use num_traits::Zero;
use std::collections::{HashMap, HashSet};

/// State-vector evaluator for a small, fixed set of wires.
/// (Internal visibility)
pub(crate) struct SimulationEngine {
    /// Maps wire IDs to their index (0..N-1); index 0 is the most significant bit.
    wire_indices: HashMap<WireId, usize>,
    /// Joint amplitude state of all wires, dimension 2^N.
    global_state: AmplitudeState,
    /// Number of wires being simulated (N).
    num_wires: usize,
}

impl SimulationEngine {
    /// Initializes the engine with every wire in `|0>`.
    pub(crate) fn init(wire_ids: &HashSet<WireId>) -> Result<Self, CircuitError> {
        if wire_ids.is_empty() {
            return Err(CircuitError::InvalidOperation {
                message: "Cannot initialize simulation engine with zero wires".to_string(),
            });
        }

        let num_wires = wire_ids.len();
        let dim = 1usize.checked_shl(num_wires as u32).ok_or_else(|| CircuitError::SimulationError {
            message: "Number of wires too large, resulting state vector dimension overflows usize.".to_string(),
        })?;

        // Sort IDs so index assignment does not depend on HashSet iteration order.
        let mut sorted_ids: Vec<WireId> = wire_ids.iter().cloned().collect();
        sorted_ids.sort();
        let wire_indices = sorted_ids.into_iter().enumerate().map(|(index, id)| (id, index)).collect();

        let mut initial_vec = vec![Complex::zero(); dim];
        initial_vec[0] = Complex::new(1.0, 0.0);

        Ok(Self {
            wire_indices,
            global_state: AmplitudeState::new(initial_vec),
            num_wires,
        })
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: AmplitudeState) -> Result<(), CircuitError> {
        if state.dim() != self.global_state.dim() {
            Err(CircuitError::SimulationError {
                message: format!(
                    "Cannot set state: provided dimension {} does not match engine dimension {}",
                    state.dim(),
                    self.global_state.dim()
                ),
            })
        } else {
            self.global_state = state;
            Ok(())
        }
    }

    pub(crate) fn get_state(&self) -> &AmplitudeState {
        &self.global_state
    }

    /// Applies a single gate to the global state.
    pub(crate) fn apply_operation(&mut self, op: &Operation) -> Result<(), CircuitError> {
        match op {
            Operation::Rotate { target, theta } => {
                let target_idx = *self.get_wire_index(target)?;
                self.apply_single_wire_gate(target_idx, &rotation_matrix(*theta))?;
            }
            Operation::PhaseShift { target, theta } => {
                let target_idx = *self.get_wire_index(target)?;
                self.apply_single_wire_gate(target_idx, &phase_shift_matrix(*theta))?;
            }
            Operation::ControlledFlip { control, target } => {
                let control_idx = *self.get_wire_index(control)?;
                let target_idx = *self.get_wire_index(target)?;

                if control_idx == target_idx {
                    return Err(CircuitError::InvalidOperation {
                        message: "Control and target wires cannot be the same for controlled operation".to_string(),
                    });
                }

                // Basis order |control, target>: |00>, |01>, |10>, |11>
                let one = Complex::new(1.0, 0.0);
                let zero = Complex::zero();
                let cnot: [[Complex<f64>; 4]; 4] = [
                    [one, zero, zero, zero],
                    [zero, one, zero, zero],
                    [zero, zero, zero, one],
                    [zero, zero, one, zero],
                ];
                self.apply_two_wire_gate(control_idx, target_idx, &cnot)?;
            }
            Operation::Readout { .. } => {
                return Err(CircuitError::InvalidOperation {
                    message: "Readout operation should not be passed directly to apply_operation".to_string(),
                });
            }
        };
        Ok(())
    }

    /// Marginal outcome distribution over `targets`.
    ///
    /// Entry `j` of the result is the probability that the targets, read most
    /// significant first, spell out the binary expansion of `j`. The state is
    /// left untouched.
    pub(crate) fn readout(&self, targets: &[WireId]) -> Result<Vec<f64>, CircuitError> {
        if targets.is_empty() {
            return Err(CircuitError::InvalidOperation {
                message: "Readout requires at least one target wire".to_string(),
            });
        }
        let bit_positions = targets
            .iter()
            .map(|t| self.get_wire_index(t).map(|idx| self.num_wires - 1 - *idx))
            .collect::<Result<Vec<usize>, CircuitError>>()?;

        let out_dim = 1usize << bit_positions.len();
        let mut distribution = vec![0.0; out_dim];
        for (k, p) in self.global_state.probabilities().into_iter().enumerate() {
            let outcome = bit_positions.iter().fold(0usize, |acc, pos| (acc << 1) | ((k >> pos) & 1));
            distribution[outcome] += p;
        }
        Ok(distribution)
    }

    fn get_wire_index(&self, wire: &WireId) -> Result<&usize, CircuitError> {
        self.wire_indices.get(wire).ok_or_else(|| CircuitError::ReferenceViolation {
            message: format!("{} not found in simulation context", wire),
        })
    }

    /// Applies a 2x2 matrix to one wire of the global state vector.
    fn apply_single_wire_gate(&mut self, target_idx: usize, matrix: &[[Complex<f64>; 2]; 2]) -> Result<(), CircuitError> {
        let k = self.num_wires - 1 - target_idx; // bit position from the right
        let k_mask = 1 << k;
        let lower_mask = k_mask - 1;
        let upper_mask = !((k_mask << 1) - 1);

        let dim = self.global_state.dim();
        let mut new_vec = vec![Complex::zero(); dim];

        // Walk pairs of basis states that differ only at the target bit.
        for i in 0..dim / 2 {
            let i0 = ((i << 1) & upper_mask) | (i & lower_mask);
            let i1 = i0 | k_mask;

            if i1 >= dim {
                return Err(CircuitError::SimulationError {
                    message: format!("Calculated index out of bounds during single wire gate application. i0={}, i1={}, dim={}", i0, i1, dim),
                });
            }

            let psi_0 = self.global_state.vector()[i0];
            let psi_1 = self.global_state.vector()[i1];

            new_vec[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            new_vec[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }

        self.global_state = AmplitudeState::new(new_vec);
        Ok(())
    }

    /// Applies a 4x4 matrix to two wires of the global state vector.
    /// Rows and columns of `matrix` follow the basis `|b1 b2>` where `b1`
    /// belongs to `idx1` and `b2` to `idx2`.
    fn apply_two_wire_gate(
        &mut self,
        idx1: usize,
        idx2: usize,
        matrix: &[[Complex<f64>; 4]; 4],
    ) -> Result<(), CircuitError> {
        if idx1 == idx2 {
            return Err(CircuitError::InvalidOperation {
                message: "Target indices for a two-wire gate cannot be the same".to_string(),
            });
        }

        let n = self.num_wires;
        let dim = self.global_state.dim();
        let mut new_vec = vec![Complex::zero(); dim];

        let k1_raw = n - 1 - idx1;
        let k2_raw = n - 1 - idx2;
        // hi > lo, used only to spread the spectator bits around both positions
        let (hi, lo) = (k1_raw.max(k2_raw), k1_raw.min(k2_raw));
        let lower_mask = (1usize << lo) - 1;
        let middle_width = hi - lo - 1;
        let middle_mask = (1usize << middle_width) - 1;

        for i_other in 0..(dim / 4) {
            let i_lower = i_other & lower_mask;
            let i_middle = ((i_other >> lo) & middle_mask) << (lo + 1);
            let i_upper = (i_other >> (lo + middle_width)) << (hi + 1);
            let i_base = i_upper | i_middle | i_lower;

            let indices = [
                i_base,
                i_base | (1 << k2_raw),
                i_base | (1 << k1_raw),
                i_base | (1 << k1_raw) | (1 << k2_raw),
            ];

            let mut psi = [Complex::zero(); 4];
            for (j, index) in indices.iter().enumerate() {
                if *index >= dim {
                    return Err(CircuitError::SimulationError {
                        message: format!("Calculated index out of bounds during two wire gate application. Index={}, dim={}", index, dim),
                    });
                }
                psi[j] = self.global_state.vector()[*index];
            }

            for (row, index) in indices.iter().enumerate() {
                let mut acc = Complex::zero();
                for (col, amp) in psi.iter().enumerate() {
                    acc += matrix[row][col] * *amp;
                }
                new_vec[*index] = acc;
            }
        }

        self.global_state = AmplitudeState::new(new_vec);
        Ok(())
    }
}

/// `RY(θ)`: real rotation, `[[cos(θ/2), -sin(θ/2)], [sin(θ/2), cos(θ/2)]]`.
fn rotation_matrix(theta: f64) -> [[Complex<f64>; 2]; 2] {
    let half = theta / 2.0;
    let (sin_a, cos_a) = half.sin_cos();
    [
        [Complex::new(cos_a, 0.0), Complex::new(-sin_a, 0.0)],
        [Complex::new(sin_a, 0.0), Complex::new(cos_a, 0.0)],
    ]
}

/// Phase factor `e^(iθ)` applied to the `|1>` component.
fn phase_shift_matrix(theta: f64) -> [[Complex<f64>; 2]; 2] {
    [
        [Complex::new(1.0, 0.0), Complex::zero()],
        [Complex::zero(), Complex::new(theta.cos(), theta.sin())],
    ]
}
