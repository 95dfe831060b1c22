// src/simulation/mod.rs

//! Evaluates a `Circuit` on a small state-vector engine and reads out the
//! joint outcome distribution.

mod results;
pub(crate) mod engine;

pub use results::SimulationResult;

use crate::circuits::Circuit;
use crate::core::{CircuitError, WireId};
use crate::operations::Operation;
use engine::SimulationEngine;

/// Runs circuits. Stateless; every run starts from `|0...0>`.
#[derive(Default)]
pub struct Simulator {}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a simulation of the provided circuit.
    ///
    /// Gates are applied in order. A `Readout` records the marginal
    /// distribution over its targets at that point. If the circuit never reads
    /// out, the full distribution over all wires (sorted by id) is recorded
    /// at the end, so the result always carries a distribution for a
    /// non-empty circuit.
    ///
    /// # Returns
    /// * `Ok(SimulationResult)` with the readout distribution.
    /// * `Err(CircuitError)` if an operation references an unknown wire or is malformed.
    pub fn run(&self, circuit: &Circuit) -> Result<SimulationResult, CircuitError> {
        if circuit.is_empty() {
            return Ok(SimulationResult::new());
        }

        let mut engine = SimulationEngine::init(circuit.wires())?;
        let mut result = SimulationResult::new();
        let mut read_out = false;

        for op in circuit.operations() {
            match op {
                Operation::Readout { targets } => {
                    let distribution = engine.readout(targets)?;
                    result.record_readout(targets.clone(), distribution);
                    read_out = true;
                }
                _ => engine.apply_operation(op)?,
            }
        }

        if !read_out {
            let mut all: Vec<WireId> = circuit.wires().iter().cloned().collect();
            all.sort();
            let distribution = engine.readout(&all)?;
            result.record_readout(all, distribution);
        }

        result.record_final_state(engine.get_state().clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::engine::SimulationEngine;
    use crate::circuits::CircuitBuilder;
    use crate::core::*;
    use num_complex::Complex;
    use num_traits::Zero;
    use std::collections::HashSet;
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    const TEST_TOLERANCE: f64 = 1e-9;

    fn wid(id: u64) -> WireId {
        WireId(id)
    }

    fn assert_vec_approx_equal(actual: &[f64], expected: &[f64], tolerance: f64, context: &str) {
        assert_eq!(actual.len(), expected.len(), "Vector length mismatch - {}", context);
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!(
                (a - e).abs() < tolerance,
                "Vector mismatch at index {} - Actual: {}, Expected: {}, Context: {}",
                i, a, e, context
            );
        }
    }

    #[test]
    fn test_rotation_by_pi_flips_wire() -> Result<(), CircuitError> {
        let circuit = CircuitBuilder::new().rotate(wid(0), PI).build();
        let result = Simulator::new().run(&circuit)?;
        assert_vec_approx_equal(result.distribution(), &[0.0, 1.0], TEST_TOLERANCE, "RY(pi)|0>");
        Ok(())
    }

    #[test]
    fn test_half_rotation_is_even_split() -> Result<(), CircuitError> {
        let circuit = CircuitBuilder::new().rotate(wid(0), PI / 2.0).build();
        let result = Simulator::new().run(&circuit)?;
        assert_vec_approx_equal(result.distribution(), &[0.5, 0.5], TEST_TOLERANCE, "RY(pi/2)|0>");
        Ok(())
    }

    #[test]
    fn test_controlled_flip_on_high_bits() -> Result<(), CircuitError> {
        // Four wires, flip wire 0, CNOT 0 -> 1: expect |1100> (index 12).
        let circuit = CircuitBuilder::new()
            .rotate(wid(0), PI)
            .controlled_flip(wid(0), wid(1))
            .readout(vec![wid(0), wid(1), wid(2), wid(3)])
            .build();
        let result = Simulator::new().run(&circuit)?;
        let mut expected = vec![0.0; 16];
        expected[12] = 1.0;
        assert_vec_approx_equal(result.distribution(), &expected, TEST_TOLERANCE, "CNOT(0->1) on |1000>");
        Ok(())
    }

    #[test]
    fn test_controlled_flip_with_spectator_between() -> Result<(), CircuitError> {
        // Three wires, flip wire 2 then CNOT 2 -> 0 across spectator wire 1: expect |101>.
        let circuit = CircuitBuilder::new()
            .rotate(wid(2), PI)
            .controlled_flip(wid(2), wid(0))
            .readout(vec![wid(0), wid(1), wid(2)])
            .build();
        let result = Simulator::new().run(&circuit)?;
        let mut expected = vec![0.0; 8];
        expected[0b101] = 1.0;
        assert_vec_approx_equal(result.distribution(), &expected, TEST_TOLERANCE, "CNOT(2->0) on |001>");
        Ok(())
    }

    #[test]
    fn test_controlled_flip_entangles_superposition() -> Result<(), CircuitError> {
        let circuit = CircuitBuilder::new()
            .rotate(wid(0), PI / 2.0)
            .controlled_flip(wid(0), wid(1))
            .build();
        let result = Simulator::new().run(&circuit)?;
        assert_vec_approx_equal(result.distribution(), &[0.5, 0.0, 0.0, 0.5], TEST_TOLERANCE, "Bell-like");
        Ok(())
    }

    #[test]
    fn test_phase_shift_leaves_readout_unchanged() -> Result<(), CircuitError> {
        let circuit = CircuitBuilder::new()
            .rotate(wid(0), PI / 3.0)
            .phase_shift(wid(0), 1.234)
            .build();
        let plain = CircuitBuilder::new().rotate(wid(0), PI / 3.0).build();
        let simulator = Simulator::new();
        assert_vec_approx_equal(
            simulator.run(&circuit)?.distribution(),
            simulator.run(&plain)?.distribution(),
            TEST_TOLERANCE,
            "phase is invisible to readout",
        );
        Ok(())
    }

    #[test]
    fn test_marginal_readout() -> Result<(), CircuitError> {
        let q0 = wid(0);
        let q1 = wid(1);
        let wires: HashSet<WireId> = [q0, q1].iter().cloned().collect();
        let mut engine = SimulationEngine::init(&wires)?;
        // 0.6|00> + 0.8|11>
        engine.set_state(AmplitudeState::new(vec![
            Complex::new(0.6, 0.0),
            Complex::zero(),
            Complex::zero(),
            Complex::new(0.8, 0.0),
        ]))?;

        assert_vec_approx_equal(&engine.readout(&[q1])?, &[0.36, 0.64], TEST_TOLERANCE, "marginal on q1");
        assert_vec_approx_equal(&engine.readout(&[q1, q0])?, &[0.36, 0.0, 0.0, 0.64], TEST_TOLERANCE, "reordered");
        Ok(())
    }

    #[test]
    fn test_probability_of_one() -> Result<(), CircuitError> {
        let circuit = CircuitBuilder::new()
            .rotate(wid(1), PI)
            .readout(vec![wid(0), wid(1)])
            .build();
        let result = Simulator::new().run(&circuit)?;
        let p = result.probability_of_one(&wid(1)).expect("wire 1 was read out");
        assert!((p - 1.0).abs() < TEST_TOLERANCE);
        assert_eq!(result.probability_of_one(&wid(7)), None);
        Ok(())
    }

    #[test]
    fn test_self_controlled_flip_rejected() {
        let circuit = CircuitBuilder::new().controlled_flip(wid(0), wid(0)).build();
        let err = Simulator::new().run(&circuit).unwrap_err();
        assert!(matches!(err, CircuitError::InvalidOperation { .. }));
    }

    #[test]
    fn test_unknown_wire_rejected() -> Result<(), CircuitError> {
        let wires: HashSet<WireId> = [wid(0)].iter().cloned().collect();
        let engine = SimulationEngine::init(&wires)?;
        assert!(matches!(engine.readout(&[wid(3)]), Err(CircuitError::ReferenceViolation { .. })));
        Ok(())
    }

    #[test]
    fn test_amplitudes_stay_real_after_rotation() -> Result<(), CircuitError> {
        let circuit = CircuitBuilder::new().rotate(wid(0), PI / 2.0).build();
        let result = Simulator::new().run(&circuit)?;
        let state = result.final_state().expect("final state recorded");
        assert!((state.vector()[0].re - FRAC_1_SQRT_2).abs() < TEST_TOLERANCE);
        assert!(state.vector().iter().all(|c| c.im.abs() < TEST_TOLERANCE));
        Ok(())
    }
}
