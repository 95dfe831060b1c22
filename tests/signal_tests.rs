// tests/signal_tests.rs

use qrisk::{CircuitError, Generation, SignalTransform, SignalVector, check_distribution, hypertime_pulse};
use std::f64::consts::PI;
use std::time::{Duration, UNIX_EPOCH};

// The signal circuits rotate every wire once from |0> and then XOR it with
// its predecessor, so outcome `o` has probability prod_i p_i(o_i ^ o_{i-1}),
// with o_{-1} = 0, p(0) = cos^2(theta/2) and p(1) = sin^2(theta/2).
fn chained_rotation_distribution(thetas: &[f64]) -> Vec<f64> {
    let n = thetas.len();
    (0..1usize << n)
        .map(|outcome| {
            let bit = |i: usize| (outcome >> (n - 1 - i)) & 1;
            thetas
                .iter()
                .enumerate()
                .map(|(i, theta)| {
                    let previous = if i == 0 { 0 } else { bit(i - 1) };
                    let half = theta / 2.0;
                    if bit(i) ^ previous == 0 { half.cos().powi(2) } else { half.sin().powi(2) }
                })
                .product()
        })
        .collect()
}

fn assert_close(actual: &SignalVector, expected: &[f64], context: &str) {
    assert_eq!(actual.len(), expected.len(), "length mismatch - {}", context);
    for (k, (a, e)) in actual.values().iter().zip(expected).enumerate() {
        assert!((a - e).abs() < 1e-9, "outcome {} - actual {}, expected {} - {}", k, a, e, context);
    }
}

#[test]
fn test_repeated_compute_is_bit_identical() -> Result<(), CircuitError> {
    for generation in [Generation::Classic, Generation::Hypertime] {
        let transform = SignalTransform::new(generation);
        let first = transform.compute(50.0, 50.0, Some(0.0))?;
        let second = transform.compute(50.0, 50.0, Some(0.0))?;

        assert_eq!(first, second);
        assert_eq!(first.len(), generation.outcome_count());
        let total: f64 = first.values().iter().sum();
        assert!((total - 1.0).abs() < 1e-6, "{} total {}", generation, total);
    }
    assert_eq!(SignalTransform::new(Generation::Classic).compute(50.0, 50.0, None)?.len(), 32);
    assert_eq!(SignalTransform::new(Generation::Hypertime).compute(50.0, 50.0, None)?.len(), 16);
    Ok(())
}

#[test]
fn test_total_over_percentage_grid() -> Result<(), CircuitError> {
    let classic = SignalTransform::new(Generation::Classic);
    let hypertime = SignalTransform::new(Generation::Hypertime);
    let grid: Vec<f64> = (0..=20).map(|i| i as f64 * 5.0).chain([0.1, 33.3, 99.99]).collect();

    for &cpu in &grid {
        for &ram in &grid {
            check_distribution(classic.compute(cpu, ram, None)?.values(), None)?;
            for pulse in [-1.0, -0.3, 0.0, 0.6, 1.0] {
                check_distribution(hypertime.compute(cpu, ram, Some(pulse))?.values(), None)?;
            }
        }
    }
    Ok(())
}

#[test]
fn test_classic_matches_closed_form() -> Result<(), CircuitError> {
    let transform = SignalTransform::new(Generation::Classic);
    for (cpu, ram) in [(0.0, 0.0), (50.0, 50.0), (12.5, 87.5), (100.0, 3.0), (71.0, 44.0)] {
        let (c, r) = (cpu / 100.0, ram / 100.0);
        let expected = chained_rotation_distribution(&[PI * c, PI * r, PI * (c + 0.5), PI * (r + 0.5), PI * (c + r)]);
        assert_close(&transform.compute(cpu, ram, None)?, &expected, &format!("classic cpu={} ram={}", cpu, ram));
    }
    Ok(())
}

#[test]
fn test_hypertime_matches_closed_form() -> Result<(), CircuitError> {
    let transform = SignalTransform::new(Generation::Hypertime);
    for (cpu, ram, pulse) in [(0.0, 0.0, 0.0), (50.0, 50.0, 0.5), (20.0, 90.0, -0.75), (100.0, 100.0, 1.0)] {
        let (c, r) = (cpu / 100.0, ram / 100.0);
        // The phase on wire 3 does not change any outcome probability.
        let expected = chained_rotation_distribution(&[PI * c, PI * r, PI * pulse, PI * (c + r) / 2.0]);
        assert_close(
            &transform.compute(cpu, ram, Some(pulse))?,
            &expected,
            &format!("hypertime cpu={} ram={} pulse={}", cpu, ram, pulse),
        );
    }
    Ok(())
}

#[test]
fn test_pulse_changes_hypertime_signal() -> Result<(), CircuitError> {
    let transform = SignalTransform::new(Generation::Hypertime);
    let calm = transform.compute(40.0, 40.0, Some(0.0))?;
    let pulsed = transform.compute(40.0, 40.0, Some(0.5))?;
    assert_ne!(calm, pulsed);
    Ok(())
}

#[test]
fn test_absent_pulse_equals_zero_pulse() -> Result<(), CircuitError> {
    let transform = SignalTransform::new(Generation::Hypertime);
    assert_eq!(transform.compute(10.0, 20.0, None)?, transform.compute(10.0, 20.0, Some(0.0))?);
    Ok(())
}

#[test]
fn test_sampled_pulse_feeds_compute() -> Result<(), CircuitError> {
    let at = UNIX_EPOCH + Duration::from_secs(1_760_000_000);
    let pulse = hypertime_pulse(at);
    let t = 1_760_000_000f64;
    assert!((pulse - t.sin() * (t / 2.0).cos()).abs() < 1e-12);

    let transform = SignalTransform::new(Generation::Hypertime);
    check_distribution(transform.compute(25.0, 75.0, Some(pulse))?.values(), None)?;
    Ok(())
}

#[test]
fn test_circuit_shape_per_generation() {
    let classic = SignalTransform::new(Generation::Classic).circuit(50.0, 50.0, None);
    assert_eq!(classic.wires().len(), 5);
    assert_eq!(classic.len(), 10);

    let hypertime = SignalTransform::new(Generation::Hypertime).circuit(50.0, 50.0, Some(0.1));
    assert_eq!(hypertime.wires().len(), 4);
    assert_eq!(hypertime.len(), 9);
}
