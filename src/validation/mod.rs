// src/validation/mod.rs

//! Normalization checks for amplitude states and readout distributions.

use crate::core::{AmplitudeState, CircuitError, DISTRIBUTION_TOLERANCE};

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Checks that the squared amplitudes of `state` sum to 1.
///
/// # Returns
/// * `Ok(())` if normalized within `tolerance` (default `1e-9`).
/// * `Err(CircuitError::Incoherence)` otherwise.
pub fn check_normalization(state: &AmplitudeState, tolerance: Option<f64>) -> Result<(), CircuitError> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = state.vector().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(CircuitError::Incoherence {
            message: format!(
                "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Checks that `distribution` is a probability distribution: every entry
/// finite and non-negative, total mass 1 within `tolerance` (default `1e-6`).
pub fn check_distribution(distribution: &[f64], tolerance: Option<f64>) -> Result<(), CircuitError> {
    let effective_tolerance = tolerance.unwrap_or(DISTRIBUTION_TOLERANCE);
    if distribution.is_empty() {
        return Err(CircuitError::Incoherence {
            message: "Distribution is empty".to_string(),
        });
    }
    if let Some((k, p)) = distribution.iter().enumerate().find(|(_, p)| !p.is_finite() || **p < 0.0) {
        return Err(CircuitError::Incoherence {
            message: format!("Distribution entry {} is not a probability: {}", k, p),
        });
    }
    let total: f64 = distribution.iter().sum();
    if (total - 1.0).abs() > effective_tolerance {
        return Err(CircuitError::Incoherence {
            message: format!("Distribution mass is {} (Deviation > {})", total, effective_tolerance),
        });
    }
    Ok(())
}
