//! Numeric constants shared by the signal circuits.

/// Constants used when mapping telemetry onto rotation angles
pub mod qrisk_constants {
    /// Used for rotation angles (`RY(π·x)`)
    pub const PI: f64 = std::f64::consts::PI;
    /// Upper bound of a telemetry percentage.
    pub const PERCENT_MAX: f64 = 100.0;
    /// Tolerance for the unit-mass check on a readout distribution.
    pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;
}
