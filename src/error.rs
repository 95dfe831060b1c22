// src/error.rs

//! Crate-level error taxonomy for a scan.

use crate::completion::CompletionError;
use crate::config::ConfigError;
use crate::core::CircuitError;
use crate::report::ReportError;
use crate::secret::SecretError;
use thiserror::Error;

/// Why a scan did not produce a recorded report.
///
/// A failed completion is not an error at this level: the scan records the
/// prompt with no completion and still succeeds. `Completion` only appears
/// when the client could not be constructed at all.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("credential unavailable: {0}")]
    Credential(#[from] SecretError),

    #[error("signal transform failed: {0}")]
    Signal(#[from] CircuitError),

    #[error("completion client unavailable: {0}")]
    Completion(#[from] CompletionError),

    #[error("report store error: {0}")]
    Store(#[from] ReportError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("scan thread panicked")]
    Panicked,
}
