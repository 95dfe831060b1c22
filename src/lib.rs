// src/lib.rs

//! `qrisk` - A telemetry-driven risk scanner
//!
//! A scan samples CPU and memory utilization, maps them through a fixed
//! simulated circuit into a small probability vector, renders a prompt around
//! both, asks a remote completion endpoint for an assessment, and appends the
//! prompt and answer to a local report database. The bearer credential for
//! the endpoint is kept on disk under AES-256-GCM.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod signal;
pub mod secret;
pub mod telemetry;
pub mod prompt;
pub mod completion;
pub mod report;
pub mod config;
pub mod error;
pub mod scan;

// Re-export the most common types for easier top-level use
pub use core::{AmplitudeState, CircuitError, WireId};
pub use operations::Operation;
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{SimulationResult, Simulator};
pub use validation::{check_distribution, check_normalization};
pub use signal::{Generation, SignalTransform, SignalVector, hypertime_pulse};
pub use secret::{Credential, KeyMaterial, SecretError, SecretStore};
pub use telemetry::{StaticTelemetry, SystemTelemetry, TelemetrySample, TelemetrySource};
pub use prompt::{Mode, PromptInputs, render};
pub use completion::{CompletionClient, CompletionConfig, CompletionError, HttpTransport, Transport};
pub use report::{ReportError, ReportRecord, ReportStore};
pub use config::{AppConfig, ConfigError};
pub use error::ScanError;
pub use scan::{PreparedScan, ScanEvent, ScanHandle, ScanOutcome, ScanRequest, Scanner, spawn_scan};

// Example 1: The Signal Transform
// The classic generation evaluates a five-wire circuit; the readout is a
// distribution over all 32 joint outcomes.
/// ```
/// use qrisk::{Generation, SignalTransform, check_distribution};
///
/// let transform = SignalTransform::new(Generation::Classic);
/// println!("{}", transform.circuit(50.0, 50.0, None));
///
/// let first = transform.compute(50.0, 50.0, None).unwrap();
/// let second = transform.compute(50.0, 50.0, None).unwrap();
/// assert_eq!(first, second);
/// assert_eq!(first.len(), 32);
/// assert!(check_distribution(first.values(), None).is_ok());
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Storing a Credential
// The key is generated on first save; the blob on disk is nonce || ciphertext || tag.
/// ```
/// use qrisk::{Credential, SecretStore};
///
/// let dir = std::env::temp_dir().join(format!("qrisk-doc-{}", std::process::id()));
/// let store = SecretStore::in_dir(&dir);
/// store.save_credential(&Credential::new("sk-test")).unwrap();
/// assert_eq!(store.load_credential().unwrap().expose(), "sk-test");
/// std::fs::remove_dir_all(&dir).unwrap();
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
