// src/scan/mod.rs

//! The scan pipeline and its background dispatch.
//!
//! A scan runs credential → telemetry → signal → prompt → completion →
//! report, announcing each step as a [`ScanEvent`] on an unbounded channel.
//! [`spawn_scan`] runs a scan on its own thread with a private
//! current-thread runtime; the caller drains events from the returned
//! [`ScanHandle`] in the order they were produced.

use crate::completion::{CompletionClient, FAILURE_PLACEHOLDER, HttpTransport, Transport};
use crate::config::AppConfig;
use crate::error::ScanError;
use crate::prompt::{Mode, PromptInputs, render};
use crate::report::ReportStore;
use crate::secret::{Credential, SecretError, SecretStore};
use crate::signal::{Generation, SignalTransform, SignalVector, hypertime_pulse};
use crate::telemetry::{SystemTelemetry, TelemetrySample, TelemetrySource};
use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::SystemTime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};

/// User input for one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub scope: String,
    pub risk_level: String,
    pub mode: Mode,
    /// Fixed pulse for reproducible scans; sampled from the clock when absent.
    pub pulse: Option<f64>,
}

impl ScanRequest {
    pub fn new(scope: impl Into<String>, risk_level: impl Into<String>, mode: Mode) -> Self {
        Self {
            scope: scope.into(),
            risk_level: risk_level.into(),
            mode,
            pulse: None,
        }
    }

    pub fn with_pulse(mut self, pulse: f64) -> Self {
        self.pulse = Some(pulse);
        self
    }
}

/// Progress of a scan, in production order.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Started { generation: Generation, mode: Mode },
    Telemetry(TelemetrySample),
    Signal(SignalVector),
    PromptReady(String),
    Completion(String),
    CompletionFailed(String),
    Recorded(i64),
    Aborted(String),
}

impl ScanEvent {
    /// Whether no further events follow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanEvent::Recorded(_) | ScanEvent::Aborted(_))
    }
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanEvent::Started { generation, mode } => {
                write!(f, "Starting {} scan ({} mode)...", generation, mode)
            }
            ScanEvent::Telemetry(sample) => write!(f, "{}", sample),
            ScanEvent::Signal(vector) => write!(f, "Signal: {}", vector),
            ScanEvent::PromptReady(_) => write!(f, "Prompt ready, requesting completion..."),
            ScanEvent::Completion(text) => write!(f, "{}", text),
            ScanEvent::CompletionFailed(reason) => write!(f, "{} ({})", FAILURE_PLACEHOLDER, reason),
            ScanEvent::Recorded(id) => write!(f, "Report #{} saved.", id),
            ScanEvent::Aborted(reason) => write!(f, "Scan aborted: {}", reason),
        }
    }
}

/// What a completed scan produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub report_id: i64,
    pub telemetry: TelemetrySample,
    pub pulse: Option<f64>,
    pub signal: SignalVector,
    pub prompt: String,
    /// `None` when the completion request failed.
    pub completion: Option<String>,
}

impl ScanOutcome {
    /// The completion, or the failure placeholder.
    pub fn display_text(&self) -> &str {
        self.completion.as_deref().unwrap_or(FAILURE_PLACEHOLDER)
    }
}

/// Runs scans against one configuration.
pub struct Scanner<S, T> {
    config: AppConfig,
    secrets: SecretStore,
    telemetry: S,
    client: CompletionClient<T>,
}

impl Scanner<SystemTelemetry, HttpTransport> {
    /// A scanner reading the host and talking to the configured endpoint.
    pub fn system(config: AppConfig) -> Result<Self, ScanError> {
        let transport = HttpTransport::from_config(&config.completion_config())?;
        Ok(Self::new(config, SystemTelemetry::new(), transport))
    }
}

impl<S, T> Scanner<S, T>
where
    S: TelemetrySource,
    T: Transport,
{
    pub fn new(config: AppConfig, telemetry: S, transport: T) -> Self {
        let secrets = config.secret_store();
        let client = CompletionClient::new(transport, config.completion_config());
        Self {
            config,
            secrets,
            telemetry,
            client,
        }
    }

    /// Run one scan, announcing progress on `events`.
    ///
    /// A missing or unverifiable credential aborts before telemetry is read
    /// and before any request is sent. A failed completion is not an error:
    /// the prompt is recorded with no completion. Every error path emits
    /// `Aborted` before returning.
    ///
    /// Telemetry sampling blocks the calling thread; [`spawn_scan`] runs
    /// [`Scanner::prepare`] outside its runtime for that reason.
    pub async fn run(&mut self, request: &ScanRequest, events: &UnboundedSender<ScanEvent>) -> Result<ScanOutcome, ScanError> {
        let prepared = self.prepare(request, events)?;
        self.finish(prepared, events).await
    }

    /// The synchronous half of a scan: credential, telemetry, signal, prompt.
    pub fn prepare(&mut self, request: &ScanRequest, events: &UnboundedSender<ScanEvent>) -> Result<PreparedScan, ScanError> {
        let generation = self.config.generation;
        emit(events, ScanEvent::Started { generation, mode: request.mode });
        info!(%generation, mode = %request.mode, "scan started");

        let credential = match self.secrets.load_credential() {
            Ok(credential) if !credential.is_empty() => credential,
            Ok(_) => return Err(abort(events, SecretError::Empty.into())),
            Err(e) => return Err(abort(events, e.into())),
        };

        let telemetry = self.telemetry.sample();
        if !telemetry.is_complete() {
            warn!(%telemetry, "telemetry unavailable, continuing with zeros");
        }
        emit(events, ScanEvent::Telemetry(telemetry));

        let pulse = if generation.uses_pulse() {
            Some(request.pulse.unwrap_or_else(|| hypertime_pulse(SystemTime::now())))
        } else {
            None
        };
        let signal = match SignalTransform::new(generation).compute(telemetry.cpu_or_zero(), telemetry.ram_or_zero(), pulse) {
            Ok(signal) => signal,
            Err(e) => return Err(abort(events, e.into())),
        };
        emit(events, ScanEvent::Signal(signal.clone()));

        let prompt = render(
            request.mode,
            &PromptInputs {
                scope: &request.scope,
                risk_level: &request.risk_level,
                cpu_percent: telemetry.cpu_or_zero(),
                ram_percent: telemetry.ram_or_zero(),
                pulse,
                signal: &signal,
            },
        );
        emit(events, ScanEvent::PromptReady(prompt.clone()));

        Ok(PreparedScan {
            credential,
            telemetry,
            pulse,
            signal,
            prompt,
        })
    }

    /// The network half of a scan: completion, then the report row.
    pub async fn finish(&self, prepared: PreparedScan, events: &UnboundedSender<ScanEvent>) -> Result<ScanOutcome, ScanError> {
        let PreparedScan {
            credential,
            telemetry,
            pulse,
            signal,
            prompt,
        } = prepared;

        let completion = match self.client.complete(&prompt, &credential).await {
            Ok(text) => {
                emit(events, ScanEvent::Completion(text.clone()));
                Some(text)
            }
            Err(e) => {
                warn!(error = %e, "completion failed, recording prompt only");
                emit(events, ScanEvent::CompletionFailed(e.to_string()));
                None
            }
        };

        let report_id = match ReportStore::open(&self.config.db_path).and_then(|store| store.append(&prompt, completion.as_deref())) {
            Ok(id) => id,
            Err(e) => return Err(abort(events, e.into())),
        };
        emit(events, ScanEvent::Recorded(report_id));
        info!(report_id, completed = completion.is_some(), "scan recorded");

        Ok(ScanOutcome {
            report_id,
            telemetry,
            pulse,
            signal,
            prompt,
            completion,
        })
    }
}

/// A scan whose prompt is rendered and whose credential is loaded, waiting
/// for the completion request.
#[derive(Debug)]
pub struct PreparedScan {
    credential: Credential,
    telemetry: TelemetrySample,
    pulse: Option<f64>,
    signal: SignalVector,
    prompt: String,
}

impl PreparedScan {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

fn emit(events: &UnboundedSender<ScanEvent>, event: ScanEvent) {
    // A dropped receiver only means nobody is watching.
    let _ = events.send(event);
}

fn abort(events: &UnboundedSender<ScanEvent>, err: ScanError) -> ScanError {
    error!(error = %err, "scan aborted");
    emit(events, ScanEvent::Aborted(err.to_string()));
    err
}

/// A scan running on its own thread.
pub struct ScanHandle {
    events: UnboundedReceiver<ScanEvent>,
    thread: JoinHandle<Result<ScanOutcome, ScanError>>,
}

impl ScanHandle {
    /// Next event, blocking until one arrives. `None` once the scan thread
    /// has finished and every event has been taken.
    ///
    /// Must not be called from inside an async runtime.
    pub fn next_event(&mut self) -> Option<ScanEvent> {
        self.events.blocking_recv()
    }

    /// Pass every event to `on_event` as it arrives, then return the result.
    pub fn drain<F>(mut self, mut on_event: F) -> Result<ScanOutcome, ScanError>
    where
        F: FnMut(ScanEvent),
    {
        while let Some(event) = self.next_event() {
            on_event(event);
        }
        self.join()
    }

    /// Wait for the scan thread. Events not yet taken are discarded.
    pub fn join(self) -> Result<ScanOutcome, ScanError> {
        self.thread.join().map_err(|_| ScanError::Panicked)?
    }
}

/// Run `request` on a dedicated background thread.
pub fn spawn_scan<S, T>(mut scanner: Scanner<S, T>, request: ScanRequest) -> ScanHandle
where
    S: TelemetrySource + 'static,
    T: Transport + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let thread = thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => return Err(abort(&tx, ScanError::Runtime(e.to_string()))),
        };
        let prepared = scanner.prepare(&request, &tx)?;
        runtime.block_on(scanner.finish(prepared, &tx))
    });

    ScanHandle { events: rx, thread }
}
