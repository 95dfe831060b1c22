// src/main.rs

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use qrisk::{
    AppConfig, Credential, Generation, Mode, ReportStore, ScanEvent, ScanRequest, Scanner, SignalTransform, spawn_scan,
};
use std::io::BufRead;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroize;

#[derive(Parser)]
#[command(name = "qrisk")]
#[command(about = "Telemetry-driven risk scanner")]
#[command(version)]
struct Cli {
    /// Log filter, e.g. `debug` or `qrisk=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt and store the API key
    SetKey {
        /// Read the key from standard input instead of prompting
        #[arg(long)]
        stdin: bool,
    },
    /// Run a scan and record the report
    Scan {
        /// What to scan
        #[arg(long)]
        scope: String,
        /// Sensitivity, conventionally 1-10
        #[arg(long)]
        risk_level: String,
        /// probe, fusion, meta, entropy, secure or legacy
        #[arg(long, default_value = "probe")]
        mode: String,
        /// classic or hypertime
        #[arg(long)]
        generation: Option<Generation>,
    },
    /// Show the newest stored reports
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the signal circuit and its readout for given inputs
    Circuit {
        #[arg(long)]
        generation: Option<Generation>,
        #[arg(long, default_value_t = 50.0)]
        cpu: f64,
        #[arg(long, default_value_t = 50.0)]
        ram: f64,
        #[arg(long, default_value_t = 0.0)]
        pulse: f64,
    },
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "qrisk=info".into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::SetKey { stdin } => {
            let mut key = if stdin {
                let mut line = String::new();
                std::io::stdin().lock().read_line(&mut line).context("Failed to read key from stdin")?;
                line
            } else {
                rpassword::prompt_password("API key: ").context("Failed to read key")?
            };
            let credential = Credential::new(key.trim());
            key.zeroize();
            if credential.is_empty() {
                bail!("API key is empty");
            }
            let store = config.secret_store();
            store.save_credential(&credential).context("Failed to store API key")?;
            println!("API key stored in {}", store.credential_path().display());
        }
        Commands::Scan {
            scope,
            risk_level,
            mode,
            generation,
        } => {
            if let Some(generation) = generation {
                config.generation = generation;
            }
            let parsed = Mode::parse_or_default(&mode);

            let scanner = Scanner::system(config).context("Failed to set up scanner")?;
            let handle = spawn_scan(scanner, ScanRequest::new(scope, risk_level, parsed));
            let outcome = handle.drain(|event| match &event {
                ScanEvent::Completion(_) => println!("\n{}\n", event),
                ScanEvent::Aborted(_) => eprintln!("{}", event),
                _ => println!("{}", event),
            });
            outcome.context("Scan failed")?;
        }
        Commands::History { limit } => {
            let store = ReportStore::open(&config.db_path).context("Failed to open report store")?;
            let records = store.recent(limit)?;
            if records.is_empty() {
                println!("No reports in {}", store.path().display());
            }
            for record in records {
                println!("=== Report #{} ===", record.id);
                println!("{}", record.prompt.trim_end());
                println!("--- Completion ---");
                println!("{}\n", record.completion.as_deref().unwrap_or("(none)"));
            }
        }
        Commands::Circuit {
            generation,
            cpu,
            ram,
            pulse,
        } => {
            let transform = SignalTransform::new(generation.unwrap_or(config.generation));
            let pulse = transform.generation().uses_pulse().then_some(pulse);
            println!("{}", transform.circuit(cpu, ram, pulse));
            let signal = transform.compute(cpu, ram, pulse)?;
            println!("Readout: {}", signal);
            if let Some((k, p)) = signal.dominant_outcome() {
                println!("Dominant: |{:0width$b}> p = {:.4}", k, p, width = transform.generation().wire_count());
            }
        }
    }

    Ok(())
}
