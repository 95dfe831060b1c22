// src/telemetry/mod.rs

//! Point-in-time CPU and memory utilization.
//!
//! Sampling never fails loudly: a platform sysinfo cannot read, or a value
//! that comes back non-finite, yields an absent reading. Consumers use
//! `cpu_or_zero` / `ram_or_zero` so a degraded sample still flows through
//! the pipeline.

use std::fmt;
use sysinfo::System;
use tracing::{debug, warn};

/// CPU and RAM utilization in percent, each in [0, 100] when present.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySample {
    pub cpu_percent: Option<f64>,
    pub ram_percent: Option<f64>,
}

impl TelemetrySample {
    pub fn new(cpu_percent: f64, ram_percent: f64) -> Self {
        Self {
            cpu_percent: sanitize(cpu_percent),
            ram_percent: sanitize(ram_percent),
        }
    }

    /// The sentinel returned when measurement failed.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.cpu_percent.is_some() && self.ram_percent.is_some()
    }

    pub fn cpu_or_zero(&self) -> f64 {
        self.cpu_percent.unwrap_or(0.0)
    }

    pub fn ram_or_zero(&self) -> f64 {
        self.ram_percent.unwrap_or(0.0)
    }
}

impl fmt::Display for TelemetrySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part(v: Option<f64>) -> String {
            v.map(|p| format!("{:.1}%", p)).unwrap_or_else(|| "unavailable".to_string())
        }
        write!(f, "CPU usage: {}, RAM usage: {}", part(self.cpu_percent), part(self.ram_percent))
    }
}

fn sanitize(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 100.0))
}

/// Anything that can produce a telemetry sample.
pub trait TelemetrySource: Send {
    fn sample(&mut self) -> TelemetrySample;
}

/// Reads the host through `sysinfo`.
pub struct SystemTelemetry {
    system: System,
}

impl SystemTelemetry {
    pub fn new() -> Self {
        Self { system: System::new() }
    }
}

impl Default for SystemTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for SystemTelemetry {
    fn sample(&mut self) -> TelemetrySample {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            warn!("telemetry is not supported on this platform");
            return TelemetrySample::unavailable();
        }

        // CPU usage is a delta between two refreshes.
        self.system.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.system.refresh_cpu_usage();
        let cpu = self.system.global_cpu_usage() as f64;

        self.system.refresh_memory();
        let total = self.system.total_memory();
        let ram = if total == 0 {
            f64::NAN
        } else {
            self.system.used_memory() as f64 / total as f64 * 100.0
        };

        let sample = TelemetrySample::new(cpu, ram);
        if !sample.is_complete() {
            warn!(?sample, "telemetry sample is incomplete");
        }
        debug!(?sample, "sampled telemetry");
        sample
    }
}

/// A source that always returns the same reading.
#[derive(Debug, Clone, Copy)]
pub struct StaticTelemetry(pub TelemetrySample);

impl TelemetrySource for StaticTelemetry {
    fn sample(&mut self) -> TelemetrySample {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_clamps_and_drops_non_finite() {
        let s = TelemetrySample::new(120.0, f64::NAN);
        assert_eq!(s.cpu_percent, Some(100.0));
        assert_eq!(s.ram_percent, None);
        assert!(!s.is_complete());
        assert_eq!(s.ram_or_zero(), 0.0);
    }

    #[test]
    fn test_unavailable_degrades_to_zero() {
        let s = TelemetrySample::unavailable();
        assert_eq!((s.cpu_or_zero(), s.ram_or_zero()), (0.0, 0.0));
        assert_eq!(s.to_string(), "CPU usage: unavailable, RAM usage: unavailable");
    }

    #[test]
    fn test_system_sample_in_range() {
        let s = SystemTelemetry::new().sample();
        for v in [s.cpu_percent, s.ram_percent].into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
