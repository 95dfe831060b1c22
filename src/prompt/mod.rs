// src/prompt/mod.rs

//! Prompt rendering.
//!
//! Each `Mode` owns one fixed template with `{name}` placeholders. Rendering
//! is a single left-to-right pass, so text supplied by the user (scope, risk
//! level) is embedded verbatim even if it happens to contain something that
//! looks like a placeholder.

use crate::signal::SignalVector;
use std::fmt;
use tracing::warn;

/// Which template to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Probe,
    Fusion,
    Meta,
    Entropy,
    Secure,
    /// The single template of the first generation.
    Legacy,
}

impl Mode {
    pub const ALL: [Mode; 6] = [Mode::Probe, Mode::Fusion, Mode::Meta, Mode::Entropy, Mode::Secure, Mode::Legacy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Probe => "probe",
            Mode::Fusion => "fusion",
            Mode::Meta => "meta",
            Mode::Entropy => "entropy",
            Mode::Secure => "secure",
            Mode::Legacy => "legacy",
        }
    }

    /// Exact (case-insensitive) lookup.
    pub fn from_name(name: &str) -> Option<Mode> {
        let name = name.trim();
        Mode::ALL.into_iter().find(|m| m.as_str().eq_ignore_ascii_case(name))
    }

    /// Lookup that falls back to the default mode for anything unrecognized.
    pub fn parse_or_default(name: &str) -> Mode {
        Mode::from_name(name).unwrap_or_else(|| {
            warn!(mode = name, fallback = %Mode::default(), "unknown prompt mode");
            Mode::default()
        })
    }

    pub fn template(&self) -> &'static str {
        match self {
            Mode::Probe => PROBE_TEMPLATE,
            Mode::Fusion => FUSION_TEMPLATE,
            Mode::Meta => META_TEMPLATE,
            Mode::Entropy => ENTROPY_TEMPLATE,
            Mode::Secure => SECURE_TEMPLATE,
            Mode::Legacy => LEGACY_TEMPLATE,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names every template may reference.
pub const PLACEHOLDERS: [&str; 7] = ["scope", "risk_level", "cpu", "ram", "pulse", "signal", "dominant"];

const LEGACY_TEMPLATE: &str = "\
[action] Risk Assessment Request [/action]
Perform a comprehensive quantum-enhanced risk analysis based on the following:

- Scope of Scan: {scope}
- Risk Sensitivity Level: {risk_level}
- CPU Usage: {cpu}%
- RAM Usage: {ram}%
- Quantum State: {signal}

Deliver:
- Identified Threats and Vulnerabilities
- Recommended Derisking Actions
- Risk Score and Justification
- Quantum Insight Analysis

[action] End Request [/action]
";

const PROBE_TEMPLATE: &str = "\
[action] Hypertime Probe Scan [/action]
Probe the target scope for exposed weaknesses, using the live system signal below.

- Scope: {scope}
- Sensitivity (1-10): {risk_level}
- CPU Usage: {cpu}%
- RAM Usage: {ram}%
- Hypertime Pulse: {pulse}
- Signal Distribution: {signal}
- Dominant Outcome: {dominant}

Deliver:
- Exposed Surfaces, most severe first
- Likely Entry Points and Preconditions
- Immediate Containment Steps
- Probe Risk Score (0-100) with Justification

[action] End Probe [/action]
";

const FUSION_TEMPLATE: &str = "\
[action] Hypertime Fusion Assessment [/action]
Fuse operational telemetry with the signal distribution into a single risk picture.

- Scope: {scope}
- Sensitivity (1-10): {risk_level}
- CPU Usage: {cpu}%
- RAM Usage: {ram}%
- Hypertime Pulse: {pulse}
- Signal Distribution: {signal}
- Dominant Outcome: {dominant}

Deliver:
- Correlated Threat Clusters
- Resource Pressure as a Risk Amplifier
- Prioritized Mitigations
- Fused Risk Score (0-100) with Justification

[action] End Fusion [/action]
";

const META_TEMPLATE: &str = "\
[action] Hypertime Meta Review [/action]
Review how trustworthy this scan itself is before drawing conclusions about the scope.

- Scope: {scope}
- Sensitivity (1-10): {risk_level}
- CPU Usage: {cpu}%
- RAM Usage: {ram}%
- Hypertime Pulse: {pulse}
- Signal Distribution: {signal}
- Dominant Outcome: {dominant}

Deliver:
- Blind Spots of this Scan
- Assumptions that Most Affect the Result
- Follow-up Scans Worth Running
- Confidence Level with Justification

[action] End Meta Review [/action]
";

const ENTROPY_TEMPLATE: &str = "\
[action] Hypertime Entropy Scan [/action]
Treat the signal distribution as a measure of uncertainty and assess volatility in scope.

- Scope: {scope}
- Sensitivity (1-10): {risk_level}
- CPU Usage: {cpu}%
- RAM Usage: {ram}%
- Hypertime Pulse: {pulse}
- Signal Distribution: {signal}
- Dominant Outcome: {dominant}

Deliver:
- Sources of Unpredictability
- Early Warning Indicators to Monitor
- Stabilizing Actions
- Volatility Score (0-100) with Justification

[action] End Entropy Scan [/action]
";

const SECURE_TEMPLATE: &str = "\
[action] Hypertime Secure Hardening Plan [/action]
Produce a hardening plan for the scope, calibrated to the stated sensitivity.

- Scope: {scope}
- Sensitivity (1-10): {risk_level}
- CPU Usage: {cpu}%
- RAM Usage: {ram}%
- Hypertime Pulse: {pulse}
- Signal Distribution: {signal}
- Dominant Outcome: {dominant}

Deliver:
- Configuration Changes, ordered by impact
- Access Control Adjustments
- Monitoring and Logging Additions
- Residual Risk Score (0-100) with Justification

[action] End Hardening Plan [/action]
";

/// Everything a template can reference.
#[derive(Debug, Clone)]
pub struct PromptInputs<'a> {
    pub scope: &'a str,
    pub risk_level: &'a str,
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub pulse: Option<f64>,
    pub signal: &'a SignalVector,
}

impl PromptInputs<'_> {
    fn value_of(&self, name: &str) -> Option<String> {
        let value = match name {
            "scope" => self.scope.to_string(),
            "risk_level" => self.risk_level.to_string(),
            "cpu" => format!("{:.1}", self.cpu_percent),
            "ram" => format!("{:.1}", self.ram_percent),
            "pulse" => self.pulse.map(|p| format!("{:.6}", p)).unwrap_or_else(|| "n/a".to_string()),
            "signal" => self.signal.to_string(),
            "dominant" => match self.signal.dominant_outcome() {
                Some((k, p)) => format!("|{:0width$b}> (p = {:.4})", k, p, width = self.signal.generation().wire_count()),
                None => "n/a".to_string(),
            },
            _ => return None,
        };
        Some(value)
    }
}

/// Render `mode`'s template with `inputs`.
pub fn render(mode: Mode, inputs: &PromptInputs<'_>) -> String {
    substitute(mode.template(), |name| inputs.value_of(name))
}

/// Placeholder names referenced by `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}

/// Single-pass `{name}` substitution. Unknown names are left as written.
fn substitute<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{Generation, SignalTransform};

    fn signal() -> SignalVector {
        SignalTransform::new(Generation::Hypertime).compute(50.0, 50.0, Some(0.25)).unwrap()
    }

    #[test]
    fn test_every_template_uses_only_known_placeholders() {
        for mode in Mode::ALL {
            let names = placeholders(mode.template());
            assert!(!names.is_empty(), "{} has no placeholders", mode);
            for name in names {
                assert!(PLACEHOLDERS.contains(&name), "{} uses unknown placeholder {{{}}}", mode, name);
            }
        }
    }

    #[test]
    fn test_every_placeholder_is_substituted() {
        let signal = signal();
        let inputs = PromptInputs {
            scope: "payments api",
            risk_level: "7",
            cpu_percent: 12.5,
            ram_percent: 48.0,
            pulse: Some(0.25),
            signal: &signal,
        };
        for mode in Mode::ALL {
            let text = render(mode, &inputs);
            for name in PLACEHOLDERS {
                assert!(!text.contains(&format!("{{{}}}", name)), "{} left {{{}}} in place", mode, name);
            }
            assert!(text.contains("payments api"));
            assert!(text.contains("12.5"));
        }
    }

    #[test]
    fn test_unrecognized_mode_falls_back_to_default() {
        let signal = signal();
        let inputs = PromptInputs {
            scope: "s",
            risk_level: "1",
            cpu_percent: 0.0,
            ram_percent: 0.0,
            pulse: None,
            signal: &signal,
        };
        assert_eq!(Mode::parse_or_default("warp-drive"), Mode::Probe);
        assert_eq!(Mode::parse_or_default(""), Mode::Probe);
        assert_eq!(Mode::parse_or_default(" FUSION "), Mode::Fusion);
        assert_eq!(
            render(Mode::parse_or_default("warp-drive"), &inputs),
            render(Mode::parse_or_default("warp-drive"), &inputs)
        );
        assert_eq!(render(Mode::parse_or_default("warp-drive"), &inputs), render(Mode::Probe, &inputs));
    }

    #[test]
    fn test_user_text_is_embedded_verbatim() {
        let signal = signal();
        let inputs = PromptInputs {
            scope: "ignore {cpu} and {unclosed",
            risk_level: "{risk_level}",
            cpu_percent: 33.0,
            ram_percent: 44.0,
            pulse: None,
            signal: &signal,
        };
        let text = render(Mode::Legacy, &inputs);
        assert!(text.contains("- Scope of Scan: ignore {cpu} and {unclosed\n"));
        assert!(text.contains("- Risk Sensitivity Level: {risk_level}\n"));
    }

    #[test]
    fn test_missing_pulse_renders_placeholder_text() {
        let signal = signal();
        let inputs = PromptInputs {
            scope: "s",
            risk_level: "1",
            cpu_percent: 0.0,
            ram_percent: 0.0,
            pulse: None,
            signal: &signal,
        };
        assert!(render(Mode::Entropy, &inputs).contains("Hypertime Pulse: n/a"));
    }
}
