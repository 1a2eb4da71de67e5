//! Probe inputs and the structured probe outcome.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of echo probes per check.
pub const DEFAULT_COUNT: u32 = 3;

/// Default per-reply wait (5 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default grace margin beyond the nominal timeout (2 seconds).
///
/// Covers teardown latency of the underlying check before the run is
/// forcibly treated as timed out.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(2);

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_grace() -> Duration {
    DEFAULT_GRACE
}

/// Errors produced when constructing a [`ProbeTarget`].
#[derive(Debug, Clone, Error)]
pub enum TargetError {
    /// The supplied host string was empty or all whitespace.
    #[error("target host is empty")]
    Empty,
}

/// A validated probe target host.
///
/// Holds an IPv4/IPv6 literal or a hostname. Construction only rejects empty
/// input; syntactic validity of the address is not checked here - a malformed
/// host passes through and produces a failed probe when the network primitive
/// rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget(String);

impl ProbeTarget {
    /// Create a target from a host string, trimming surrounding whitespace.
    pub fn new(host: impl Into<String>) -> Result<Self, TargetError> {
        let host = host.into();
        let trimmed = host.trim();
        if trimmed.is_empty() {
            return Err(TargetError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The host string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration for a single reachability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Number of echo probes to send (default: 3).
    #[serde(default = "default_count")]
    pub count: u32,
    /// Per-reply wait (default: 5s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// Grace margin beyond `timeout` before the run is aborted (default: 2s).
    #[serde(default = "default_grace", with = "humantime_serde")]
    pub grace: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            timeout: DEFAULT_TIMEOUT,
            grace: DEFAULT_GRACE,
        }
    }
}

impl ProbeConfig {
    /// Set the probe count.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Set the per-reply wait.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the grace margin.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}

/// Structured outcome of one reachability check.
///
/// Exactly one side of the outcome is populated: the summary fields on the
/// success path, `error_detail` on every failure path. `exit_code` is only
/// present when the check ran through the command backend.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    /// Whether the target answered the echo sequence.
    pub success: bool,
    /// The host that was probed.
    pub target: String,
    /// Human-readable outcome summary.
    pub message: String,
    /// Round-trip-time statistics line, when the check produced one.
    pub rtt_summary: Option<String>,
    /// Packet-transmission counts line, when the check produced one.
    pub packet_summary: Option<String>,
    /// Full diagnostic text of the check.
    pub raw_output: Option<String>,
    /// Failure description for unsuccessful checks.
    pub error_detail: Option<String>,
    /// Exit status of the external check process, when one was used.
    pub exit_code: Option<i32>,
}

impl ProbeResult {
    /// Successful check: the target answered.
    pub fn reached(
        target: &ProbeTarget,
        packet_summary: Option<String>,
        rtt_summary: Option<String>,
        raw_output: String,
    ) -> Self {
        Self {
            success: true,
            target: target.to_string(),
            message: format!("Successfully reached {target}"),
            rtt_summary,
            packet_summary,
            raw_output: Some(raw_output),
            error_detail: None,
            exit_code: None,
        }
    }

    /// Completed check that reported failure (no replies, unknown host, ...).
    pub fn unreachable(target: &ProbeTarget, error_detail: String, exit_code: Option<i32>) -> Self {
        Self {
            success: false,
            target: target.to_string(),
            message: format!("Failed to reach {target}"),
            rtt_summary: None,
            packet_summary: None,
            raw_output: None,
            error_detail: Some(error_detail),
            exit_code,
        }
    }

    /// The deadline elapsed before the check completed.
    pub fn timed_out(target: &ProbeTarget) -> Self {
        Self {
            success: false,
            target: target.to_string(),
            message: format!("Timeout reaching {target}"),
            rtt_summary: None,
            packet_summary: None,
            raw_output: None,
            error_detail: Some("Ping request timed out".to_string()),
            exit_code: None,
        }
    }

    /// The check could not be launched at all.
    pub fn launch_error(target: &ProbeTarget, error_detail: String) -> Self {
        Self {
            success: false,
            target: target.to_string(),
            message: format!("Error testing {target}"),
            rtt_summary: None,
            packet_summary: None,
            raw_output: None,
            error_detail: Some(error_detail),
            exit_code: None,
        }
    }
}
