//! System `ping` fallback backend.
//!
//! Used when the native ICMP socket is unavailable (unprivileged process).
//! The target is always passed as a single argv element - never through a
//! shell - and the binary's free-text output is scanned for the
//! packet-transmission and round-trip statistics lines.

use std::process::Stdio;
use std::sync::OnceLock;

use regex::Regex;
use tokio::process::Command;

use crate::probe::backend::{CheckReport, LaunchError, ProbeBackend};
use crate::probe::result::{ProbeConfig, ProbeTarget};

/// Reachability check that drives the system `ping` binary.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
}

impl Default for CommandBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBackend {
    pub fn new() -> Self {
        Self {
            program: "ping".to_string(),
        }
    }

    /// Override the ping executable (tests).
    #[cfg(test)]
    pub(crate) fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the check invocation as an argument array.
    fn build_command(&self, target: &ProbeTarget, config: &ProbeConfig) -> Command {
        let wait_secs = config.timeout.as_secs().max(1).to_string();
        let mut cmd = Command::new(&self.program);
        cmd.arg("-c").arg(config.count.to_string());
        // Linux iputils waits per reply with -W; BSD/macOS ping bounds the
        // whole run with -t instead.
        #[cfg(target_os = "macos")]
        cmd.arg("-t").arg(wait_secs);
        #[cfg(not(target_os = "macos"))]
        cmd.arg("-W").arg(wait_secs);
        cmd.arg(target.as_str());
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// The line carrying packet-transmission counts, if present.
fn statistics_line(output: &str) -> Option<String> {
    static STATS_RE: OnceLock<Regex> = OnceLock::new();
    let re = STATS_RE.get_or_init(|| {
        Regex::new(r"(?m)^.*packets transmitted.*$").expect("failed to compile statistics regex")
    });
    re.find(output).map(|m| m.as_str().trim().to_string())
}

/// The line carrying round-trip statistics, if present.
///
/// Matches both the Linux (`rtt min/avg/max`) and BSD (`round-trip`) formats.
fn rtt_line(output: &str) -> Option<String> {
    static RTT_RE: OnceLock<Regex> = OnceLock::new();
    let re = RTT_RE.get_or_init(|| {
        Regex::new(r"(?m)^.*(?:rtt min/avg/max|round-trip).*$")
            .expect("failed to compile rtt regex")
    });
    re.find(output).map(|m| m.as_str().trim().to_string())
}

#[async_trait::async_trait]
impl ProbeBackend for CommandBackend {
    async fn run(
        &self,
        target: &ProbeTarget,
        config: &ProbeConfig,
    ) -> Result<CheckReport, LaunchError> {
        let output = self
            .build_command(target, config)
            .output()
            .await
            .map_err(LaunchError::Spawn)?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if output.status.success() {
            Ok(CheckReport {
                success: true,
                packet_summary: statistics_line(&stdout),
                rtt_summary: rtt_line(&stdout),
                raw_output: stdout,
                error_detail: None,
                exit_code: output.status.code(),
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() {
                // Some ping variants report failures on stdout only.
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            Ok(CheckReport {
                success: false,
                packet_summary: statistics_line(&stdout),
                rtt_summary: None,
                raw_output: stdout,
                error_detail: Some(detail),
                exit_code: output.status.code(),
            })
        }
    }
}
