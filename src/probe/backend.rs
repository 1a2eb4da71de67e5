//! Backend seam shared by the native and command check implementations.

use thiserror::Error;

use crate::probe::result::{ProbeConfig, ProbeTarget};

/// Errors that prevent a check from being launched at all.
///
/// Distinct from an unsuccessful check: a launch error means no probe was
/// attempted, and the runner may try another backend.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The native ICMP socket could not be created (typically a privilege
    /// restriction on unprivileged processes).
    #[error("cannot create ICMP socket: {0}")]
    IcmpSocket(std::io::Error),

    /// The external check process could not be spawned.
    #[error("cannot spawn check process: {0}")]
    Spawn(std::io::Error),
}

/// Normalized outcome of a completed check, before runner shaping.
///
/// Unlike [`crate::probe::ProbeResult`], both summary and error fields may be
/// carried here; the runner keeps only the side matching `success`.
#[derive(Debug)]
pub(crate) struct CheckReport {
    pub success: bool,
    pub packet_summary: Option<String>,
    pub rtt_summary: Option<String>,
    pub raw_output: String,
    pub error_detail: Option<String>,
    pub exit_code: Option<i32>,
}

impl CheckReport {
    /// A completed check that reported failure before any probe was sent
    /// (e.g. name resolution rejected the target).
    pub(crate) fn rejected(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            packet_summary: None,
            rtt_summary: None,
            raw_output: String::new(),
            error_detail: Some(detail.into()),
            exit_code: None,
        }
    }
}

/// A reachability-check implementation.
///
/// `run` completes the whole echo sequence or returns a [`LaunchError`];
/// the overall deadline is enforced by the runner, not the backend.
#[async_trait::async_trait]
pub(crate) trait ProbeBackend: Send + Sync {
    async fn run(
        &self,
        target: &ProbeTarget,
        config: &ProbeConfig,
    ) -> Result<CheckReport, LaunchError>;
}
