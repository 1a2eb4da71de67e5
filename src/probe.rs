//! Probe Layer
//!
//! A probe is a single bounded-time ICMP echo sequence against one target.
//! Two backends implement the check: a native ICMP socket (preferred) and a
//! fallback that drives the system `ping` binary with argument-array
//! construction. [`ProbeRunner`] selects the backend, enforces the overall
//! deadline, and always returns a [`ProbeResult`] - an unreachable target,
//! an elapsed deadline, and a failed launch are all data, never errors.
//!
//! # Example
//!
//! ```rust,no_run
//! use envprobe::probe::{ProbeConfig, ProbeRunner, ProbeTarget};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), envprobe::probe::TargetError> {
//! let runner = ProbeRunner::new();
//! let target = ProbeTarget::new("192.0.2.10")?;
//! let config = ProbeConfig::default().with_timeout(Duration::from_secs(2));
//! let result = runner.probe(&target, &config).await;
//! assert!(result.message.contains("192.0.2.10"));
//! # Ok(())
//! # }
//! ```

mod backend;
mod command;
mod icmp;
mod result;
mod runner;

pub use command::CommandBackend;
pub use icmp::IcmpBackend;
pub use result::{ProbeConfig, ProbeResult, ProbeTarget, TargetError};
pub use runner::ProbeRunner;
