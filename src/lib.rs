//! Envprobe - Environment Connectivity Validator
//!
//! This crate provides the core functionality for the envprobe service.
//! It can be used as a library by other Rust projects, or run as a standalone
//! binary with the `envprobe` executable.
//!
//! # Architecture
//!
//! - **Probe**: bounded-time ICMP reachability checks with a native socket
//!   backend and a system `ping` fallback
//! - **Infra**: read-once infrastructure metadata used as a fallback probe
//!   target
//! - **Config**: YAML application configuration with CLI/env overrides
//! - **Server**: REST API for triggering probes and reading cached metadata
//!
//! # Example
//!
//! ```rust,no_run
//! use envprobe::{ProbeConfig, ProbeRunner, ProbeTarget};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = ProbeRunner::new();
//!     let target = ProbeTarget::new("192.0.2.10")?;
//!     let result = runner.probe(&target, &ProbeConfig::default()).await;
//!     println!("{}: {}", result.target, result.message);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod infra;
pub mod probe;
pub mod server;

pub use config::{AppConfig, ConfigError, ServerConfig};
pub use infra::{InfraError, InfrastructureInfo};
pub use probe::{ProbeConfig, ProbeResult, ProbeRunner, ProbeTarget, TargetError};
