//! Data models for viewprobe.
//!
//! - `connection` - ConnectionParameters, Credentials, build_config
//! - `probe` - ViewName, ProbeResult, ProbeReport

pub mod connection;
pub mod probe;

pub use connection::{
    build_config, ConnectionParameters, Credentials, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_TIMEOUT_MS,
};
pub use probe::{ProbeFailure, ProbeReport, ProbeResult, ViewName, ViewOutcome};
