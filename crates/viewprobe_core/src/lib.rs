//! Core types and services for probing database views.
//!
//! - **error**: Error handling with PostgreSQL diagnostic details
//! - **models**: Connection parameters, credentials, probe results
//! - **services**: Connection establishment, view listing and probing
//! - **logging**: Structured logging setup

pub mod error;
pub mod logging;
pub mod models;
pub mod services;


pub use error::ProbeError;
pub use models::{
    build_config, ConnectionParameters, Credentials, ProbeFailure, ProbeReport, ProbeResult,
    ViewName, ViewOutcome,
};
pub use services::{connect, DatabaseConnection, ViewConnection, ViewService};
