//! Backend services for viewprobe.
//!
//! - `connection` - Connection establishment and the `ViewConnection` query capability
//! - `views` - View listing and timed view probes

pub mod connection;
pub mod views;

pub use connection::{connect, DatabaseConnection, Row, ViewConnection};
pub use views::ViewService;
