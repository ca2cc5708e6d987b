//! # domains
//!
//! The central domain models, error taxonomy and port traits of the
//! briefing server. This crate performs no I/O; adapters implement the ports.

pub mod clock;
pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use clock::*;
pub use errors::*;
pub use models::*;
pub use ports::*;
