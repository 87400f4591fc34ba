//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the fixture generator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the R-MDG fixture generator workspace.
//! This crate exposes configuration loading, tracing setup, and the
//! simulated-window timeline consumed across the workspace.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{AppConfig, GenerationConfig, LoadedAppConfig, LoggingConfig};
pub use logging::{init_tracing, LogFormat};
pub use time::{format_timestamp, parse_timestamp, Timeline, TIMESTAMP_FORMAT};
