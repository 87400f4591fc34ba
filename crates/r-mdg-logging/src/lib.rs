//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Structured logging context for fixture generation."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Structured logging helpers shared by the fixture pipeline and CLI.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for tests and ad-hoc runs.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Logical table name (e.g. `meter_master`).
    pub table: Option<&'a str>,
    /// Output file the table is written to.
    pub file: Option<&'a str>,
    /// Row count produced or written.
    pub rows: Option<usize>,
    /// District code the event relates to.
    pub district: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a table name.
    pub fn with_table(mut self, table: &'a str) -> Self {
        self.table = Some(table);
        self
    }

    /// Attach an output file name.
    pub fn with_file(mut self, file: &'a str) -> Self {
        self.file = Some(file);
        self
    }

    /// Attach a row count.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Attach a district code.
    pub fn with_district(mut self, district: &'a str) -> Self {
        self.district = Some(district);
        self
    }
}

/// Outcome recorded on table lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEventOutcome {
    /// The table was produced or written.
    Success,
    /// Producing or writing the table failed.
    Fault,
}

impl TableEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            TableEventOutcome::Success => "success",
            TableEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized table lifecycle event with a success/fault outcome.
pub fn log_table_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: TableEventOutcome,
) {
    let ctx = context.cloned().unwrap_or_default();
    match outcome {
        TableEventOutcome::Success => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            table = ctx.table.unwrap_or(""),
            file = ctx.file.unwrap_or(""),
            rows = ctx.rows.unwrap_or_default(),
            district = ctx.district.unwrap_or(""),
            message = %message
        ),
        TableEventOutcome::Fault => tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            table = ctx.table.unwrap_or(""),
            file = ctx.file.unwrap_or(""),
            rows = ctx.rows.unwrap_or_default(),
            district = ctx.district.unwrap_or(""),
            message = %message
        ),
    }
}
