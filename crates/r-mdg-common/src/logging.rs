//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the fixture generator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Filter override consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "R_MDG_LOG";

/// Writer guards live for the whole process so buffered events are flushed on exit.
static GUARDS: OnceCell<Vec<WorkerGuard>> = OnceCell::new();

/// Console log formats for the generator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    StructuredJson,
    #[default]
    Pretty,
}

/// Install the global subscriber for a generator process.
///
/// Console events go to stderr so stdout stays free for the run summary.
/// When `config.file` is set a daily rolling JSON log is kept under
/// `config.directory` as well. Calling this twice is harmless; the first
/// subscriber wins.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<()> {
    let mut guards = Vec::with_capacity(2);

    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    guards.push(stderr_guard);

    let file_layer = if config.file {
        std::fs::create_dir_all(&config.directory).with_context(|| {
            format!("unable to create log directory {}", config.directory.display())
        })?;
        let prefix = config.file_prefix.as_deref().unwrap_or(service_name);
        let (file_writer, file_guard) =
            tracing_appender::non_blocking(daily(&config.directory, format!("{prefix}.log")));
        guards.push(file_guard);
        Some(
            fmt::layer()
                .json()
                .with_current_span(false)
                .with_writer(file_writer),
        )
    } else {
        None
    };

    let _ = GUARDS.set(guards);

    tracing_subscriber::registry()
        .with(resolve_filter(&config.level))
        .with(console_layer(config.format, stderr_writer))
        .with(file_layer)
        .try_init()
        .ok();

    info!(
        service = %service_name,
        format = ?config.format,
        log_file = config.file,
        log_dir = %config.directory.display(),
        "tracing initialised"
    );
    Ok(())
}

fn console_layer<S>(format: LogFormat, writer: NonBlocking) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    match format {
        LogFormat::StructuredJson => fmt::layer()
            .json()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .compact()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(writer)
            .boxed(),
    }
}

/// `R_MDG_LOG`, then `RUST_LOG`, then the configured default level.
fn resolve_filter(default_level: &str) -> EnvFilter {
    let fallback = || EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"));
    match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => {
            EnvFilter::try_new(&directive).unwrap_or_else(|err| {
                eprintln!("ignoring invalid {LOG_ENV} directive {directive:?}: {err}");
                fallback()
            })
        }
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_default_level_falls_back_to_info() {
        let filter = resolve_filter("not a [valid directive");
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn init_without_file_layer_creates_no_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            directory: dir.path().join("logs"),
            format: LogFormat::StructuredJson,
            file_prefix: None,
            file: false,
            level: "debug".into(),
        };
        init_tracing("r-mdg-test", &config).unwrap();
        assert!(!config.directory.exists());
    }
}
