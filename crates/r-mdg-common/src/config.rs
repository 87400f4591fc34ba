//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the fixture generator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;
use crate::time::{parse_timestamp, timestamp_serde, Timeline};

fn default_start() -> NaiveDateTime {
    parse_timestamp("2025-09-01 00:00:00").unwrap_or_default()
}

fn default_end() -> NaiveDateTime {
    parse_timestamp("2025-09-07 23:45:00").unwrap_or_default()
}

fn default_interval_minutes() -> u32 {
    15
}

fn default_districts() -> usize {
    16
}

fn default_total_meters() -> usize {
    1150
}

fn default_area_code() -> String {
    "440000".to_owned()
}

fn default_fault_seed() -> u64 {
    42
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs/electric_meter_data")
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("outputs/logs")
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Top-level configuration for a fixture generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "R_MDG_CONFIG";

    /// Load configuration from disk together with the effective source path,
    /// respecting the `R_MDG_CONFIG` override.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        Self::discover(candidates)?.ok_or_else(|| {
            anyhow!(
                "no configuration files found. inspected: {}",
                candidates
                    .iter()
                    .map(|p| p.as_ref().display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }

    /// Like [`AppConfig::load_with_source`] but yields `None` when no candidate exists.
    pub fn discover<P: AsRef<Path>>(candidates: &[P]) -> Result<Option<LoadedAppConfig>> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(Some(LoadedAppConfig {
                    config,
                    source: path,
                }));
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(Some(LoadedAppConfig {
                    config,
                    source: path,
                }));
            }
        }
        Ok(None)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.generation.validate()
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Shape of the simulated installation and window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_start", with = "timestamp_serde")]
    pub start: NaiveDateTime,
    #[serde(default = "default_end", with = "timestamp_serde")]
    pub end: NaiveDateTime,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    #[serde(default = "default_districts")]
    pub districts: usize,
    /// Explicit sub-meter count per district. Takes precedence over `total_meters`.
    #[serde(default)]
    pub sub_meters_per_district: Option<usize>,
    /// Total meters across all districts, main meters included.
    #[serde(default = "default_total_meters")]
    pub total_meters: usize,
    /// One supply-organisation code per district, in district order.
    #[serde(default)]
    pub supply_org_codes: Vec<String>,
    #[serde(default = "default_area_code")]
    pub area_code: String,
    /// Seed for the ambient random stream; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Seed for the dedicated fault-history stream.
    #[serde(default = "default_fault_seed")]
    pub fault_seed: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            interval_minutes: default_interval_minutes(),
            districts: default_districts(),
            sub_meters_per_district: None,
            total_meters: default_total_meters(),
            supply_org_codes: Vec::new(),
            area_code: default_area_code(),
            seed: None,
            fault_seed: default_fault_seed(),
            output_dir: default_output_dir(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval_minutes == 0 {
            return Err(anyhow!("generation.interval_minutes must be greater than zero"));
        }
        if self.end < self.start {
            return Err(anyhow!("generation.end must not precede generation.start"));
        }
        if self.districts == 0 {
            return Err(anyhow!("generation.districts must be at least 1"));
        }
        if !self.supply_org_codes.is_empty() && self.supply_org_codes.len() < self.districts {
            return Err(anyhow!(
                "generation.supply_org_codes lists {} codes but {} districts are configured",
                self.supply_org_codes.len(),
                self.districts
            ));
        }
        Ok(())
    }

    /// Sub meters per district, derived from `total_meters` unless set explicitly.
    pub fn effective_sub_meters(&self) -> usize {
        if let Some(explicit) = self.sub_meters_per_district {
            return explicit;
        }
        if self.districts == 0 {
            return 0;
        }
        self.total_meters.saturating_sub(self.districts) / self.districts
    }

    /// Supply-organisation codes in district order, synthesising `05NN` when none are configured.
    pub fn supply_org_pool(&self) -> Vec<String> {
        if !self.supply_org_codes.is_empty() {
            return self.supply_org_codes.clone();
        }
        (1..=self.districts).map(|i| format!("05{:02}", i)).collect()
    }

    pub fn timeline(&self) -> Result<Timeline> {
        Timeline::new(self.start, self.end, self.interval_minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
    /// Keep a rolling JSON log file next to console output.
    #[serde(default = "default_true")]
    pub file: bool,
    /// Filter used when neither `R_MDG_LOG` nor `RUST_LOG` is set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
            file: true,
            level: default_log_level(),
        }
    }
}
