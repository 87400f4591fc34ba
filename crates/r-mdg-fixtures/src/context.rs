//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::{Duration, NaiveDateTime};
use r_mdg_common::GenerationConfig;

/// Run-wide stamping values shared by every generator.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Wall-clock instant the run is attributed to (load/create/update columns).
    pub generated_at: NaiveDateTime,
    pub area_code: String,
    /// Supply-organisation code for rows not tied to a district.
    pub default_supply_org: String,
}

impl RunContext {
    pub fn new(generated_at: NaiveDateTime, area_code: impl Into<String>, default_supply_org: impl Into<String>) -> Self {
        Self {
            generated_at,
            area_code: area_code.into(),
            default_supply_org: default_supply_org.into(),
        }
    }

    pub fn from_config(config: &GenerationConfig, generated_at: NaiveDateTime) -> Self {
        let default_supply_org = config
            .supply_org_pool()
            .into_iter()
            .next()
            .unwrap_or_else(|| "0501".to_string());
        Self::new(generated_at, config.area_code.clone(), default_supply_org)
    }

    /// `generated_at` shifted back by whole days.
    pub fn days_ago(&self, days: u64) -> NaiveDateTime {
        self.generated_at - Duration::days(days as i64)
    }
}
