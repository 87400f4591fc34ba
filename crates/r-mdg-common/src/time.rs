//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the fixture generator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use anyhow::{anyhow, Context, Result};
use chrono::{Duration, NaiveDateTime};

/// Date-time layout used in configuration files and every emitted table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a naive local timestamp in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid timestamp '{}', expected {}", raw, TIMESTAMP_FORMAT))
}

/// Render a timestamp in [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Fixed-interval sampling instants covering the simulated window, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    points: Vec<NaiveDateTime>,
}

impl Timeline {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, interval_minutes: u32) -> Result<Self> {
        if interval_minutes == 0 {
            return Err(anyhow!("interval_minutes must be greater than zero"));
        }
        if end < start {
            return Err(anyhow!(
                "window end {} precedes start {}",
                format_timestamp(&end),
                format_timestamp(&start)
            ));
        }
        let step = Duration::minutes(i64::from(interval_minutes));
        let mut points = Vec::new();
        let mut cursor = start;
        while cursor <= end {
            points.push(cursor);
            cursor += step;
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[NaiveDateTime] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Serde adapter for [`NaiveDateTime`] fields written in [`TIMESTAMP_FORMAT`].
pub mod timestamp_serde {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
