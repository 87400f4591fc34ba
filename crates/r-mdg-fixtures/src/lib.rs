//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture module exports and shared types."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Cross-table consistent smart-meter fixtures.
//!
//! The entity factory ([`entities`]) builds districts, meters and terminals;
//! the [`ledger`] records time-stamped anomalies; [`derived`] and [`curves`]
//! turn both into dependent tables whose identifiers always agree with the
//! master tables. [`pipeline`] sequences the run and [`writer`] exports it.

pub mod context;
pub mod curves;
pub mod derived;
pub mod distortion;
pub mod entities;
pub mod errors;
pub mod grade;
pub mod hardware;
pub mod ledger;
pub mod master;
pub mod pipeline;
pub mod rng;
pub mod schema;
pub mod taxonomy;
pub mod writer;

pub use context::RunContext;
pub use curves::{power_curve, voltage_curve, PowerCurveRecord, VoltageCurveRecord};
pub use distortion::{PhasePower, PowerSample};
pub use entities::{District, Meter, MeterRole, Terminal, Topology};
pub use errors::{FixtureError, Result};
pub use grade::RiskGrade;
pub use hardware::{hardware_status, HardwareRegistry, HardwareStatusRecord};
pub use ledger::{AnomalyEvent, AnomalyLedger};
pub use master::{meter_master, terminal_master, MeterMasterRecord, TerminalMasterRecord};
pub use pipeline::{FixtureSet, RunManifest, TableSummary, MANIFEST_FILE};
pub use rng::FixtureRng;
pub use schema::{Column, Record, TableId};
pub use taxonomy::{AnomalyClass, AnomalyKind, MeasurementDisturbance, WiringFault};
pub use writer::{TabularWriter, UTF8_BOM};
