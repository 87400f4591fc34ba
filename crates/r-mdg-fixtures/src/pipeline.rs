//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Single-pass generation of the full table set, followed by export.
//!
//! Generators run in dependency order: entities, master tables, hardware
//! status, then everything derived from the hardware registry and the anomaly
//! ledger. Nothing produced earlier is mutated later.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use r_mdg_common::time::timestamp_serde;
use r_mdg_common::{format_timestamp, GenerationConfig, Timeline};
use r_mdg_logging::{log_table_event, mdg_debug, mdg_info, LogContext, TableEventOutcome};
use serde::Serialize;

use crate::context::RunContext;
use crate::curves::{power_curve, voltage_curve, PowerCurveRecord, VoltageCurveRecord};
use crate::derived::{
    calculation_anomalies, failed_readings, fault_history, maintenance_log, meter_status_anomalies,
    risk_list, terminal_status_anomalies, CalculationAnomalyRecord, FailedReadingRecord,
    FaultRecord, MaintenanceRecord, MeterStatusAnomalyRecord, RiskRecord,
    TerminalStatusAnomalyRecord,
};
use crate::entities::Topology;
use crate::errors::{FixtureError, Result};
use crate::hardware::{hardware_status, HardwareRegistry, HardwareStatusRecord};
use crate::ledger::{AnomalyEvent, AnomalyLedger};
use crate::master::{meter_master, terminal_master, MeterMasterRecord, TerminalMasterRecord};
use crate::rng::FixtureRng;
use crate::schema::{Record, TableId};
use crate::writer::TabularWriter;

/// File name of the run manifest written next to the tables.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Every table of one run, held in memory until written.
#[derive(Debug, Clone)]
pub struct FixtureSet {
    pub context: RunContext,
    pub timeline: Timeline,
    pub topology: Topology,
    pub meter_master: Vec<MeterMasterRecord>,
    pub terminal_master: Vec<TerminalMasterRecord>,
    pub hardware_status: Vec<HardwareStatusRecord>,
    pub fault_history: Vec<FaultRecord>,
    pub maintenance_log: Vec<MaintenanceRecord>,
    pub data_anomalies: Vec<AnomalyEvent>,
    pub risk_list: Vec<RiskRecord>,
    pub calculation_anomalies: Vec<CalculationAnomalyRecord>,
    pub terminal_status_anomalies: Vec<TerminalStatusAnomalyRecord>,
    pub meter_status_anomalies: Vec<MeterStatusAnomalyRecord>,
    pub failed_readings: Vec<FailedReadingRecord>,
    pub power_curve: Vec<PowerCurveRecord>,
    pub voltage_curve: Vec<VoltageCurveRecord>,
}

impl FixtureSet {
    /// Generate from a validated configuration. The ambient stream follows
    /// `seed` (entropy when absent); the fault list always uses `fault_seed`.
    pub fn generate(config: &GenerationConfig, timeline: Timeline, generated_at: NaiveDateTime) -> Self {
        let mut rng = FixtureRng::from_optional_seed(config.seed);
        let mut fault_rng = FixtureRng::seeded(config.fault_seed);
        let context = RunContext::from_config(config, generated_at);
        let topology = Topology::from_config(config, &mut rng);
        Self::generate_with(context, timeline, topology, &mut rng, &mut fault_rng)
    }

    /// Generate every table over an existing topology.
    pub fn generate_with(
        context: RunContext,
        timeline: Timeline,
        topology: Topology,
        rng: &mut FixtureRng,
        fault_rng: &mut FixtureRng,
    ) -> Self {
        let ctx = &context;
        let meter_master = meter_master(&topology, ctx, rng);
        let terminal_master = terminal_master(&topology, ctx, rng);
        let hardware_status = hardware_status(&topology, rng);
        let registry = HardwareRegistry::from_records(&hardware_status);
        let fault_history = fault_history(&timeline, &topology, &registry, ctx, fault_rng);
        let maintenance_log = maintenance_log(&timeline, &topology, &registry, rng);
        let ledger = AnomalyLedger::generate(&timeline, ctx, rng);
        let risk_list = risk_list(&timeline, &topology, &registry, ctx, rng);
        let calculation_anomalies = calculation_anomalies(&timeline, ctx, rng);
        let terminal_status_anomalies = terminal_status_anomalies(&timeline, &topology, rng);
        let meter_status_anomalies = meter_status_anomalies(&ledger, &topology, rng);
        let failed_readings = failed_readings(&ledger, &topology, &registry, rng);
        let power_curve = power_curve(&timeline, &topology, &ledger, ctx, rng);
        let voltage_curve = voltage_curve(&timeline, &topology, &ledger, ctx, rng);

        for district in topology.districts() {
            mdg_debug!(
                context = LogContext::new()
                    .with_district(&district.code)
                    .with_rows(topology.meters_in(&district.code).count()),
                "district {} served by supply org {}",
                district.name,
                district.supply_org
            );
        }
        mdg_info!(
            "generated fixtures for {} districts, {} meters over {} timestamps",
            topology.district_count(),
            topology.meter_count(),
            timeline.len()
        );

        Self {
            context,
            timeline,
            topology,
            meter_master,
            terminal_master,
            hardware_status,
            fault_history,
            maintenance_log,
            data_anomalies: ledger.into_events(),
            risk_list,
            calculation_anomalies,
            terminal_status_anomalies,
            meter_status_anomalies,
            failed_readings,
            power_curve,
            voltage_curve,
        }
    }

    /// Row count of `table`.
    pub fn rows(&self, table: TableId) -> usize {
        match table {
            TableId::MeterMaster => self.meter_master.len(),
            TableId::TerminalMaster => self.terminal_master.len(),
            TableId::HardwareStatus => self.hardware_status.len(),
            TableId::FaultHistory => self.fault_history.len(),
            TableId::MaintenanceLog => self.maintenance_log.len(),
            TableId::DataAnomaly => self.data_anomalies.len(),
            TableId::RiskList => self.risk_list.len(),
            TableId::CalculationAnomaly => self.calculation_anomalies.len(),
            TableId::TerminalStatusAnomaly => self.terminal_status_anomalies.len(),
            TableId::MeterStatusAnomaly => self.meter_status_anomalies.len(),
            TableId::FailedReading => self.failed_readings.len(),
            TableId::PowerCurve => self.power_curve.len(),
            TableId::VoltageCurve => self.voltage_curve.len(),
        }
    }

    /// Write all 13 tables and the manifest into `dir`. The first failure
    /// aborts the run.
    pub fn write_all(&self, dir: impl AsRef<Path>) -> Result<RunManifest> {
        let writer = TabularWriter::create(dir.as_ref())?;
        let mut tables = Vec::with_capacity(TableId::all().count());
        for table in TableId::all() {
            let summary = match table {
                TableId::MeterMaster => write_table(&writer, &self.meter_master),
                TableId::TerminalMaster => write_table(&writer, &self.terminal_master),
                TableId::HardwareStatus => write_table(&writer, &self.hardware_status),
                TableId::FaultHistory => write_table(&writer, &self.fault_history),
                TableId::MaintenanceLog => write_table(&writer, &self.maintenance_log),
                TableId::DataAnomaly => write_table(&writer, &self.data_anomalies),
                TableId::RiskList => write_table(&writer, &self.risk_list),
                TableId::CalculationAnomaly => write_table(&writer, &self.calculation_anomalies),
                TableId::TerminalStatusAnomaly => write_table(&writer, &self.terminal_status_anomalies),
                TableId::MeterStatusAnomaly => write_table(&writer, &self.meter_status_anomalies),
                TableId::FailedReading => write_table(&writer, &self.failed_readings),
                TableId::PowerCurve => write_table(&writer, &self.power_curve),
                TableId::VoltageCurve => write_table(&writer, &self.voltage_curve),
            }?;
            tables.push(summary);
        }
        let manifest = RunManifest {
            generated_at: self.context.generated_at,
            start: self.timeline.points().first().map(format_timestamp),
            end: self.timeline.points().last().map(format_timestamp),
            timestamps: self.timeline.len(),
            districts: self.topology.district_count(),
            meters: self.topology.meter_count(),
            tables,
        };
        manifest.write(writer.dir())?;
        Ok(manifest)
    }
}

fn write_table<R: Record>(writer: &TabularWriter, rows: &[R]) -> Result<TableSummary> {
    let table = R::TABLE;
    let file = table.file_name();
    let ctx = LogContext::new()
        .with_table(table.name())
        .with_file(file)
        .with_rows(rows.len());
    match writer.write(rows) {
        Ok(path) => {
            log_table_event(Some(&ctx), "table.write", "table written", TableEventOutcome::Success);
            Ok(TableSummary {
                table,
                file,
                rows: rows.len(),
                path,
            })
        }
        Err(err) => {
            log_table_event(Some(&ctx), "table.write", &err.to_string(), TableEventOutcome::Fault);
            Err(err)
        }
    }
}

/// One written table.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub table: TableId,
    pub file: &'static str,
    pub rows: usize,
    #[serde(skip)]
    pub path: PathBuf,
}

/// Summary of a completed run, persisted as `manifest.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    #[serde(with = "timestamp_serde")]
    pub generated_at: NaiveDateTime,
    pub start: Option<String>,
    pub end: Option<String>,
    pub timestamps: usize,
    pub districts: usize,
    pub meters: usize,
    pub tables: Vec<TableSummary>,
}

impl RunManifest {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn table(&self, table: TableId) -> Option<&TableSummary> {
        self.tables.iter().find(|t| t.table == table)
    }

    fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        let mut out = BufWriter::new(File::create(&path).map_err(FixtureError::ManifestIo)?);
        serde_json::to_writer_pretty(&mut out, self)?;
        out.write_all(b"\n").map_err(FixtureError::ManifestIo)?;
        out.flush().map_err(FixtureError::ManifestIo)?;
        Ok(path)
    }
}
