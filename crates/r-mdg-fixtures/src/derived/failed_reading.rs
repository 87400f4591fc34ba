//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::NaiveDateTime;
use r_mdg_common::time::timestamp_serde;
use serde::Serialize;
use tracing::debug;

use super::TerminalFields;
use crate::entities::Topology;
use crate::hardware::HardwareRegistry;
use crate::ledger::AnomalyLedger;
use crate::master::{METER_COMM_MODE, METER_COMM_PROTOCOL};
use crate::rng::FixtureRng;
use crate::schema::{Column, Record, TableId};

/// Upper bound of failed meters per communication-anomaly timestamp.
pub const MAX_FAILURES_PER_TIMESTAMP: u64 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct FailedReadingRecord {
    #[serde(rename = "SUPPLY_ORG_NO")]
    pub supply_org_no: String,
    #[serde(with = "timestamp_serde")]
    pub data_time: NaiveDateTime,
    #[serde(rename = "EQU_ID")]
    pub equ_id: String,
    #[serde(rename = "ASSETS_NO")]
    pub assets_no: String,
    #[serde(rename = "RUN_STATUS_CODE")]
    pub run_status_code: &'static str,
    #[serde(rename = "COMM_ADDR")]
    pub comm_addr: String,
    #[serde(rename = "COMM_MODE")]
    pub comm_mode: &'static str,
    #[serde(rename = "PROTOCOL_CODE")]
    pub protocol_code: &'static str,
    #[serde(rename = "WIRE_MODE_CODE")]
    pub wire_mode_code: &'static str,
    pub meter_reading_status: &'static str,
    #[serde(rename = "RUN_TERM_ID")]
    pub run_term_id: String,
    #[serde(rename = "MANUFACTURER_NAME")]
    pub manufacturer_name: &'static str,
}

impl Record for FailedReadingRecord {
    const TABLE: TableId = TableId::FailedReading;
    const COLUMNS: &'static [Column] = &[
        Column::new("SUPPLY_ORG_NO", "供电单位"),
        Column::new("data_time", "数据时间"),
        Column::new("EQU_ID", "设备标识"),
        Column::new("ASSETS_NO", "设备资产编码"),
        Column::new("RUN_STATUS_CODE", "设备运行状态"),
        Column::new("COMM_ADDR", "设备逻辑地址"),
        Column::new("COMM_MODE", "通信方式"),
        Column::new("PROTOCOL_CODE", "规约类型"),
        Column::new("WIRE_MODE_CODE", "接线方式"),
        Column::new("meter_reading_status", "抄表状态"),
        Column::new("RUN_TERM_ID", "终端标识"),
        Column::new("MANUFACTURER_NAME", "生产厂家名称"),
    ];
}

/// Failed meter readings at timestamps carrying a communication anomaly.
/// `EQU_ID` is the meter identifier; the manufacturer comes from the
/// hardware registry entry for that meter, when sampled there.
pub fn failed_readings(
    ledger: &AnomalyLedger,
    topology: &Topology,
    registry: &HardwareRegistry,
    rng: &mut FixtureRng,
) -> Vec<FailedReadingRecord> {
    let mut rows = Vec::new();
    for at in ledger.grouped(|k| k.is_communication()).into_keys() {
        let wanted = rng.int(1..=MAX_FAILURES_PER_TIMESTAMP) as usize;
        for meter in rng.sample(topology.meters(), wanted) {
            let terminal = TerminalFields::resolve(topology, registry, meter, rng);
            rows.push(FailedReadingRecord {
                supply_org_no: meter.supply_org.clone(),
                data_time: at,
                equ_id: meter.id.clone(),
                assets_no: meter.assets_no.clone(),
                run_status_code: rng.pick(&["在线", "离线", "故障"]),
                comm_addr: meter.comm_addr.clone(),
                comm_mode: METER_COMM_MODE,
                protocol_code: METER_COMM_PROTOCOL,
                wire_mode_code: rng.pick(&["三相四线", "三相三线", "单相"]),
                meter_reading_status: "失败",
                run_term_id: terminal.run_term_id,
                manufacturer_name: registry.manufacturer(&meter.id),
            });
        }
    }
    debug!(rows = rows.len(), "generated failed readings");
    rows
}
