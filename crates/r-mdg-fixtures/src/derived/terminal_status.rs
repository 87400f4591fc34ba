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
use r_mdg_common::Timeline;
use serde::Serialize;
use tracing::debug;

use super::{customer_type, user_name};
use crate::entities::Topology;
use crate::rng::FixtureRng;
use crate::schema::{Column, Record, TableId};

/// Per-terminal, per-timestamp probability of a status anomaly.
pub const ANOMALY_PROBABILITY: f64 = 0.03;

/// Terminal type written to every row.
pub const CONCENTRATOR: &str = "集中器";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TerminalStatusAnomalyRecord {
    pub supply_org_no: String,
    pub run_term_id: String,
    pub assets_no: String,
    pub run_status_code: &'static str,
    pub exception_type: &'static str,
    pub term_type_code: &'static str,
    pub metering_point_number: String,
    pub elec_cust_no: String,
    pub cust_type_code: &'static str,
    pub elec_addr: String,
    #[serde(with = "timestamp_serde")]
    pub abnormal_date: NaiveDateTime,
    pub elec_cust_name: String,
}

impl Record for TerminalStatusAnomalyRecord {
    const TABLE: TableId = TableId::TerminalStatusAnomaly;
    const COLUMNS: &'static [Column] = &[
        Column::new("SUPPLY_ORG_NO", "供电单位"),
        Column::new("RUN_TERM_ID", "终端标识"),
        Column::new("ASSETS_NO", "终端资产编号"),
        Column::new("RUN_STATUS_CODE", "运行状态"),
        Column::new("EXCEPTION_TYPE", "异常类型"),
        Column::new("TERM_TYPE_CODE", "终端类型"),
        Column::new("METERING_POINT_NUMBER", "计量点编号"),
        Column::new("ELEC_CUST_NO", "用户编号"),
        Column::new("CUST_TYPE_CODE", "用户类型"),
        Column::new("ELEC_ADDR", "用户地址"),
        Column::new("ABNORMAL_DATE", "异常日期"),
        Column::new("ELEC_CUST_NAME", "用户名称"),
    ];
}

/// Independent 3% draw per (terminal, timestamp). Identity columns are the
/// terminal's own.
pub fn terminal_status_anomalies(
    timeline: &Timeline,
    topology: &Topology,
    rng: &mut FixtureRng,
) -> Vec<TerminalStatusAnomalyRecord> {
    let mut rows = Vec::new();
    for terminal in topology.terminals() {
        for &at in timeline.points() {
            if !rng.chance(ANOMALY_PROBABILITY) {
                continue;
            }
            rows.push(TerminalStatusAnomalyRecord {
                supply_org_no: terminal.supply_org.clone(),
                run_term_id: terminal.run_term_id.clone(),
                assets_no: terminal.assets_no.clone(),
                run_status_code: rng.pick(&["离线", "故障", "异常"]),
                exception_type: rng.pick(&["通信中断", "数据上报失败", "设备无响应", "参数异常"]),
                term_type_code: CONCENTRATOR,
                metering_point_number: terminal.metering_point_number.clone(),
                elec_cust_no: terminal.elec_cust_no.clone(),
                cust_type_code: customer_type(rng),
                elec_addr: terminal.install_addr.clone(),
                abnormal_date: at,
                elec_cust_name: user_name(rng),
            });
        }
    }
    debug!(rows = rows.len(), "generated terminal status anomalies");
    rows
}
