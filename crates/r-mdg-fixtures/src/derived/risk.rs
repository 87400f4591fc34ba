//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Risk grade list.
//!
//! The contribution factors (`base_risk_*`, `incr_risk`) are drawn
//! independently of `RISK`; no aggregation formula links them.
use chrono::NaiveDateTime;
use r_mdg_common::time::timestamp_serde;
use r_mdg_common::Timeline;
use serde::Serialize;
use tracing::debug;

use super::{user_id, user_name, TerminalFields};
use crate::context::RunContext;
use crate::entities::Topology;
use crate::grade::RiskGrade;
use crate::hardware::HardwareRegistry;
use crate::rng::FixtureRng;
use crate::schema::{Column, Record, TableId};

/// Timestamps sampled per risky meter.
pub const SAMPLES_PER_METER: usize = 5;
const RISKY_METER_DIVISOR: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct RiskRecord {
    #[serde(rename = "DATA_TIME", with = "timestamp_serde")]
    pub data_time: NaiveDateTime,
    #[serde(rename = "SUPPLY_ORG_NO")]
    pub supply_org_no: String,
    #[serde(rename = "DATA_FROM")]
    pub data_from: &'static str,
    #[serde(rename = "AREA_CODE")]
    pub area_code: String,
    #[serde(rename = "TERMINAL_ID")]
    pub terminal_id: String,
    #[serde(rename = "RUN_TERM_ID")]
    pub run_term_id: String,
    #[serde(rename = "COMM_ADDR")]
    pub comm_addr: String,
    #[serde(rename = "REASON_SWITCH")]
    pub reason_switch: &'static str,
    #[serde(rename = "REASON_SWITCH_TIME", with = "timestamp_serde")]
    pub reason_switch_time: NaiveDateTime,
    #[serde(rename = "RUN_METER_ID")]
    pub run_meter_id: String,
    #[serde(rename = "ELECTRICITY_ID")]
    pub electricity_id: String,
    #[serde(rename = "TERMINAL_STATUS")]
    pub terminal_status: &'static str,
    #[serde(rename = "METERING_POINT_STATE")]
    pub metering_point_state: &'static str,
    #[serde(rename = "RISK_TYPE")]
    pub risk_type: &'static str,
    #[serde(rename = "RISK_GRADE")]
    pub risk_grade: RiskGrade,
    #[serde(rename = "RISK_FACTOR")]
    pub risk_factor: &'static str,
    #[serde(rename = "RISK")]
    pub risk: f64,
    pub user_name: String,
    pub user_id: String,
    pub user_type: &'static str,
    pub user_addr: String,
    #[serde(rename = "base_risk_MANUFACTURER")]
    pub base_risk_manufacturer: f64,
    #[serde(rename = "base_risk_BATCH")]
    pub base_risk_batch: f64,
    #[serde(rename = "base_risk_LOAD")]
    pub base_risk_load: f64,
    pub base_risk_data_security: f64,
    pub base_risk_uncap_event: f64,
    pub incr_risk: f64,
    #[serde(rename = "MANUFACTURER_NAME")]
    pub manufacturer_name: &'static str,
    #[serde(rename = "ARRIVE_BATCH")]
    pub arrive_batch: String,
}

impl Record for RiskRecord {
    const TABLE: TableId = TableId::RiskList;
    const COLUMNS: &'static [Column] = &[
        Column::new("DATA_TIME", "主键,数据时间"),
        Column::new("SUPPLY_ORG_NO", "供电单位编号"),
        Column::new("DATA_FROM", "数据来源"),
        Column::new("AREA_CODE", "地区编码"),
        Column::new("TERMINAL_ID", "终端标识"),
        Column::new("RUN_TERM_ID", "运行终端标识"),
        Column::new("COMM_ADDR", "通讯地址"),
        Column::new("REASON_SWITCH", "切换原因"),
        Column::new("REASON_SWITCH_TIME", "切换原因时间"),
        Column::new("RUN_METER_ID", "运行电能表标识"),
        Column::new("ELECTRICITY_ID", "用电标识"),
        Column::new("TERMINAL_STATUS", "终端状态"),
        Column::new("METERING_POINT_STATE", "计量点状态"),
        Column::new("RISK_TYPE", "风险类型"),
        Column::new("RISK_GRADE", "风险等级"),
        Column::new("RISK_FACTOR", "风险因子"),
        Column::new("RISK", "风险系数"),
        Column::new("user_name", "用户名称"),
        Column::new("user_id", "用户编号"),
        Column::new("user_type", "用户类型"),
        Column::new("user_addr", "用户地址"),
        Column::new("base_risk_MANUFACTURER", "电能表厂家贡献度"),
        Column::new("base_risk_BATCH", "电能表批次贡献度"),
        Column::new("base_risk_LOAD", "负荷水平贡献度"),
        Column::new("base_risk_data_security", "数据安全贡献度"),
        Column::new("base_risk_uncap_event", "开盖事件记录贡献度"),
        Column::new("incr_risk", "增量基础因子"),
        Column::new("MANUFACTURER_NAME", "生产厂家名称"),
        Column::new("ARRIVE_BATCH", "所属批次"),
    ];
}

/// Sample `max(1, meters / 10)` meters, each scored at `min(5, timestamps)`
/// distinct timestamps.
pub fn risk_list(
    timeline: &Timeline,
    topology: &Topology,
    registry: &HardwareRegistry,
    ctx: &RunContext,
    rng: &mut FixtureRng,
) -> Vec<RiskRecord> {
    let mut rows = Vec::new();
    let wanted = (topology.meter_count() / RISKY_METER_DIVISOR).max(1);
    for meter in rng.sample(topology.meters(), wanted) {
        for &at in rng.sample(timeline.points(), SAMPLES_PER_METER) {
            let terminal = TerminalFields::resolve(topology, registry, meter, rng);
            let risk = rng.uniform_rounded(0.0, 1.0, 2);
            rows.push(RiskRecord {
                data_time: at,
                supply_org_no: meter.supply_org.clone(),
                data_from: "AUTO",
                area_code: ctx.area_code.clone(),
                terminal_id: terminal.assets_no,
                run_term_id: terminal.run_term_id,
                comm_addr: terminal.comm_addr,
                reason_switch: rng.pick(&["设备老化", "通信异常", "数据异常", "正常"]),
                reason_switch_time: at,
                run_meter_id: meter.id.clone(),
                electricity_id: rng.tagged("ELEC", 100_000..=999_999),
                terminal_status: rng.pick(&["在线", "离线", "故障"]),
                metering_point_state: rng.pick(&["正常", "异常", "停运"]),
                risk_type: rng.pick(&["设备风险", "通信风险", "数据风险", "运维风险"]),
                risk_grade: RiskGrade::from_score(risk),
                risk_factor: rng.pick(&["计量失准", "接线错误", "通信故障", "设备老化"]),
                risk,
                user_name: user_name(rng),
                user_id: user_id(rng),
                user_type: super::customer_type(rng),
                user_addr: format!("{}台区", meter.district),
                base_risk_manufacturer: rng.uniform_rounded(0.0, 1.0, 3),
                base_risk_batch: rng.uniform_rounded(0.0, 1.0, 3),
                base_risk_load: rng.uniform_rounded(0.0, 1.0, 3),
                base_risk_data_security: rng.uniform_rounded(0.0, 1.0, 3),
                base_risk_uncap_event: rng.uniform_rounded(0.0, 1.0, 3),
                incr_risk: rng.uniform_rounded(0.0, 0.5, 3),
                manufacturer_name: terminal.manufacturer,
                arrive_batch: terminal.arrive_batch,
            });
        }
    }
    debug!(rows = rows.len(), meters = wanted, "generated risk list");
    rows
}
