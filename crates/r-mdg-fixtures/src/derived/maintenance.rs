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

use super::TerminalFields;
use crate::entities::Topology;
use crate::hardware::HardwareRegistry;
use crate::rng::FixtureRng;
use crate::schema::{Column, Record, TableId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MaintenanceRecord {
    pub run_meter_id: String,
    pub run_term_id: String,
    pub reason_switch: &'static str,
    #[serde(with = "timestamp_serde")]
    pub reason_switch_time: NaiveDateTime,
    pub supply_org_no: String,
    #[serde(with = "timestamp_serde")]
    pub data_time: NaiveDateTime,
    #[serde(with = "timestamp_serde")]
    pub operation_time: NaiveDateTime,
    pub operation_content: &'static str,
    pub operation_staff: String,
    pub operation_describe: &'static str,
    pub reason_describe: &'static str,
    pub equ_sort_code: &'static str,
    pub equ_type_code: &'static str,
    pub equ_id: String,
    pub metering_point_number: String,
}

impl Record for MaintenanceRecord {
    const TABLE: TableId = TableId::MaintenanceLog;
    const COLUMNS: &'static [Column] = &[
        Column::new("RUN_METER_ID", "主键,运行电能表标识"),
        Column::new("RUN_TERM_ID", "运行终端标识"),
        Column::new("REASON_SWITCH", "切换原因"),
        Column::new("REASON_SWITCH_TIME", "切换原因时间"),
        Column::new("SUPPLY_ORG_NO", "供电单位编号"),
        Column::new("DATA_TIME", "数据时间"),
        Column::new("OPERATION_TIME", "操作时间"),
        Column::new("OPERATION_CONTENT", "操作内容"),
        Column::new("OPERATION_STAFF", "操作人员"),
        Column::new("OPERATION_DESCRIBE", "操作描述"),
        Column::new("REASON_DESCRIBE", "原因描述"),
        Column::new("EQU_SORT_CODE", "设备类别代码"),
        Column::new("EQU_TYPE_CODE", "设备类型代码"),
        Column::new("EQU_ID", "电能计量设备唯一标识"),
        Column::new("METERING_POINT_NUMBER", "计量点编号"),
    ];
}

/// Every meter gets 7 to 14 log entries at distinct timestamps.
pub fn maintenance_log(
    timeline: &Timeline,
    topology: &Topology,
    registry: &HardwareRegistry,
    rng: &mut FixtureRng,
) -> Vec<MaintenanceRecord> {
    let mut rows = Vec::new();
    for meter in topology.meters() {
        let entries = rng.int(7..=14) as usize;
        for &at in rng.sample(timeline.points(), entries) {
            let terminal = TerminalFields::resolve(topology, registry, meter, rng);
            rows.push(MaintenanceRecord {
                run_meter_id: meter.id.clone(),
                run_term_id: terminal.run_term_id,
                reason_switch: rng.pick(&["正常巡检", "故障检修", "设备更换", "参数调整"]),
                reason_switch_time: at,
                supply_org_no: meter.supply_org.clone(),
                data_time: at,
                operation_time: at,
                operation_content: rng.pick(&["抄表", "巡检", "维修", "更换", "校准"]),
                operation_staff: format!("运维人员{}", rng.int(1..=10)),
                operation_describe: rng.pick(&["设备运行正常", "发现轻微异常已处理", "更换配件", "参数调整完成"]),
                reason_describe: rng.pick(&["例行维护", "响应报警", "用户报修", "定期检查"]),
                equ_sort_code: "1",
                equ_type_code: "1",
                equ_id: meter.equ_id.clone(),
                metering_point_number: terminal.metering_point_number,
            });
        }
    }
    debug!(rows = rows.len(), "generated maintenance log");
    rows
}
