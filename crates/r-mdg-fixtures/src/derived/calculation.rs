//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::{NaiveDate, NaiveDateTime};
use r_mdg_common::time::timestamp_serde;
use r_mdg_common::Timeline;
use serde::Serialize;
use tracing::debug;

use crate::context::RunContext;
use crate::rng::FixtureRng;
use crate::schema::{Column, Record, TableId};

/// Per-timestamp probability of a calculation task failure.
pub const FAILURE_PROBABILITY: f64 = 0.1;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CalculationAnomalyRecord {
    #[serde(with = "timestamp_serde")]
    pub data_time: NaiveDateTime,
    pub supply_org_no: String,
    pub running_state: &'static str,
    #[serde(rename = "CALCULATIN_TASK_NAME")]
    pub task_name: &'static str,
    #[serde(rename = "CALCULATIN_ID")]
    pub task_id: String,
    pub abnormal_time: NaiveDate,
    pub abnormal_cause: &'static str,
    /// Hours, accumulated per day.
    #[serde(rename = "CALCULATIN_TIME")]
    pub duration_hours: f64,
}

impl Record for CalculationAnomalyRecord {
    const TABLE: TableId = TableId::CalculationAnomaly;
    const COLUMNS: &'static [Column] = &[
        Column::new("DATA_TIME", "主键,数据时间"),
        Column::new("SUPPLY_ORG_NO", "主键,供电单位编码"),
        Column::new("RUNNING_STATE", "运行状态"),
        Column::new("CALCULATIN_TASK_NAME", "计算任务名称"),
        Column::new("CALCULATIN_ID", "计算任务ID"),
        Column::new("ABNORMAL_TIME", "异常时间"),
        Column::new("ABNORMAL_CAUSE", "异常原因"),
        Column::new("CALCULATIN_TIME", "计算时长(按天累计)(H)"),
    ];
}

pub fn calculation_anomalies(timeline: &Timeline, ctx: &RunContext, rng: &mut FixtureRng) -> Vec<CalculationAnomalyRecord> {
    let mut rows = Vec::new();
    for &at in timeline.points() {
        if !rng.chance(FAILURE_PROBABILITY) {
            continue;
        }
        rows.push(CalculationAnomalyRecord {
            data_time: at,
            supply_org_no: ctx.default_supply_org.clone(),
            running_state: rng.pick(&["运行中", "异常", "停止"]),
            task_name: rng.pick(&["线损计算", "负荷预测", "电量统计", "三相不平衡计算"]),
            task_id: rng.id("CALC"),
            abnormal_time: at.date(),
            abnormal_cause: rng.pick(&["数据缺失", "算法超时", "内存溢出", "参数错误"]),
            duration_hours: rng.uniform_rounded(0.1, 24.0, 2),
        });
    }
    debug!(rows = rows.len(), "generated calculation anomalies");
    rows
}
