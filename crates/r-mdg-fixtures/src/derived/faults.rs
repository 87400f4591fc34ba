//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Historical fault list. Runs on its own seeded stream so its rows are
//! reproducible regardless of what the other generators drew.
use chrono::{Duration, NaiveDateTime};
use r_mdg_common::time::timestamp_serde;
use r_mdg_common::Timeline;
use serde::Serialize;
use tracing::debug;

use super::{user_id, user_name, TerminalFields};
use crate::context::RunContext;
use crate::entities::{Meter, Topology};
use crate::grade::RiskGrade;
use crate::hardware::HardwareRegistry;
use crate::rng::FixtureRng;
use crate::schema::{Column, Record, TableId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FaultRecord {
    #[serde(with = "timestamp_serde")]
    pub data_time: NaiveDateTime,
    pub supply_org_no: String,
    #[serde(with = "timestamp_serde")]
    pub load_time: NaiveDateTime,
    pub creator_id: String,
    #[serde(with = "timestamp_serde")]
    pub create_time: NaiveDateTime,
    pub modifier_id: String,
    #[serde(with = "timestamp_serde")]
    pub update_time: NaiveDateTime,
    pub data_from: &'static str,
    pub area_code: String,
    pub terminal_id: String,
    pub run_term_id: String,
    pub comm_addr: String,
    pub reason_switch: &'static str,
    pub manufacturer_name: &'static str,
    #[serde(with = "timestamp_serde")]
    pub reason_switch_time: NaiveDateTime,
    pub the_box_rust: &'static str,
    pub the_door_rust: &'static str,
    pub the_door_lock: &'static str,
    pub door_lock_damaged: &'static str,
    pub the_incoming_damaged: &'static str,
    pub the_incoming_burn: &'static str,
    pub terminal_block_damaged: &'static str,
    pub terminal_block_burn: &'static str,
    pub wire_burn: &'static str,
    pub damage_insulation: &'static str,
    pub connector_oxidation: &'static str,
    pub connector_damage: &'static str,
    pub salt_mist: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub run_meter_id: String,
    pub electricity_id: String,
    pub terminal_status: &'static str,
    pub word_order_id: String,
    pub word_order_category: &'static str,
    pub devops_state: &'static str,
    pub devops_scheme: &'static str,
    pub metering_point_state: &'static str,
    pub risk_type: &'static str,
    pub risk_grade: RiskGrade,
    /// Risk score behind `risk_grade`, two decimals.
    pub risk_factor: f64,
    #[serde(rename = "equ_type")]
    pub equ_type: &'static str,
    #[serde(rename = "terminal_type")]
    pub terminal_type: &'static str,
    #[serde(rename = "batch_to_which_it_belongs")]
    pub batch_to_which_it_belongs: String,
    #[serde(rename = "communication_model")]
    pub communication_model: &'static str,
    #[serde(rename = "connection_method")]
    pub connection_method: &'static str,
    #[serde(rename = "protocol_type")]
    pub protocol_type: &'static str,
    #[serde(rename = "measurement_point_number")]
    pub measurement_point_number: String,
    #[serde(rename = "measurement_point_category")]
    pub measurement_point_category: &'static str,
    #[serde(rename = "measurement_point_capacity")]
    pub measurement_point_capacity: f64,
    #[serde(rename = "wiring_method")]
    pub wiring_method: &'static str,
    #[serde(rename = "user_id")]
    pub user_id: String,
    #[serde(rename = "user_name")]
    pub user_name: String,
    #[serde(rename = "user_class")]
    pub user_class: &'static str,
    #[serde(rename = "user_address")]
    pub user_address: String,
    #[serde(rename = "running_state")]
    pub running_state: &'static str,
    #[serde(rename = "install_date", with = "timestamp_serde")]
    pub install_date: NaiveDateTime,
    #[serde(rename = "nominal_voltage")]
    pub nominal_voltage: Option<f64>,
    #[serde(rename = "rated_current")]
    pub rated_current: Option<f64>,
}

impl FaultRecord {
    /// The twelve physical-damage indicators in column order.
    pub fn damage_flags(&self) -> [&'static str; 12] {
        [
            self.the_box_rust,
            self.the_door_rust,
            self.the_door_lock,
            self.door_lock_damaged,
            self.the_incoming_damaged,
            self.the_incoming_burn,
            self.terminal_block_damaged,
            self.terminal_block_burn,
            self.wire_burn,
            self.damage_insulation,
            self.connector_oxidation,
            self.connector_damage,
        ]
    }
}

impl Record for FaultRecord {
    const TABLE: TableId = TableId::FaultHistory;
    const COLUMNS: &'static [Column] = &[
        Column::new("DATA_TIME", "数据时间"),
        Column::new("SUPPLY_ORG_NO", "供电单位编码"),
        Column::new("LOAD_TIME", "入库时间"),
        Column::new("CREATOR_ID", "创建人ID"),
        Column::new("CREATE_TIME", "创建时间"),
        Column::new("MODIFIER_ID", "修改人ID"),
        Column::new("UPDATE_TIME", "更新时间"),
        Column::new("DATA_FROM", "数据来源"),
        Column::new("AREA_CODE", "地区编码"),
        Column::new("TERMINAL_ID", "终端资产编码"),
        Column::new("RUN_TERM_ID", "终端标识"),
        Column::new("COMM_ADDR", "终端逻辑地址"),
        Column::new("REASON_SWITCH", "换表原因"),
        Column::new("MANUFACTURER_NAME", "生产厂家"),
        Column::new("REASON_SWITCH_TIME", "换表日期"),
        Column::new("THE_BOX_RUST", "箱体锈蚀腐烂"),
        Column::new("THE_DOOR_RUST", "箱门锈蚀腐烂"),
        Column::new("THE_DOOR_LOCK", "门锁无法打开"),
        Column::new("DOOR_LOCK_DAMAGED", "门锁损坏"),
        Column::new("THE_INCOMING_DAMAGED", "进出线开关破损"),
        Column::new("THE_INCOMING_BURN", "进出线开关烧毁"),
        Column::new("TERMINAL_BLOCK_DAMAGED", "接线端子损坏"),
        Column::new("TERMINAL_BLOCK_BURN", "接线端子烧毁"),
        Column::new("WIRE_BURN", "导线烧毁"),
        Column::new("DAMAGE_INSULATION", "导线绝缘破损"),
        Column::new("CONNECTOR_OXIDATION", "接插件氧化"),
        Column::new("CONNECTOR_DAMAGE", "接插件损坏"),
        Column::new("SALT_MIST", "盐雾"),
        Column::new("TEMPERATURE", "温度"),
        Column::new("HUMIDITY", "湿度"),
        Column::new("RUN_METER_ID", "运行电表标识"),
        Column::new("ELECTRICITY_ID", "电表资产编码"),
        Column::new("TERMINAL_STATUS", "终端运行状态"),
        Column::new("WORD_ORDER_ID", "工单编号"),
        Column::new("WORD_ORDER_CATEGORY", "工单类别"),
        Column::new("DEVOPS_STATE", "运维状态"),
        Column::new("DEVOPS_SCHEME", "运维方案"),
        Column::new("METERING_POINT_STATE", "计量点运行状态"),
        Column::new("RISK_TYPE", "风险类型"),
        Column::new("RISK_GRADE", "风险等级"),
        Column::new("RISK_FACTOR", "风险因子"),
        Column::new("equ_type", "设备类型"),
        Column::new("terminal_type", "终端类型"),
        Column::new("batch_to_which_it_belongs", "所属批次"),
        Column::new("communication_model", "通信方式"),
        Column::new("connection_method", "接线方式"),
        Column::new("protocol_type", "规约类型"),
        Column::new("measurement_point_number", "计量点编号"),
        Column::new("measurement_point_category", "计量点类别"),
        Column::new("measurement_point_capacity", "计量点容量"),
        Column::new("wiring_method", "计量点接线方式"),
        Column::new("user_id", "用户编号"),
        Column::new("user_name", "用户名称"),
        Column::new("user_class", "用户类别"),
        Column::new("user_address", "用户地址"),
        Column::new("running_state", "电能表运行状态"),
        Column::new("install_date", "安装日期"),
        Column::new("nominal_voltage", "额定电压"),
        Column::new("rated_current", "额定电流"),
    ];
}

/// Share of meters with a fault history, as a divisor.
const FAULTY_METER_DIVISOR: usize = 5;

/// Sample `max(1, meters / 5)` meters and give each 1 to 3 fault rows at
/// distinct timestamps. `rng` should be the dedicated fault stream.
pub fn fault_history(
    timeline: &Timeline,
    topology: &Topology,
    registry: &HardwareRegistry,
    ctx: &RunContext,
    rng: &mut FixtureRng,
) -> Vec<FaultRecord> {
    let mut rows = Vec::new();
    let wanted = (topology.meter_count() / FAULTY_METER_DIVISOR).max(1);
    for meter in rng.sample(topology.meters(), wanted) {
        let faults = rng.int(1..=3) as usize;
        for &at in rng.sample(timeline.points(), faults) {
            let terminal = TerminalFields::resolve(topology, registry, meter, rng);
            rows.push(fault_row(meter, at, terminal, ctx, rng));
        }
    }
    debug!(rows = rows.len(), meters = wanted, "generated fault history");
    rows
}

fn fault_row(meter: &Meter, at: NaiveDateTime, terminal: TerminalFields, ctx: &RunContext, rng: &mut FixtureRng) -> FaultRecord {
    let score = rng.uniform_rounded(0.0, 1.0, 2);
    FaultRecord {
        data_time: at,
        supply_org_no: meter.supply_org.clone(),
        load_time: ctx.generated_at,
        creator_id: rng.id("USER"),
        create_time: ctx.days_ago(rng.int(1..=30)),
        modifier_id: rng.id("USER"),
        update_time: ctx.generated_at,
        data_from: "1",
        area_code: ctx.area_code.clone(),
        terminal_id: terminal.assets_no,
        run_term_id: terminal.run_term_id,
        comm_addr: terminal.comm_addr,
        reason_switch: rng.pick(&["设备故障", "通信故障", "计量异常", "参数错误", "定期轮换", "现场烧毁"]),
        manufacturer_name: terminal.manufacturer,
        reason_switch_time: at,
        the_box_rust: rng.flag(),
        the_door_rust: rng.flag(),
        the_door_lock: rng.flag(),
        door_lock_damaged: rng.flag(),
        the_incoming_damaged: rng.flag(),
        the_incoming_burn: rng.flag(),
        terminal_block_damaged: rng.flag(),
        terminal_block_burn: rng.flag(),
        wire_burn: rng.flag(),
        damage_insulation: rng.flag(),
        connector_oxidation: rng.flag(),
        connector_damage: rng.flag(),
        salt_mist: rng.uniform_rounded(0.0, 100.0, 2),
        temperature: rng.uniform_rounded(15.0, 40.0, 2),
        humidity: rng.uniform_rounded(30.0, 90.0, 2),
        run_meter_id: meter.id.clone(),
        electricity_id: rng.id("ELEC"),
        terminal_status: rng.pick(&["1", "2", "3"]),
        word_order_id: rng.id("WO"),
        word_order_category: rng.pick(&["故障处理", "设备更换", "例行维护", "应急抢修"]),
        devops_state: rng.pick(&["待处理", "处理中", "已完成", "已关闭"]),
        devops_scheme: rng.pick(&["现场检修", "更换设备", "软件升级", "参数调整"]),
        metering_point_state: rng.pick(&["正常", "异常", "停运"]),
        risk_type: rng.pick(&["设备故障", "通信故障", "数据异常", "环境因素"]),
        risk_grade: RiskGrade::from_score(score),
        risk_factor: score,
        equ_type: rng.pick(&["集中器", "采集器", "专变终端", "配变终端"]),
        terminal_type: rng.pick(&["I型", "II型", "III型"]),
        batch_to_which_it_belongs: format!("BATCH{}{:02}", rng.int(2020..=2024), rng.int(1..=12)),
        communication_model: rng.pick(&["GPRS", "4G", "光纤", "RS485", "载波"]),
        connection_method: rng.pick(&["直接接入", "经互感器接入"]),
        protocol_type: "DL/T645-2007",
        measurement_point_number: terminal.metering_point_number,
        measurement_point_category: rng.pick(&["居民", "一般工商业", "大工业", "农业"]),
        measurement_point_capacity: rng.uniform_rounded(5.0, 1000.0, 2),
        wiring_method: rng.pick(&["三相四线", "三相三线", "单相"]),
        user_id: user_id(rng),
        user_name: user_name(rng),
        user_class: rng.pick(&["居民", "工商业", "大工业", "农业", "临时"]),
        user_address: format!("测试地址{}号", rng.int(1..=999)),
        running_state: rng.pick(&["运行", "异常", "停运", "待送电"]),
        install_date: at - Duration::days(rng.int(365..=2000) as i64),
        nominal_voltage: None,
        rated_current: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::hardware_status;
    use chrono::NaiveDate;

    fn fixture() -> (Timeline, Topology, HardwareRegistry, RunContext) {
        let start = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap().and_hms_opt(23, 45, 0).unwrap();
        let timeline = Timeline::new(start, end, 15).unwrap();
        let mut rng = FixtureRng::seeded(100);
        let topology = Topology::build(2, 9, &[], &mut rng);
        let registry = HardwareRegistry::from_records(&hardware_status(&topology, &mut rng));
        (timeline, topology, registry, RunContext::new(end, "440000", "0501"))
    }

    #[test]
    fn rows_copy_the_district_terminal() {
        let (timeline, topology, registry, ctx) = fixture();
        let rows = fault_history(&timeline, &topology, &registry, &ctx, &mut FixtureRng::seeded(42));
        assert!(!rows.is_empty());
        for row in &rows {
            let meter = topology.meter(&row.run_meter_id).unwrap();
            let terminal = topology.terminal_for(&meter.district).unwrap();
            assert_eq!(row.run_term_id, terminal.run_term_id);
            assert_eq!(row.terminal_id, terminal.assets_no);
            assert_eq!(row.comm_addr, terminal.comm_addr);
            assert_eq!(row.measurement_point_number, terminal.metering_point_number);
            assert_eq!(row.manufacturer_name, terminal.manufacturer);
            assert_eq!(row.risk_grade, RiskGrade::from_score(row.risk_factor));
            assert!(row.damage_flags().iter().all(|f| *f == "0" || *f == "1"));
            assert!(row.install_date < row.data_time);
        }
    }

    #[test]
    fn meter_sample_and_fault_counts_are_bounded() {
        let (timeline, topology, registry, ctx) = fixture();
        let rows = fault_history(&timeline, &topology, &registry, &ctx, &mut FixtureRng::seeded(7));
        let mut meters: Vec<&str> = rows.iter().map(|r| r.run_meter_id.as_str()).collect();
        meters.sort_unstable();
        meters.dedup();
        assert_eq!(meters.len(), topology.meter_count() / FAULTY_METER_DIVISOR);
        for id in meters {
            let n = rows.iter().filter(|r| r.run_meter_id == id).count();
            assert!((1..=3).contains(&n));
        }
    }

    #[test]
    fn same_seed_reproduces_rows() {
        let (timeline, topology, registry, ctx) = fixture();
        let a = fault_history(&timeline, &topology, &registry, &ctx, &mut FixtureRng::seeded(42));
        let b = fault_history(&timeline, &topology, &registry, &ctx, &mut FixtureRng::seeded(42));
        let encode = |rows: &[FaultRecord]| serde_json::to_string(rows).unwrap();
        assert_eq!(encode(&a), encode(&b));
    }
}
