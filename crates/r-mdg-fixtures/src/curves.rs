//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Power and voltage/current curves, one row per (timestamp, meter) in
//! time-major order.
//!
//! The two generators react to disjoint anomaly subsets: the power curve to
//! wiring faults, the voltage/current curve to measurement disturbances.
use chrono::NaiveDateTime;
use r_mdg_common::time::timestamp_serde;
use r_mdg_common::Timeline;
use serde::Serialize;
use tracing::debug;

use crate::context::RunContext;
use crate::distortion::{PhasePower, PowerSample};
use crate::entities::{MeterRole, Topology};
use crate::ledger::AnomalyLedger;
use crate::rng::{round_to, FixtureRng};
use crate::schema::{Column, Record, TableId};
use crate::taxonomy::{MeasurementDisturbance, WiringFault};

/// Per-row probability that a meter shows a wiring signature at a wiring-fault timestamp.
pub const WIRING_HIT_PROBABILITY: f64 = 0.3;
/// Per-row probability that a reading is disturbed at a disturbance timestamp.
pub const DISTURBANCE_HIT_PROBABILITY: f64 = 0.1;
/// Nominal phase voltage in volts.
pub const NOMINAL_VOLTAGE: f64 = 220.0;

const CURVE_DIGITS: i32 = 3;
const NEUTRAL_SHARE: f64 = 0.1;
const DATA_SOURCE_AUTO: &str = "1";
const SYSTEM_USER: &str = "SYSTEM";
const DATA_FROM_AUTO: &str = "AUTO_COLLECT";
const LOCK_VERSION: &str = "1";
const NOT_DELETED: &str = "1";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PowerCurveRecord {
    pub run_meter_id: String,
    #[serde(with = "timestamp_serde")]
    pub data_time: NaiveDateTime,
    pub tp_factor_a: f64,
    pub rpower_a: f64,
    pub power_a: f64,
    pub apower_a: f64,
    pub tp_factor_b: f64,
    pub rpower_b: f64,
    pub power_b: f64,
    pub apower_b: f64,
    pub tp_factor_c: f64,
    pub rpower_c: f64,
    pub power_c: f64,
    pub apower_c: f64,
    #[serde(with = "timestamp_serde")]
    pub load_time: NaiveDateTime,
    #[serde(with = "timestamp_serde")]
    pub preposition_time: NaiveDateTime,
    pub tp_factor: f64,
    pub rpower: f64,
    pub power: f64,
    pub apower: f64,
    pub data_source_code: &'static str,
    pub creator_id: &'static str,
    #[serde(with = "timestamp_serde")]
    pub create_time: NaiveDateTime,
    pub modifier_id: &'static str,
    #[serde(with = "timestamp_serde")]
    pub update_time: NaiveDateTime,
    pub data_from: &'static str,
    pub area_code: String,
    pub supply_org_no: String,
    pub optimistic_lock_version: &'static str,
    pub delete_flag: &'static str,
    /// Power base the row was scaled from.
    #[serde(skip)]
    pub power_base: f64,
    /// Wiring signature applied to this row, if any.
    #[serde(skip)]
    pub distortion: Option<WiringFault>,
}

impl Record for PowerCurveRecord {
    const TABLE: TableId = TableId::PowerCurve;
    const COLUMNS: &'static [Column] = &[
        Column::new("RUN_METER_ID", "主键。运行电能表的唯一标识"),
        Column::new("DATA_TIME", "主键。数据时间"),
        Column::new("TP_FACTOR_A", "A相功率因数"),
        Column::new("RPOWER_A", "A相无功功率"),
        Column::new("POWER_A", "A相有功功率"),
        Column::new("APOWER_A", "A相视在功率"),
        Column::new("TP_FACTOR_B", "B相功率因数"),
        Column::new("RPOWER_B", "B相无功功率"),
        Column::new("POWER_B", "B相有功功率"),
        Column::new("APOWER_B", "B相视在功率"),
        Column::new("TP_FACTOR_C", "C相功率因数"),
        Column::new("RPOWER_C", "C相无功功率"),
        Column::new("POWER_C", "C相有功功率"),
        Column::new("APOWER_C", "C相视在功率"),
        Column::new("LOAD_TIME", "数据入库时间"),
        Column::new("PREPOSITION_TIME", "安全接入区前置接收到报文数据的时间"),
        Column::new("TP_FACTOR", "总功率因数"),
        Column::new("RPOWER", "总无功功率"),
        Column::new("POWER", "总有功功率"),
        Column::new("APOWER", "总视在功率"),
        Column::new("DATA_SOURCE_CODE", "数据采集方式"),
        Column::new("CREATOR_ID", "记录数据创建人"),
        Column::new("CREATE_TIME", "创建时间"),
        Column::new("MODIFIER_ID", "修改人"),
        Column::new("UPDATE_TIME", "数据修改时间"),
        Column::new("DATA_FROM", "用于数据迁移标识"),
        Column::new("AREA_CODE", "区分分省数据"),
        Column::new("SUPPLY_ORG_NO", "区分地市局"),
        Column::new("OPTIMISTIC_LOCK_VERSION", "用于控制并发脏数据"),
        Column::new("DELETE_FLAG", "数据逻辑删除"),
    ];
}

impl PowerCurveRecord {
    /// Phase and aggregate values as a [`PowerSample`].
    pub fn sample(&self) -> PowerSample {
        let phase = |power_factor, active, reactive, apparent| PhasePower {
            power_factor,
            active,
            reactive,
            apparent,
        };
        PowerSample {
            base: self.power_base,
            phases: [
                phase(self.tp_factor_a, self.power_a, self.rpower_a, self.apower_a),
                phase(self.tp_factor_b, self.power_b, self.rpower_b, self.apower_b),
                phase(self.tp_factor_c, self.power_c, self.rpower_c, self.apower_c),
            ],
            total: phase(self.tp_factor, self.power, self.rpower, self.apower),
        }
    }
}

/// Power curve rows. At a timestamp carrying wiring-fault events each row is
/// hit with probability 30%, and a hit applies one of that timestamp's faults.
pub fn power_curve(
    timeline: &Timeline,
    topology: &Topology,
    ledger: &AnomalyLedger,
    ctx: &RunContext,
    rng: &mut FixtureRng,
) -> Vec<PowerCurveRecord> {
    let faults = ledger.grouped(|k| k.is_wiring());
    let mut rows = Vec::with_capacity(timeline.len() * topology.meter_count());
    let mut distorted = 0usize;
    for &at in timeline.points() {
        let active: Vec<WiringFault> = faults
            .get(&at)
            .map(|kinds| kinds.iter().filter_map(|k| k.wiring_fault()).collect())
            .unwrap_or_default();
        for meter in topology.meters() {
            let mut sample = PowerSample::baseline(meter.role, rng);
            let mut distortion = None;
            if !active.is_empty() && rng.chance(WIRING_HIT_PROBABILITY) {
                if let Some(&fault) = rng.choose(&active) {
                    fault.apply(&mut sample, rng);
                    distortion = Some(fault);
                    distorted += 1;
                }
            }
            let [a, b, c] = sample.phases;
            rows.push(PowerCurveRecord {
                run_meter_id: meter.id.clone(),
                data_time: at,
                tp_factor_a: a.power_factor,
                rpower_a: a.reactive,
                power_a: a.active,
                apower_a: a.apparent,
                tp_factor_b: b.power_factor,
                rpower_b: b.reactive,
                power_b: b.active,
                apower_b: b.apparent,
                tp_factor_c: c.power_factor,
                rpower_c: c.reactive,
                power_c: c.active,
                apower_c: c.apparent,
                load_time: ctx.generated_at,
                preposition_time: at,
                tp_factor: sample.total.power_factor,
                rpower: sample.total.reactive,
                power: sample.total.active,
                apower: sample.total.apparent,
                data_source_code: DATA_SOURCE_AUTO,
                creator_id: SYSTEM_USER,
                create_time: ctx.generated_at,
                modifier_id: SYSTEM_USER,
                update_time: ctx.generated_at,
                data_from: DATA_FROM_AUTO,
                area_code: ctx.area_code.clone(),
                supply_org_no: meter.supply_org.clone(),
                optimistic_lock_version: LOCK_VERSION,
                delete_flag: NOT_DELETED,
                power_base: sample.base,
                distortion,
            });
        }
    }
    debug!(rows = rows.len(), distorted, "generated power curve");
    rows
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct VoltageCurveRecord {
    pub run_meter_id: String,
    #[serde(with = "timestamp_serde")]
    pub data_time: NaiveDateTime,
    pub p_volt_a: f64,
    pub p_curr_a: f64,
    pub p_volt_b: f64,
    pub p_curr_b: f64,
    pub p_volt_c: f64,
    pub p_curr_c: f64,
    #[serde(with = "timestamp_serde")]
    pub load_time: NaiveDateTime,
    #[serde(with = "timestamp_serde")]
    pub preposition_time: NaiveDateTime,
    pub data_source_code: &'static str,
    pub zl_curr: f64,
    pub creator_id: &'static str,
    #[serde(with = "timestamp_serde")]
    pub create_time: NaiveDateTime,
    pub modifier_id: &'static str,
    #[serde(with = "timestamp_serde")]
    pub update_time: NaiveDateTime,
    pub data_from: &'static str,
    pub area_code: String,
    pub supply_org_no: String,
    pub optimistic_lock_version: &'static str,
    pub delete_flag: &'static str,
    #[serde(skip)]
    pub disturbance: Option<MeasurementDisturbance>,
}

impl Record for VoltageCurveRecord {
    const TABLE: TableId = TableId::VoltageCurve;
    const COLUMNS: &'static [Column] = &[
        Column::new("RUN_METER_ID", "主键。运行电能表的唯一标识"),
        Column::new("DATA_TIME", "主键。数据时间"),
        Column::new("P_VOLT_A", "A相电压"),
        Column::new("P_CURR_A", "A相电流"),
        Column::new("P_VOLT_B", "B相电压"),
        Column::new("P_CURR_B", "B相电流"),
        Column::new("P_VOLT_C", "C相电压"),
        Column::new("P_CURR_C", "C相电流"),
        Column::new("LOAD_TIME", "数据入库时间"),
        Column::new("PREPOSITION_TIME", "安全接入区前置接收到报文数据的时间"),
        Column::new("DATA_SOURCE_CODE", "数据采集方式"),
        Column::new("ZL_CURR", "零线电流"),
        Column::new("CREATOR_ID", "记录数据创建人"),
        Column::new("CREATE_TIME", "创建时间"),
        Column::new("MODIFIER_ID", "修改人"),
        Column::new("UPDATE_TIME", "数据修改时间"),
        Column::new("DATA_FROM", "用于数据迁移标识"),
        Column::new("AREA_CODE", "区分分省数据"),
        Column::new("SUPPLY_ORG_NO", "区分地市局"),
        Column::new("OPTIMISTIC_LOCK_VERSION", "用于控制并发脏数据"),
        Column::new("DELETE_FLAG", "数据逻辑删除"),
    ];
}

impl VoltageCurveRecord {
    pub fn voltages(&self) -> [f64; 3] {
        [self.p_volt_a, self.p_volt_b, self.p_volt_c]
    }

    pub fn currents(&self) -> [f64; 3] {
        [self.p_curr_a, self.p_curr_b, self.p_curr_c]
    }
}

struct PhaseReadings {
    volts: [f64; 3],
    amps: [f64; 3],
}

impl PhaseReadings {
    fn normal(role: MeterRole, rng: &mut FixtureRng) -> (Self, f64) {
        let current_base = if role.is_main() { rng.uniform(20.0, 100.0) } else { rng.uniform(1.0, 20.0) };
        let volts = [(); 3].map(|_| NOMINAL_VOLTAGE * rng.uniform(0.95, 1.05));
        let amps = [(); 3].map(|_| current_base * rng.uniform(0.30, 0.35));
        (Self { volts, amps }, current_base)
    }

    fn disturb(&mut self, disturbance: MeasurementDisturbance, current_base: f64, rng: &mut FixtureRng) {
        match disturbance {
            MeasurementDisturbance::ModuleDegraded => {
                self.volts = [(); 3].map(|_| NOMINAL_VOLTAGE * rng.uniform(0.90, 1.10));
                self.amps = [(); 3].map(|_| current_base * rng.uniform(0.25, 0.40));
            }
            MeasurementDisturbance::SupplyUnstable => {
                self.volts = [(); 3].map(|_| NOMINAL_VOLTAGE * rng.uniform(0.85, 1.15));
            }
        }
    }

    fn neutral(&self) -> f64 {
        self.amps.iter().sum::<f64>().abs() * NEUTRAL_SHARE
    }
}

/// Voltage/current curve rows. Only kinds carrying a measurement disturbance
/// can perturb a reading; wiring faults never do.
pub fn voltage_curve(
    timeline: &Timeline,
    topology: &Topology,
    ledger: &AnomalyLedger,
    ctx: &RunContext,
    rng: &mut FixtureRng,
) -> Vec<VoltageCurveRecord> {
    let disturbances = ledger.grouped(|k| k.measurement_disturbance().is_some());
    let mut rows = Vec::with_capacity(timeline.len() * topology.meter_count());
    let mut disturbed = 0usize;
    for &at in timeline.points() {
        let active: Vec<MeasurementDisturbance> = disturbances
            .get(&at)
            .map(|kinds| kinds.iter().filter_map(|k| k.measurement_disturbance()).collect())
            .unwrap_or_default();
        for meter in topology.meters() {
            let (mut readings, current_base) = PhaseReadings::normal(meter.role, rng);
            let mut disturbance = None;
            if !active.is_empty() && rng.chance(DISTURBANCE_HIT_PROBABILITY) {
                if let Some(&kind) = rng.choose(&active) {
                    readings.disturb(kind, current_base, rng);
                    disturbance = Some(kind);
                    disturbed += 1;
                }
            }
            let zl_curr = round_to(readings.neutral(), CURVE_DIGITS);
            let [va, vb, vc] = readings.volts.map(|v| round_to(v, CURVE_DIGITS));
            let [ia, ib, ic] = readings.amps.map(|i| round_to(i, CURVE_DIGITS));
            rows.push(VoltageCurveRecord {
                run_meter_id: meter.id.clone(),
                data_time: at,
                p_volt_a: va,
                p_curr_a: ia,
                p_volt_b: vb,
                p_curr_b: ib,
                p_volt_c: vc,
                p_curr_c: ic,
                load_time: ctx.generated_at,
                preposition_time: at,
                data_source_code: DATA_SOURCE_AUTO,
                zl_curr,
                creator_id: SYSTEM_USER,
                create_time: ctx.generated_at,
                modifier_id: SYSTEM_USER,
                update_time: ctx.generated_at,
                data_from: DATA_FROM_AUTO,
                area_code: ctx.area_code.clone(),
                supply_org_no: meter.supply_org.clone(),
                optimistic_lock_version: LOCK_VERSION,
                delete_flag: NOT_DELETED,
                disturbance,
            });
        }
    }
    debug!(rows = rows.len(), disturbed, "generated voltage/current curve");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distortion::NORMAL_POWER_FACTOR;
    use crate::ledger::{AffectedTable, AnomalyEvent, TableLayer};
    use crate::taxonomy::AnomalyKind;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn timeline() -> Timeline {
        Timeline::new(start(), start() + chrono::Duration::minutes(15 * 95), 15).unwrap()
    }

    fn flood(timeline: &Timeline, kind: AnomalyKind) -> AnomalyLedger {
        AnomalyLedger::from_events(
            timeline
                .points()
                .iter()
                .map(|&at| AnomalyEvent {
                    data_time: at,
                    supply_org_no: "0501".into(),
                    kind,
                    tables: TableLayer::Source,
                    tables_english_name: AffectedTable::PowerCurve.english_name(),
                    tables_chinese_name: AffectedTable::PowerCurve.chinese_name(),
                    number_of: 1,
                })
                .collect(),
        )
    }

    #[test]
    fn rows_are_time_major() {
        let timeline = timeline();
        let mut rng = FixtureRng::seeded(3);
        let topology = Topology::build(2, 2, &[], &mut rng);
        let ctx = RunContext::new(start(), "440000", "0501");
        let rows = power_curve(&timeline, &topology, &AnomalyLedger::default(), &ctx, &mut rng);
        assert_eq!(rows.len(), 96 * 6);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.data_time, timeline.points()[i / 6]);
            assert_eq!(row.run_meter_id, topology.meters()[i % 6].id);
        }
    }

    #[test]
    fn clean_window_keeps_normal_power_factors() {
        let timeline = timeline();
        let mut rng = FixtureRng::seeded(6);
        let topology = Topology::build(1, 5, &[], &mut rng);
        let ctx = RunContext::new(start(), "440000", "0501");
        let ledger = flood(&timeline, AnomalyKind::MeterBodyFault);
        for row in power_curve(&timeline, &topology, &ledger, &ctx, &mut rng) {
            assert!(row.distortion.is_none());
            let sample = row.sample();
            for phase in &sample.phases {
                assert!(NORMAL_POWER_FACTOR.contains(&phase.power_factor));
            }
            assert!((row.power - row.power_base).abs() < 1e-3);
        }
    }

    #[test]
    fn three_phase_reversal_rows_run_backwards() {
        let timeline = timeline();
        let mut rng = FixtureRng::seeded(10);
        let topology = Topology::build(1, 5, &[], &mut rng);
        let ctx = RunContext::new(start(), "440000", "0501");
        let ledger = flood(&timeline, AnomalyKind::ThreePhaseCurrentReversed);
        let rows = power_curve(&timeline, &topology, &ledger, &ctx, &mut rng);
        let hit: Vec<_> = rows.iter().filter(|r| r.distortion.is_some()).collect();
        // 576 draws at p = 0.3
        assert!(hit.len() > 100 && hit.len() < 250, "got {}", hit.len());
        for row in hit {
            assert_eq!(row.distortion, Some(WiringFault::ThreePhaseReversal));
            assert!(row.power_a <= 0.0 && row.power_b <= 0.0 && row.power_c <= 0.0);
            assert!(row.tp_factor <= 0.0);
        }
    }

    #[test]
    fn wiring_faults_never_touch_voltage() {
        let timeline = timeline();
        let mut rng = FixtureRng::seeded(14);
        let topology = Topology::build(1, 5, &[], &mut rng);
        let ctx = RunContext::new(start(), "440000", "0501");
        let ledger = flood(&timeline, AnomalyKind::MixedWiring);
        let rows = voltage_curve(&timeline, &topology, &ledger, &ctx, &mut rng);
        assert_eq!(rows.len(), 576);
        for row in &rows {
            assert!(row.disturbance.is_none());
            for v in row.voltages() {
                assert!((0.95 * NOMINAL_VOLTAGE - 1e-3..=1.05 * NOMINAL_VOLTAGE + 1e-3).contains(&v));
            }
            assert!(row.currents().iter().all(|&i| i >= 0.0));
        }
    }

    #[test]
    fn disturbances_stay_within_physical_bounds() {
        let timeline = timeline();
        let mut rng = FixtureRng::seeded(15);
        let topology = Topology::build(1, 5, &[], &mut rng);
        let ctx = RunContext::new(start(), "440000", "0501");
        for kind in [AnomalyKind::ConcentratorPowerFault, AnomalyKind::MeterModuleFault] {
            let ledger = flood(&timeline, kind);
            let rows = voltage_curve(&timeline, &topology, &ledger, &ctx, &mut rng);
            assert!(rows.iter().any(|r| r.disturbance == kind.measurement_disturbance()));
            for row in &rows {
                for v in row.voltages() {
                    assert!((0.85 * NOMINAL_VOLTAGE - 1e-3..=1.15 * NOMINAL_VOLTAGE + 1e-3).contains(&v));
                }
                assert!(row.currents().iter().all(|&i| i >= 0.0));
                let neutral = row.currents().iter().sum::<f64>() * NEUTRAL_SHARE;
                assert!((row.zl_curr - neutral).abs() < 1e-2);
            }
        }
    }
}
