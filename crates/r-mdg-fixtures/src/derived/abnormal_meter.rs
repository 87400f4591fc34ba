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

use super::{customer_type, user_id, user_name};
use crate::entities::Topology;
use crate::ledger::AnomalyLedger;
use crate::rng::FixtureRng;
use crate::schema::{Column, Record, TableId};
use crate::taxonomy::AnomalyKind;

/// Upper bound of meters flagged per anomaly timestamp.
pub const MAX_METERS_PER_TIMESTAMP: u64 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct MeterStatusAnomalyRecord {
    #[serde(rename = "SUPPLY_ORG_NO")]
    pub supply_org_no: String,
    pub energy_meter_identification: String,
    pub asset_code_meter: String,
    #[serde(rename = "EXCEPTION_TYPE")]
    pub exception_type: AnomalyKind,
    pub running_state: &'static str,
    pub measurement_point_number: String,
    pub user_id: String,
    pub customer_type: &'static str,
    pub user_address: String,
    #[serde(with = "timestamp_serde")]
    pub abnormal_date: NaiveDateTime,
    pub user_name: String,
}

impl Record for MeterStatusAnomalyRecord {
    const TABLE: TableId = TableId::MeterStatusAnomaly;
    const COLUMNS: &'static [Column] = &[
        Column::new("SUPPLY_ORG_NO", "供电单位"),
        Column::new("energy_meter_identification", "运行电能表标识"),
        Column::new("asset_code_meter", "电能表资产编码"),
        Column::new("EXCEPTION_TYPE", "异常类型"),
        Column::new("running_state", "运行状态"),
        Column::new("measurement_point_number", "计量点编号"),
        Column::new("user_id", "用户编号"),
        Column::new("customer_type", "用户类型"),
        Column::new("user_address", "用户地址"),
        Column::new("abnormal_date", "异常日期"),
        Column::new("user_name", "用户名称"),
    ];
}

/// Meter-level anomalies. Every anomaly class qualifies; for each timestamp
/// carrying events, `min(U{1..5}, meters)` distinct meters are flagged with
/// one of that timestamp's kinds.
pub fn meter_status_anomalies(
    ledger: &AnomalyLedger,
    topology: &Topology,
    rng: &mut FixtureRng,
) -> Vec<MeterStatusAnomalyRecord> {
    let mut rows = Vec::new();
    for (at, kinds) in ledger.grouped(|_| true) {
        let wanted = rng.int(1..=MAX_METERS_PER_TIMESTAMP) as usize;
        for meter in rng.sample(topology.meters(), wanted) {
            let Some(&kind) = rng.choose(&kinds) else {
                continue;
            };
            rows.push(MeterStatusAnomalyRecord {
                supply_org_no: meter.supply_org.clone(),
                energy_meter_identification: meter.id.clone(),
                asset_code_meter: meter.assets_no.clone(),
                exception_type: kind,
                running_state: rng.pick(&["运行", "异常", "停运"]),
                measurement_point_number: rng.tagged("MP", 100_000..=999_999),
                user_id: user_id(rng),
                customer_type: customer_type(rng),
                user_address: meter.install_position(),
                abnormal_date: at,
                user_name: user_name(rng),
            });
        }
    }
    debug!(rows = rows.len(), "generated meter status anomalies");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AffectedTable, AnomalyEvent, TableLayer};
    use chrono::NaiveDate;

    fn event(minute: u32, kind: AnomalyKind) -> AnomalyEvent {
        AnomalyEvent {
            data_time: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap().and_hms_opt(0, minute, 0).unwrap(),
            supply_org_no: "0501".into(),
            kind,
            tables: TableLayer::Business,
            tables_english_name: AffectedTable::AbnormalMeter.english_name(),
            tables_chinese_name: AffectedTable::AbnormalMeter.chinese_name(),
            number_of: 3,
        }
    }

    #[test]
    fn rows_reference_real_meters_and_ledger_kinds() {
        let mut rng = FixtureRng::seeded(13);
        let topology = Topology::build(2, 4, &[], &mut rng);
        let ledger = AnomalyLedger::from_events(vec![
            event(0, AnomalyKind::MeteringInaccuracy),
            event(0, AnomalyKind::CurrentPhaseMismatch),
            event(15, AnomalyKind::SimCardFault),
        ]);
        let rows = meter_status_anomalies(&ledger, &topology, &mut rng);
        assert!(!rows.is_empty());
        for row in &rows {
            let meter = topology.meter(&row.energy_meter_identification).unwrap();
            assert_eq!(row.asset_code_meter, meter.assets_no);
            assert_eq!(row.supply_org_no, meter.supply_org);
            assert_eq!(row.user_address, meter.install_position());
            let expected: Vec<AnomalyKind> = ledger
                .events()
                .iter()
                .filter(|e| e.data_time == row.abnormal_date)
                .map(|e| e.kind)
                .collect();
            assert!(expected.contains(&row.exception_type));
        }
        for minute in [0, 15] {
            let n = rows.iter().filter(|r| r.abnormal_date.format("%M").to_string() == format!("{:02}", minute)).count();
            assert!((1..=MAX_METERS_PER_TIMESTAMP as usize).contains(&n));
        }
    }

    #[test]
    fn sample_is_clamped_to_available_meters() {
        let mut rng = FixtureRng::seeded(2);
        let topology = Topology::build(1, 0, &[], &mut rng);
        let ledger = AnomalyLedger::from_events((0..10).map(|_| event(0, AnomalyKind::MixedWiring)).collect());
        let rows = meter_status_anomalies(&ledger, &topology, &mut rng);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn empty_ledger_yields_no_rows() {
        let mut rng = FixtureRng::seeded(2);
        let topology = Topology::build(1, 3, &[], &mut rng);
        assert!(meter_status_anomalies(&AnomalyLedger::default(), &topology, &mut rng).is_empty());
    }
}
