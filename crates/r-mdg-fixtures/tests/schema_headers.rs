//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "test"
//! ems_scope: "code"
//! ems_description: "Static column lists agree with serialized record layouts."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use chrono::{Duration, NaiveDate};
use r_mdg_common::Timeline;
use r_mdg_fixtures::derived::{
    CalculationAnomalyRecord, FailedReadingRecord, FaultRecord, MaintenanceRecord,
    MeterStatusAnomalyRecord, RiskRecord, TerminalStatusAnomalyRecord,
};
use r_mdg_fixtures::{
    AnomalyEvent, FixtureRng, FixtureSet, HardwareStatusRecord, MeterMasterRecord,
    PowerCurveRecord, Record, RunContext, TableId, TerminalMasterRecord, Topology,
    VoltageCurveRecord,
};

/// Header row csv derives from the serde layout of `rows[0]`.
fn serialized_header<R: Record>(rows: &[R]) -> Vec<String> {
    assert!(!rows.is_empty(), "{} produced no rows", R::TABLE.name());
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(&rows[0]).unwrap();
    let bytes = writer.into_inner().unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let first = text.lines().next().unwrap().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(first.as_bytes());
    let record = reader.records().next().unwrap().unwrap();
    record.iter().map(str::to_string).collect()
}

fn assert_layout<R: Record>(rows: &[R]) {
    let header = serialized_header(rows);
    assert_eq!(header, R::column_names(), "{}", R::TABLE.name());
    assert_eq!(R::column_names().len(), R::column_descriptions().len());
    assert!(R::column_descriptions().iter().all(|d| !d.is_empty()));
}

#[test]
fn every_table_serializes_in_column_order() {
    let start = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let timeline = Timeline::new(start, start + Duration::minutes(15 * (7 * 96 - 1)), 15).unwrap();
    let mut rng = FixtureRng::seeded(31);
    let mut fault_rng = FixtureRng::seeded(42);
    let topology = Topology::build(3, 4, &[], &mut rng);
    let ctx = RunContext::new(start, "440000", "0501");
    let set = FixtureSet::generate_with(ctx, timeline, topology, &mut rng, &mut fault_rng);

    for table in TableId::all() {
        match table {
            TableId::MeterMaster => assert_layout(&set.meter_master),
            TableId::TerminalMaster => assert_layout(&set.terminal_master),
            TableId::HardwareStatus => assert_layout(&set.hardware_status),
            TableId::FaultHistory => assert_layout(&set.fault_history),
            TableId::MaintenanceLog => assert_layout(&set.maintenance_log),
            TableId::DataAnomaly => assert_layout(&set.data_anomalies),
            TableId::RiskList => assert_layout(&set.risk_list),
            TableId::CalculationAnomaly => assert_layout(&set.calculation_anomalies),
            TableId::TerminalStatusAnomaly => assert_layout(&set.terminal_status_anomalies),
            TableId::MeterStatusAnomaly => assert_layout(&set.meter_status_anomalies),
            TableId::FailedReading => assert_layout(&set.failed_readings),
            TableId::PowerCurve => assert_layout(&set.power_curve),
            TableId::VoltageCurve => assert_layout(&set.voltage_curve),
        }
    }
}

#[test]
fn column_names_are_unique_per_table() {
    fn unique<R: Record>() {
        let mut names = R::column_names();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total, "{}", R::TABLE.name());
    }
    unique::<MeterMasterRecord>();
    unique::<TerminalMasterRecord>();
    unique::<HardwareStatusRecord>();
    unique::<FaultRecord>();
    unique::<MaintenanceRecord>();
    unique::<AnomalyEvent>();
    unique::<RiskRecord>();
    unique::<CalculationAnomalyRecord>();
    unique::<TerminalStatusAnomalyRecord>();
    unique::<MeterStatusAnomalyRecord>();
    unique::<FailedReadingRecord>();
    unique::<PowerCurveRecord>();
    unique::<VoltageCurveRecord>();
}
