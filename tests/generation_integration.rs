//! ---
//! ems_section: "15-testing-qa-runbook"
//! ems_subsection: "integration-tests"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "End-to-end fixture generation and export checks."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use r_mdg_common::AppConfig;
use r_mdg_fixtures::{FixtureSet, RunManifest, TableId, MANIFEST_FILE, UTF8_BOM};

const ONE_DAY: &str = r#"
[generation]
start = "2025-09-01 00:00:00"
end = "2025-09-01 23:45:00"
interval_minutes = 15
districts = 1
sub_meters_per_district = 5
seed = 20250901
"#;

struct Table {
    names: Vec<String>,
    descriptions: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn column(&self, name: &str) -> Vec<&str> {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("missing column {name}"));
        self.rows.iter().map(|r| r[idx].as_str()).collect()
    }
}

fn read_table(dir: &Path, table: TableId) -> Table {
    let bytes = fs::read(dir.join(table.file_name()))
        .unwrap_or_else(|err| panic!("failed to read {}: {}", table.file_name(), err));
    assert!(
        bytes.starts_with(UTF8_BOM),
        "{} must start with a UTF-8 byte-order mark",
        table.file_name()
    );
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(&bytes[UTF8_BOM.len()..]);
    let mut records = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect::<Vec<_>>());
    let names = records.next().expect("column name row");
    let descriptions = records.next().expect("description row");
    Table {
        names,
        descriptions,
        rows: records.collect(),
    }
}

fn generate_into(dir: &Path) -> (FixtureSet, RunManifest) {
    let config: AppConfig = ONE_DAY.parse().unwrap();
    let generated_at = NaiveDate::from_ymd_opt(2025, 9, 8)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap();
    let set = FixtureSet::generate(
        &config.generation,
        config.generation.timeline().unwrap(),
        generated_at,
    );
    let manifest = set.write_all(dir).unwrap();
    (set, manifest)
}

#[test]
fn one_day_one_district_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let (_, manifest) = generate_into(dir.path());

    assert_eq!(manifest.timestamps, 96);
    assert_eq!(read_table(dir.path(), TableId::MeterMaster).rows.len(), 6);
    assert_eq!(read_table(dir.path(), TableId::TerminalMaster).rows.len(), 1);
    assert_eq!(read_table(dir.path(), TableId::PowerCurve).rows.len(), 576);
    assert_eq!(read_table(dir.path(), TableId::VoltageCurve).rows.len(), 576);
}

#[test]
fn every_file_has_the_three_row_header_layout() {
    let dir = tempfile::tempdir().unwrap();
    let (_, manifest) = generate_into(dir.path());

    assert_eq!(manifest.tables.len(), 13);
    for summary in &manifest.tables {
        let table = read_table(dir.path(), summary.table);
        assert_eq!(table.names.len(), table.descriptions.len(), "{}", summary.file);
        assert!(table.descriptions.iter().all(|d| !d.is_empty()));
        assert_ne!(table.names, table.descriptions);
        assert_eq!(table.rows.len(), summary.rows, "{}", summary.file);
        assert!(table.rows.iter().all(|r| r.len() == table.names.len()));
    }

    let raw = fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["generated_at"], "2025-09-08 08:30:00");
    assert_eq!(json["start"], "2025-09-01 00:00:00");
    assert_eq!(json["end"], "2025-09-01 23:45:00");
}

#[test]
fn written_tables_join_on_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    generate_into(dir.path());

    let meters = read_table(dir.path(), TableId::MeterMaster);
    let meter_ids: HashSet<&str> = meters.column("RUN_METER_ID").into_iter().collect();
    let terminals = read_table(dir.path(), TableId::TerminalMaster);
    let terminal_ids: HashSet<&str> = terminals.column("RUN_TERM_ID").into_iter().collect();
    assert_eq!(terminal_ids.len(), 1);

    for table in [TableId::PowerCurve, TableId::VoltageCurve, TableId::FaultHistory, TableId::RiskList] {
        let rows = read_table(dir.path(), table);
        assert!(
            rows.column("RUN_METER_ID").iter().all(|id| meter_ids.contains(id)),
            "{} references an unknown meter",
            table.file_name()
        );
    }
    for table in [TableId::FaultHistory, TableId::MaintenanceLog, TableId::RiskList, TableId::TerminalStatusAnomaly] {
        let rows = read_table(dir.path(), table);
        assert!(
            rows.column("RUN_TERM_ID").iter().all(|id| terminal_ids.contains(id)),
            "{} references an unknown terminal",
            table.file_name()
        );
    }

    let failed = read_table(dir.path(), TableId::FailedReading);
    assert!(failed.column("EQU_ID").iter().all(|id| meter_ids.contains(id)));
}

#[test]
fn voltage_table_stays_within_physical_bounds() {
    let dir = tempfile::tempdir().unwrap();
    generate_into(dir.path());

    let voltage = read_table(dir.path(), TableId::VoltageCurve);
    for column in ["P_VOLT_A", "P_VOLT_B", "P_VOLT_C"] {
        for raw in voltage.column(column) {
            let v: f64 = raw.parse().unwrap();
            assert!((186.999..=253.001).contains(&v), "{column} = {v}");
        }
    }
    for column in ["P_CURR_A", "P_CURR_B", "P_CURR_C", "ZL_CURR"] {
        for raw in voltage.column(column) {
            let i: f64 = raw.parse().unwrap();
            assert!(i >= 0.0, "{column} = {i}");
        }
    }
}
