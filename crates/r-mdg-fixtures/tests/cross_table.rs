//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "test"
//! ems_scope: "code"
//! ems_description: "Cross-table consistency checks over a generated fixture set."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::fs;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use r_mdg_common::Timeline;
use r_mdg_fixtures::derived::fault_history;
use r_mdg_fixtures::distortion::NORMAL_POWER_FACTOR;
use r_mdg_fixtures::{
    hardware_status, FixtureRng, FixtureSet, HardwareRegistry, RiskGrade, RunContext,
    TabularWriter, Topology, WiringFault,
};
use tempfile::tempdir;

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn week() -> Timeline {
    Timeline::new(start(), start() + Duration::minutes(15 * (7 * 96 - 1)), 15).unwrap()
}

fn fixture_set(seed: u64) -> FixtureSet {
    let mut rng = FixtureRng::seeded(seed);
    let mut fault_rng = FixtureRng::seeded(42);
    let topology = Topology::build(3, 2, &[], &mut rng);
    let ctx = RunContext::new(start() + Duration::days(8), "440000", "0501");
    FixtureSet::generate_with(ctx, week(), topology, &mut rng, &mut fault_rng)
}

#[test]
fn entity_counts_follow_topology() {
    let set = fixture_set(1);
    assert_eq!(set.meter_master.len(), 9);
    assert_eq!(set.terminal_master.len(), 3);
    for district in set.topology.districts() {
        let meters: Vec<_> = set.topology.meters_in(&district.code).collect();
        assert_eq!(meters.len(), 3);
        assert_eq!(meters.iter().filter(|m| m.role.is_main()).count(), 1);
        assert!(meters.iter().all(|m| m.supply_org == district.supply_org));
    }
}

#[test]
fn terminal_columns_always_match_the_district_terminal() {
    let set = fixture_set(2);
    let topology = &set.topology;
    let terminal_of = |meter_id: &str| {
        let meter = topology.meter(meter_id).unwrap();
        topology.terminal_for(&meter.district).unwrap()
    };

    assert!(!set.fault_history.is_empty());
    for row in &set.fault_history {
        let terminal = terminal_of(&row.run_meter_id);
        assert_eq!(row.run_term_id, terminal.run_term_id);
        assert_eq!(row.terminal_id, terminal.assets_no);
        assert_eq!(row.comm_addr, terminal.comm_addr);
    }
    for row in &set.maintenance_log {
        let terminal = terminal_of(&row.run_meter_id);
        assert_eq!(row.run_term_id, terminal.run_term_id);
        assert_eq!(row.metering_point_number, terminal.metering_point_number);
    }
    for row in &set.risk_list {
        let terminal = terminal_of(&row.run_meter_id);
        assert_eq!(row.run_term_id, terminal.run_term_id);
        assert_eq!(row.comm_addr, terminal.comm_addr);
        assert_eq!(row.arrive_batch, terminal.arrive_batch);
    }
    for row in &set.failed_readings {
        assert_eq!(row.run_term_id, terminal_of(&row.equ_id).run_term_id);
    }
}

#[test]
fn manufacturers_come_from_hardware_status() {
    let set = fixture_set(3);
    let registry = HardwareRegistry::from_records(&set.hardware_status);
    for row in &set.fault_history {
        let meter = set.topology.meter(&row.run_meter_id).unwrap();
        let terminal = set.topology.terminal_for(&meter.district).unwrap();
        assert_eq!(row.manufacturer_name, registry.manufacturer(&terminal.equ_id));
    }
    for row in &set.failed_readings {
        assert_eq!(row.manufacturer_name, registry.manufacturer(&row.equ_id));
    }
}

#[test]
fn status_lists_reference_ledger_timestamps() {
    let set = fixture_set(4);
    let communication: HashSet<NaiveDateTime> = set
        .data_anomalies
        .iter()
        .filter(|e| e.kind.is_communication())
        .map(|e| e.data_time)
        .collect();
    let any: HashSet<NaiveDateTime> = set.data_anomalies.iter().map(|e| e.data_time).collect();
    assert!(!set.failed_readings.is_empty());
    assert!(set.failed_readings.iter().all(|r| communication.contains(&r.data_time)));
    assert!(set.meter_status_anomalies.iter().all(|r| any.contains(&r.abnormal_date)));
    for row in &set.meter_status_anomalies {
        let meter = set.topology.meter(&row.energy_meter_identification).unwrap();
        assert_eq!(row.asset_code_meter, meter.assets_no);
    }
}

#[test]
fn risk_grades_bucket_scores() {
    let set = fixture_set(5);
    assert!(!set.risk_list.is_empty());
    for row in &set.risk_list {
        let expected = match row.risk {
            r if r >= 0.80 => RiskGrade::Grade1,
            r if r >= 0.65 => RiskGrade::Grade2,
            r if r >= 0.50 => RiskGrade::Grade3,
            r if r >= 0.35 => RiskGrade::Grade4,
            _ => RiskGrade::Grade5,
        };
        assert_eq!(row.risk_grade, expected, "score {}", row.risk);
    }
}

#[test]
fn power_curve_signatures_follow_wiring_faults() {
    let set = fixture_set(6);
    let wiring: HashSet<NaiveDateTime> = set
        .data_anomalies
        .iter()
        .filter(|e| e.kind.is_wiring())
        .map(|e| e.data_time)
        .collect();
    let mut distorted = 0;
    for row in &set.power_curve {
        match row.distortion {
            None => {
                for pf in [row.tp_factor_a, row.tp_factor_b, row.tp_factor_c] {
                    assert!(NORMAL_POWER_FACTOR.contains(&pf));
                }
                assert!((row.power - row.power_base).abs() < 1e-3);
            }
            Some(fault) => {
                distorted += 1;
                assert!(wiring.contains(&row.data_time));
                if fault == WiringFault::ThreePhaseReversal {
                    assert!(row.power_a <= 0.0 && row.power_b <= 0.0 && row.power_c <= 0.0);
                    assert!(row.tp_factor <= 0.0);
                }
            }
        }
    }
    assert!(distorted > 0);
}

#[test]
fn voltage_curve_ignores_wiring_faults() {
    let set = fixture_set(7);
    for row in &set.voltage_curve {
        for v in [row.p_volt_a, row.p_volt_b, row.p_volt_c] {
            assert!((0.85 * 220.0 - 1e-3..=1.15 * 220.0 + 1e-3).contains(&v), "voltage {v}");
        }
        for i in [row.p_curr_a, row.p_curr_b, row.p_curr_c, row.zl_curr] {
            assert!(i >= 0.0);
        }
        if row.disturbance.is_none() {
            for v in [row.p_volt_a, row.p_volt_b, row.p_volt_c] {
                assert!((0.95 * 220.0 - 1e-3..=1.05 * 220.0 + 1e-3).contains(&v));
            }
        }
    }
}

#[test]
fn fault_list_is_reproducible_for_a_fixed_seed() {
    let mut rng = FixtureRng::seeded(8);
    let topology = Topology::build(2, 6, &[], &mut rng);
    let registry = HardwareRegistry::from_records(&hardware_status(&topology, &mut rng));
    let ctx = RunContext::new(start(), "440000", "0501");
    let timeline = week();

    let dir = tempdir().unwrap();
    let mut written = Vec::new();
    for run in ["a", "b"] {
        let rows = fault_history(&timeline, &topology, &registry, &ctx, &mut FixtureRng::seeded(42));
        let writer = TabularWriter::create(dir.path().join(run)).unwrap();
        let path = writer.write(&rows).unwrap();
        written.push(fs::read(path).unwrap());
    }
    assert_eq!(written[0], written[1]);
}
