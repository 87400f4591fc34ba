//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Tables derived from the topology, the hardware registry and the anomaly
//! ledger. Generators only read their inputs.
pub mod abnormal_meter;
pub mod calculation;
pub mod failed_reading;
pub mod faults;
pub mod maintenance;
pub mod risk;
pub mod terminal_status;

pub use abnormal_meter::{meter_status_anomalies, MeterStatusAnomalyRecord};
pub use calculation::{calculation_anomalies, CalculationAnomalyRecord};
pub use failed_reading::{failed_readings, FailedReadingRecord};
pub use faults::{fault_history, FaultRecord};
pub use maintenance::{maintenance_log, MaintenanceRecord};
pub use risk::{risk_list, RiskRecord};
pub use terminal_status::{terminal_status_anomalies, TerminalStatusAnomalyRecord};

use r_mdg_logging::{mdg_warn, LogContext};

use crate::entities::{Meter, Topology};
use crate::hardware::{HardwareRegistry, UNKNOWN_MANUFACTURER};
use crate::rng::FixtureRng;

const CUSTOMER_TYPES: [&str; 3] = ["居民", "工商业", "大工业"];

/// Terminal-derived columns for one meter's district. Copied from the
/// terminal when it exists, placeholders otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalFields {
    pub run_term_id: String,
    pub assets_no: String,
    pub comm_addr: String,
    pub metering_point_number: String,
    pub arrive_batch: String,
    pub manufacturer: &'static str,
    /// False when the values are placeholders.
    pub resolved: bool,
}

impl TerminalFields {
    pub fn resolve(topology: &Topology, registry: &HardwareRegistry, meter: &Meter, rng: &mut FixtureRng) -> Self {
        match topology.terminal_for(&meter.district) {
            Some(terminal) => Self {
                run_term_id: terminal.run_term_id.clone(),
                assets_no: terminal.assets_no.clone(),
                comm_addr: terminal.comm_addr.clone(),
                metering_point_number: terminal.metering_point_number.clone(),
                arrive_batch: terminal.arrive_batch.clone(),
                manufacturer: registry.manufacturer(&terminal.equ_id),
                resolved: true,
            },
            None => {
                mdg_warn!(
                    context = LogContext::new().with_district(&meter.district),
                    "no terminal registered for meter {}, using placeholder values",
                    meter.id
                );
                Self::placeholder(rng)
            }
        }
    }

    pub fn placeholder(rng: &mut FixtureRng) -> Self {
        Self {
            run_term_id: rng.id("RTERM"),
            assets_no: rng.tagged("TERM", 100_000..=999_999),
            comm_addr: rng.ipv4(),
            metering_point_number: rng.tagged("MP", 100_000..=999_999),
            arrive_batch: rng.tagged("BATCH", 1000..=9999),
            manufacturer: UNKNOWN_MANUFACTURER,
            resolved: false,
        }
    }
}

fn customer_type(rng: &mut FixtureRng) -> &'static str {
    rng.pick(&CUSTOMER_TYPES)
}

fn user_name(rng: &mut FixtureRng) -> String {
    format!("用户{}", rng.int(1..=1000))
}

fn user_id(rng: &mut FixtureRng) -> String {
    rng.tagged("USER", 100_000..=999_999)
}
