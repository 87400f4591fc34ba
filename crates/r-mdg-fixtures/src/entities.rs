//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Master topology: districts, their meters and one terminal each.
//!
//! Every other generator reaches entities through the lookups on
//! [`Topology`] so identifiers, asset numbers and addresses are copied from
//! one place instead of being redrawn per table.
use indexmap::IndexMap;
use r_mdg_common::GenerationConfig;
use tracing::debug;

use crate::rng::FixtureRng;

const TERMINAL_MANUFACTURERS: [&str; 3] = ["国电南瑞", "许继电气", "长园深瑞"];

/// Residential district type code.
pub const RESIDENTIAL_DISTRICT: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct District {
    pub code: String,
    pub name: String,
    pub address: String,
    pub type_code: &'static str,
    pub supply_org: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterRole {
    /// Whole-district aggregate meter.
    Main,
    Sub,
}

impl MeterRole {
    /// `MA_AUXIL_TABLE_SIGNS` flag.
    pub fn sign(&self) -> &'static str {
        match self {
            MeterRole::Main => "1",
            MeterRole::Sub => "0",
        }
    }

    pub fn is_main(&self) -> bool {
        matches!(self, MeterRole::Main)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meter {
    pub id: String,
    pub district: String,
    pub role: MeterRole,
    pub supply_org: String,
    pub assets_no: String,
    pub comm_addr: String,
    pub equ_id: String,
}

impl Meter {
    /// `INSTALL_POSITION` value shared by the master table and the status lists.
    pub fn install_position(&self) -> String {
        format!("{}台区内", self.district)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub run_term_id: String,
    pub equ_id: String,
    pub assets_no: String,
    pub comm_addr: String,
    pub metering_point_number: String,
    pub elec_cust_no: String,
    pub arrive_batch: String,
    pub install_addr: String,
    pub supply_org: String,
    pub manufacturer: &'static str,
    pub district: String,
}

/// Immutable entity set for one run.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    districts: IndexMap<String, District>,
    meters: Vec<Meter>,
    meter_index: IndexMap<String, usize>,
    terminals: IndexMap<String, Terminal>,
}

impl Topology {
    /// Build `districts` districts, each with one main meter, `sub_meters`
    /// sub meters and one terminal. District `i` takes `supply_orgs[i]`, or a
    /// synthesised `05NN` code when the pool is short.
    pub fn build(districts: usize, sub_meters: usize, supply_orgs: &[String], rng: &mut FixtureRng) -> Self {
        let mut topology = Topology::default();
        for i in 0..districts {
            let ordinal = i + 1;
            let code = format!("TQ{:04}", ordinal);
            let supply_org = supply_orgs
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("05{:02}", ordinal));
            let district = District {
                code: code.clone(),
                name: format!("台区{}", ordinal),
                address: format!("测试地址{}号", ordinal),
                type_code: RESIDENTIAL_DISTRICT,
                supply_org: supply_org.clone(),
            };

            topology.push_meter(new_meter(rng, &district, MeterRole::Main, format!("M{}T", code)));
            for j in 0..sub_meters {
                let prefix = format!("M{}S{:02}", code, j + 1);
                topology.push_meter(new_meter(rng, &district, MeterRole::Sub, prefix));
            }

            let terminal = new_terminal(rng, &district);
            topology.terminals.insert(code.clone(), terminal);
            topology.districts.insert(code, district);
        }
        debug!(
            districts = topology.districts.len(),
            meters = topology.meters.len(),
            terminals = topology.terminals.len(),
            "built metering topology"
        );
        topology
    }

    pub fn from_config(config: &GenerationConfig, rng: &mut FixtureRng) -> Self {
        Self::build(
            config.districts,
            config.effective_sub_meters(),
            &config.supply_org_pool(),
            rng,
        )
    }

    fn push_meter(&mut self, meter: Meter) {
        self.meter_index.insert(meter.id.clone(), self.meters.len());
        self.meters.push(meter);
    }

    pub fn districts(&self) -> impl Iterator<Item = &District> {
        self.districts.values()
    }

    pub fn district(&self, code: &str) -> Option<&District> {
        self.districts.get(code)
    }

    pub fn meters(&self) -> &[Meter] {
        &self.meters
    }

    pub fn meter(&self, id: &str) -> Option<&Meter> {
        self.meter_index.get(id).map(|&i| &self.meters[i])
    }

    /// 1-based position of a meter in master-table order.
    pub fn meter_position(&self, id: &str) -> Option<usize> {
        self.meter_index.get(id).map(|&i| i + 1)
    }

    pub fn meters_in<'a>(&'a self, district: &'a str) -> impl Iterator<Item = &'a Meter> + 'a {
        self.meters.iter().filter(move |m| m.district == district)
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.terminals.values()
    }

    /// The terminal serving `district`, if one exists.
    pub fn terminal_for(&self, district: &str) -> Option<&Terminal> {
        self.terminals.get(district)
    }

    pub fn district_count(&self) -> usize {
        self.districts.len()
    }

    pub fn meter_count(&self) -> usize {
        self.meters.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }
}

fn new_meter(rng: &mut FixtureRng, district: &District, role: MeterRole, prefix: String) -> Meter {
    Meter {
        id: rng.id(&prefix),
        district: district.code.clone(),
        role,
        supply_org: district.supply_org.clone(),
        assets_no: rng.tagged("ASSET", 100_000..=999_999),
        comm_addr: rng.ipv4(),
        equ_id: rng.id("EQU"),
    }
}

fn new_terminal(rng: &mut FixtureRng, district: &District) -> Terminal {
    Terminal {
        run_term_id: rng.id("TERM"),
        equ_id: rng.id("EQU"),
        assets_no: rng.tagged("ASSET", 100_000..=999_999),
        comm_addr: rng.ipv4(),
        metering_point_number: rng.tagged("MP", 100_000..=999_999),
        elec_cust_no: rng.tagged("CUST", 100_000..=999_999),
        arrive_batch: rng.tagged("BATCH", 1000..=9999),
        install_addr: district.address.clone(),
        supply_org: district.supply_org.clone(),
        manufacturer: rng.pick(&TERMINAL_MANUFACTURERS),
        district: district.code.clone(),
    }
}
