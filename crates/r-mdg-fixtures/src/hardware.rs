//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Device health table and the manufacturer/asset registry built from it.
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::entities::{District, Topology, RESIDENTIAL_DISTRICT};
use crate::rng::FixtureRng;
use crate::schema::{Column, Record, TableId};

/// Literal used wherever a device is missing from the registry.
pub const UNKNOWN_MANUFACTURER: &str = "未知厂家";

/// Meters sampled into the hardware table.
pub const SAMPLED_METERS: usize = 10;

const METER_MANUFACTURERS: [&str; 6] = ["国电南瑞", "许继电气", "长园深瑞", "科陆电子", "威胜集团", "海兴电力"];
const NORMAL_OR_FAULT: [&str; 2] = ["正常", "异常"];
const ENABLED_OR_DISABLED: [&str; 2] = ["启用", "禁用"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceType {
    #[serde(rename = "终端")]
    Terminal,
    #[serde(rename = "电能表")]
    Meter,
}

/// Network-layer telemetry only terminals report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkMetrics {
    pub open_ports: String,
    pub peers: String,
    pub send_rate: String,
    pub receive_rate: String,
    pub tcp_share: String,
    pub udp_share: String,
    pub business_share: String,
    pub dedicated_channel: &'static str,
    pub disable_auto_connect: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HardwareStatusRecord {
    #[serde(rename = "KEEPER_ID")]
    pub keeper_id: String,
    #[serde(rename = "TA_NO")]
    pub ta_no: String,
    #[serde(rename = "TA_NAME")]
    pub ta_name: String,
    #[serde(rename = "TA_ADDR")]
    pub ta_addr: String,
    #[serde(rename = "TA_TYPE")]
    pub ta_type: &'static str,
    #[serde(rename = "EQU_ID")]
    pub equ_id: String,
    #[serde(rename = "ASSETS_NO")]
    pub assets_no: String,
    #[serde(rename = "DEVICE_TYPE")]
    pub device_type: DeviceType,
    #[serde(rename = "MANUFACTURER_NAME")]
    pub manufacturer_name: &'static str,
    #[serde(rename = "COMM_PROTOCOL_CODE")]
    pub comm_protocol_code: &'static str,
    #[serde(rename = "COMM_INTERFACE_MODE_CODE")]
    pub comm_interface_mode_code: &'static str,
    #[serde(rename = "LOCAL_INTERFACE")]
    pub local_interface: &'static str,
    #[serde(rename = "CPU_RATE")]
    pub cpu_rate: String,
    #[serde(rename = "MEMORY_RATE")]
    pub memory_rate: String,
    #[serde(rename = "SYSTEM_NUMBER")]
    pub system_number: String,
    #[serde(rename = "SYSTEM_ROOT")]
    pub system_root: &'static str,
    #[serde(rename = "IMPORTANT_DATA")]
    pub important_data: &'static str,
    #[serde(rename = "OPEN_PORT_LIST")]
    pub open_port_list: Option<String>,
    #[serde(rename = "NETWORK_COMMUNICATION_OBJECT")]
    pub network_communication_object: Option<String>,
    #[serde(rename = "REAL_TIME_SENDING_RATE")]
    pub real_time_sending_rate: Option<String>,
    #[serde(rename = "REAL_TIME_RECEIVING_RAT")]
    pub real_time_receiving_rate: Option<String>,
    #[serde(rename = "TCP_RUNOFF")]
    pub tcp_runoff: Option<String>,
    #[serde(rename = "UDP_PROPORTION")]
    pub udp_proportion: Option<String>,
    #[serde(rename = "BISINESS_PROPORTION")]
    pub business_proportion: Option<String>,
    #[serde(rename = "DEDICACED_CHANNEL")]
    pub dedicated_channel: Option<&'static str>,
    #[serde(rename = "DISABLE_CONNECTION")]
    pub disable_connection: Option<&'static str>,
}

impl HardwareStatusRecord {
    fn set_network(&mut self, metrics: NetworkMetrics) {
        self.open_port_list = Some(metrics.open_ports);
        self.network_communication_object = Some(metrics.peers);
        self.real_time_sending_rate = Some(metrics.send_rate);
        self.real_time_receiving_rate = Some(metrics.receive_rate);
        self.tcp_runoff = Some(metrics.tcp_share);
        self.udp_proportion = Some(metrics.udp_share);
        self.business_proportion = Some(metrics.business_share);
        self.dedicated_channel = Some(metrics.dedicated_channel);
        self.disable_connection = Some(metrics.disable_auto_connect);
    }

    pub fn has_network_metrics(&self) -> bool {
        self.open_port_list.is_some()
    }
}

impl Record for HardwareStatusRecord {
    const TABLE: TableId = TableId::HardwareStatus;
    const COLUMNS: &'static [Column] = &[
        Column::new("KEEPER_ID", "SIM卡的当前持有人的唯一标识"),
        Column::new("TA_NO", "台区编号"),
        Column::new("TA_NAME", "台区名称"),
        Column::new("TA_ADDR", "台区地址"),
        Column::new("TA_TYPE", "台区类型"),
        Column::new("EQU_ID", "电能计量设备唯一标识"),
        Column::new("ASSETS_NO", "资产编号"),
        Column::new("DEVICE_TYPE", "设备类型(终端/电能表)"),
        Column::new("MANUFACTURER_NAME", "生产厂商名称"),
        Column::new("COMM_PROTOCOL_CODE", "通讯规约"),
        Column::new("COMM_INTERFACE_MODE_CODE", "通信接口方式"),
        Column::new("LOCAL_INTERFACE", "本地接口状态"),
        Column::new("CPU_RATE", "CPU占用率"),
        Column::new("MEMORY_RATE", "内存占用率"),
        Column::new("SYSTEM_NUMBER", "系统版本号"),
        Column::new("SYSTEM_ROOT", "系统ROOT"),
        Column::new("IMPORTANT_DATA", "重要数据备份"),
        Column::new("OPEN_PORT_LIST", "开启端口列表"),
        Column::new("NETWORK_COMMUNICATION_OBJECT", "网络通信对象"),
        Column::new("REAL_TIME_SENDING_RATE", "实时发送速率"),
        Column::new("REAL_TIME_RECEIVING_RAT", "实时接收速率"),
        Column::new("TCP_RUNOFF", "TCP流量占比"),
        Column::new("UDP_PROPORTION", "UDP流量占比"),
        Column::new("BISINESS_PROPORTION", "业务流量占比"),
        Column::new("DEDICACED_CHANNEL", "专用网络通道"),
        Column::new("DISABLE_CONNECTION", "禁用网络自连"),
    ];
}

/// Build the hardware table: every terminal, then a sample of meters.
pub fn hardware_status(topology: &Topology, rng: &mut FixtureRng) -> Vec<HardwareStatusRecord> {
    let mut rows = Vec::with_capacity(topology.terminal_count() + SAMPLED_METERS);

    for terminal in topology.terminals() {
        let mut row = base_row(rng, topology.district(&terminal.district), &terminal.district);
        row.equ_id = terminal.equ_id.clone();
        row.assets_no = terminal.assets_no.clone();
        row.device_type = DeviceType::Terminal;
        row.manufacturer_name = terminal.manufacturer;
        row.comm_protocol_code = "DL/T645-2007";
        row.comm_interface_mode_code = "RS485";
        row.local_interface = rng.pick(&NORMAL_OR_FAULT);
        row.cpu_rate = format!("{}%", rng.int(20..=80));
        row.memory_rate = format!("{}%", rng.int(30..=85));
        row.system_number = format!("V{}.{}.{}", rng.int(1..=5), rng.int(0..=9), rng.int(0..=99));
        row.system_root = rng.pick(&NORMAL_OR_FAULT);
        row.important_data = rng.pick(&["已备份", "未备份"]);
        let metrics = network_metrics(rng);
        row.set_network(metrics);
        rows.push(row);
    }

    for meter in rng.sample(topology.meters(), SAMPLED_METERS) {
        let mut row = base_row(rng, topology.district(&meter.district), &meter.district);
        row.equ_id = meter.id.clone();
        row.assets_no = rng.tagged("ASSET_METER", 100_000..=999_999);
        row.manufacturer_name = rng.pick(&METER_MANUFACTURERS);
        row.local_interface = rng.pick(&NORMAL_OR_FAULT);
        row.cpu_rate = format!("{}%", rng.int(10..=50));
        row.memory_rate = format!("{}%", rng.int(20..=60));
        row.system_number = format!("V{}.{}.{}", rng.int(1..=3), rng.int(0..=9), rng.int(0..=99));
        rows.push(row);
    }

    debug!(rows = rows.len(), "generated hardware status");
    rows
}

fn base_row(rng: &mut FixtureRng, district: Option<&District>, district_code: &str) -> HardwareStatusRecord {
    HardwareStatusRecord {
        keeper_id: rng.id("KEEP"),
        ta_no: district_code.to_string(),
        ta_name: district.map(|d| d.name.clone()).unwrap_or_default(),
        ta_addr: district.map(|d| d.address.clone()).unwrap_or_default(),
        ta_type: district.map(|d| d.type_code).unwrap_or(RESIDENTIAL_DISTRICT),
        equ_id: String::new(),
        assets_no: String::new(),
        device_type: DeviceType::Meter,
        manufacturer_name: UNKNOWN_MANUFACTURER,
        comm_protocol_code: "DL/T645-2007",
        comm_interface_mode_code: "RS485",
        local_interface: "正常",
        cpu_rate: String::new(),
        memory_rate: String::new(),
        system_number: String::new(),
        system_root: "正常",
        important_data: "已备份",
        open_port_list: None,
        network_communication_object: None,
        real_time_sending_rate: None,
        real_time_receiving_rate: None,
        tcp_runoff: None,
        udp_proportion: None,
        business_proportion: None,
        dedicated_channel: None,
        disable_connection: None,
    }
}

fn network_metrics(rng: &mut FixtureRng) -> NetworkMetrics {
    NetworkMetrics {
        open_ports: rng.int(1000..=9999).to_string(),
        peers: format!("{}个", rng.int(1..=100)),
        send_rate: format!("{}Kbps", rng.int(100..=1000)),
        receive_rate: format!("{}Kbps", rng.int(100..=1000)),
        tcp_share: format!("{}%", rng.int(60..=95)),
        udp_share: format!("{}%", rng.int(5..=30)),
        business_share: format!("{}%", rng.int(70..=95)),
        dedicated_channel: rng.pick(&ENABLED_OR_DISABLED),
        disable_auto_connect: rng.pick(&ENABLED_OR_DISABLED),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub manufacturer: &'static str,
    pub assets_no: String,
    pub device_type: DeviceType,
}

/// `EQU_ID` keyed lookup over the hardware table.
#[derive(Debug, Clone, Default)]
pub struct HardwareRegistry {
    devices: IndexMap<String, DeviceEntry>,
}

impl HardwareRegistry {
    pub fn from_records(records: &[HardwareStatusRecord]) -> Self {
        let devices = records
            .iter()
            .map(|r| {
                (
                    r.equ_id.clone(),
                    DeviceEntry {
                        manufacturer: r.manufacturer_name,
                        assets_no: r.assets_no.clone(),
                        device_type: r.device_type,
                    },
                )
            })
            .collect();
        Self { devices }
    }

    pub fn get(&self, equ_id: &str) -> Option<&DeviceEntry> {
        self.devices.get(equ_id)
    }

    /// Manufacturer for `equ_id`, or [`UNKNOWN_MANUFACTURER`].
    pub fn manufacturer(&self, equ_id: &str) -> &'static str {
        self.get(equ_id).map(|d| d.manufacturer).unwrap_or(UNKNOWN_MANUFACTURER)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminals_carry_network_metrics_and_meters_do_not() {
        let mut rng = FixtureRng::seeded(12);
        let topology = Topology::build(2, 8, &[], &mut rng);
        let rows = hardware_status(&topology, &mut rng);
        assert_eq!(rows.len(), 2 + SAMPLED_METERS);
        for row in &rows {
            match row.device_type {
                DeviceType::Terminal => {
                    assert!(row.has_network_metrics());
                    assert!(row.dedicated_channel.is_some());
                }
                DeviceType::Meter => {
                    assert!(!row.has_network_metrics());
                    assert!(row.tcp_runoff.is_none());
                    assert!(topology.meter(&row.equ_id).is_some());
                    assert!(METER_MANUFACTURERS.contains(&row.manufacturer_name));
                }
            }
        }
    }

    #[test]
    fn meter_sample_is_distinct_and_clamped() {
        let mut rng = FixtureRng::seeded(3);
        let topology = Topology::build(1, 2, &[], &mut rng);
        let rows = hardware_status(&topology, &mut rng);
        let meters: Vec<&str> = rows
            .iter()
            .filter(|r| r.device_type == DeviceType::Meter)
            .map(|r| r.equ_id.as_str())
            .collect();
        assert_eq!(meters.len(), 3);
        let mut unique = meters.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn registry_resolves_terminals_and_falls_back() {
        let mut rng = FixtureRng::seeded(6);
        let topology = Topology::build(1, 1, &[], &mut rng);
        let registry = HardwareRegistry::from_records(&hardware_status(&topology, &mut rng));
        let terminal = topology.terminals().next().unwrap();
        assert_eq!(registry.manufacturer(&terminal.equ_id), terminal.manufacturer);
        assert_eq!(registry.get(&terminal.equ_id).unwrap().assets_no, terminal.assets_no);
        assert_eq!(registry.manufacturer("EQU0000000000000"), UNKNOWN_MANUFACTURER);
    }
}
