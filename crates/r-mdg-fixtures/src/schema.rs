//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Table identities and static column layouts.
use serde::Serialize;
use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// One output column: machine name (header row 1) and description (header row 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub description: &'static str,
}

impl Column {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

/// Every table the pipeline emits, in write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableId {
    MeterMaster,
    TerminalMaster,
    HardwareStatus,
    FaultHistory,
    MaintenanceLog,
    DataAnomaly,
    RiskList,
    CalculationAnomaly,
    TerminalStatusAnomaly,
    MeterStatusAnomaly,
    FailedReading,
    PowerCurve,
    VoltageCurve,
}

impl TableId {
    pub fn all() -> impl Iterator<Item = TableId> {
        TableId::iter()
    }

    /// Stable snake_case name used in logs and the run manifest.
    pub fn name(&self) -> &'static str {
        match self {
            TableId::MeterMaster => "meter_master",
            TableId::TerminalMaster => "terminal_master",
            TableId::HardwareStatus => "hardware_status",
            TableId::FaultHistory => "fault_history",
            TableId::MaintenanceLog => "maintenance_log",
            TableId::DataAnomaly => "data_anomaly",
            TableId::RiskList => "risk_list",
            TableId::CalculationAnomaly => "calculation_anomaly",
            TableId::TerminalStatusAnomaly => "terminal_status_anomaly",
            TableId::MeterStatusAnomaly => "meter_status_anomaly",
            TableId::FailedReading => "failed_reading",
            TableId::PowerCurve => "power_curve",
            TableId::VoltageCurve => "voltage_curve",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            TableId::MeterMaster => "MK_1_3运行电能表.csv",
            TableId::TerminalMaster => "MK_1_4_运行计量自动化终端.csv",
            TableId::HardwareStatus => "MK_1_31_硬件状态.csv",
            TableId::FaultHistory => "MK_1_27历史故障清单.csv",
            TableId::MaintenanceLog => "MK_1_29_历史运维日志清单.csv",
            TableId::DataAnomaly => "MK_1_32_数据异常清单_手工录入_增量数据上送.csv",
            TableId::RiskList => "MK_1_30_风险等级清单_手动录入.csv",
            TableId::CalculationAnomaly => "MK_1_33计算异常清单_手工录入_增量数据上送.csv",
            TableId::TerminalStatusAnomaly => "MK_1_34_状态异常清单终端.csv",
            TableId::MeterStatusAnomaly => "MK_1_35_状态异常清单电能表.csv",
            TableId::FailedReading => "MK_1_36_抄表不成功清单.csv",
            TableId::PowerCurve => "MK_1_15_运行电能表功率曲线.csv",
            TableId::VoltageCurve => "MK_1_16_运行电能表电压电流曲线.csv",
        }
    }
}

/// A serialisable row bound to its table. Field order of the serde
/// representation must follow `COLUMNS`.
pub trait Record: Serialize {
    const TABLE: TableId;
    const COLUMNS: &'static [Column];

    fn column_names() -> Vec<&'static str> {
        Self::COLUMNS.iter().map(|c| c.name).collect()
    }

    fn column_descriptions() -> Vec<&'static str> {
        Self::COLUMNS.iter().map(|c| c.description).collect()
    }
}
