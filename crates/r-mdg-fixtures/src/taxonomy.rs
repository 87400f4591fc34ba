//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Closed anomaly taxonomy. Consumers dispatch on declared properties of each
//! variant rather than on label text.
use serde::{Serialize, Serializer};
use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Top-level anomaly category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum AnomalyClass {
    Metrology,
    Wiring,
    Communication,
}

impl AnomalyClass {
    pub fn label(&self) -> &'static str {
        match self {
            AnomalyClass::Metrology => "计量失准",
            AnomalyClass::Wiring => "接线错误",
            AnomalyClass::Communication => "通信异常",
        }
    }
}

/// Miswiring signature affecting power sign and power factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum WiringFault {
    SinglePhaseReversal,
    TwoPhaseReversal,
    ThreePhaseReversal,
    MisphasedCurrent,
    VoltageSequence,
    Mixed,
}

/// Hardware/communication condition that degrades voltage/current measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementDisturbance {
    /// Communication module or meter body fault: widened voltage and current error.
    ModuleDegraded,
    /// Concentrator supply fault: widened voltage error only.
    SupplyUnstable,
}

/// Every anomaly subtype the ledger can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum AnomalyKind {
    MeteringInaccuracy,
    SinglePhaseCurrentReversed,
    TwoPhaseCurrentReversed,
    ThreePhaseCurrentReversed,
    CurrentPhaseMismatch,
    VoltagePhaseSequence,
    MixedWiring,
    CellularModuleFault,
    SimCardFault,
    ConcentratorPowerFault,
    ConcentratorArchiveMismatch,
    MeterModuleFault,
    MeterBodyFault,
}

impl AnomalyKind {
    pub fn all() -> impl Iterator<Item = AnomalyKind> {
        AnomalyKind::iter()
    }

    pub fn class(&self) -> AnomalyClass {
        match self {
            AnomalyKind::MeteringInaccuracy => AnomalyClass::Metrology,
            AnomalyKind::SinglePhaseCurrentReversed
            | AnomalyKind::TwoPhaseCurrentReversed
            | AnomalyKind::ThreePhaseCurrentReversed
            | AnomalyKind::CurrentPhaseMismatch
            | AnomalyKind::VoltagePhaseSequence
            | AnomalyKind::MixedWiring => AnomalyClass::Wiring,
            AnomalyKind::CellularModuleFault
            | AnomalyKind::SimCardFault
            | AnomalyKind::ConcentratorPowerFault
            | AnomalyKind::ConcentratorArchiveMismatch
            | AnomalyKind::MeterModuleFault
            | AnomalyKind::MeterBodyFault => AnomalyClass::Communication,
        }
    }

    /// Label written to the `DATA_ANOMALY_TYPE` / `EXCEPTION_TYPE` columns.
    pub fn label(&self) -> &'static str {
        match self {
            AnomalyKind::MeteringInaccuracy => "计量失准",
            AnomalyKind::SinglePhaseCurrentReversed => "单相电流反接",
            AnomalyKind::TwoPhaseCurrentReversed => "两相电流反接",
            AnomalyKind::ThreePhaseCurrentReversed => "三相电流全反",
            AnomalyKind::CurrentPhaseMismatch => "电流错相接入",
            AnomalyKind::VoltagePhaseSequence => "电压相序错误",
            AnomalyKind::MixedWiring => "混合错误",
            AnomalyKind::CellularModuleFault => "4G信号模块异常",
            AnomalyKind::SimCardFault => "SIM卡异常",
            AnomalyKind::ConcentratorPowerFault => "集中器电源故障",
            AnomalyKind::ConcentratorArchiveMismatch => "集中器与模块档案一致性",
            AnomalyKind::MeterModuleFault => "电表模块异常",
            AnomalyKind::MeterBodyFault => "电表本体异常",
        }
    }

    pub fn wiring_fault(&self) -> Option<WiringFault> {
        match self {
            AnomalyKind::SinglePhaseCurrentReversed => Some(WiringFault::SinglePhaseReversal),
            AnomalyKind::TwoPhaseCurrentReversed => Some(WiringFault::TwoPhaseReversal),
            AnomalyKind::ThreePhaseCurrentReversed => Some(WiringFault::ThreePhaseReversal),
            AnomalyKind::CurrentPhaseMismatch => Some(WiringFault::MisphasedCurrent),
            AnomalyKind::VoltagePhaseSequence => Some(WiringFault::VoltageSequence),
            AnomalyKind::MixedWiring => Some(WiringFault::Mixed),
            _ => None,
        }
    }

    /// Disturbance this kind imposes on voltage/current readings. Never set for wiring kinds.
    pub fn measurement_disturbance(&self) -> Option<MeasurementDisturbance> {
        match self {
            AnomalyKind::CellularModuleFault
            | AnomalyKind::MeterModuleFault
            | AnomalyKind::MeterBodyFault => Some(MeasurementDisturbance::ModuleDegraded),
            AnomalyKind::ConcentratorPowerFault => Some(MeasurementDisturbance::SupplyUnstable),
            _ => None,
        }
    }

    pub fn is_wiring(&self) -> bool {
        self.class() == AnomalyClass::Wiring
    }

    pub fn is_communication(&self) -> bool {
        self.class() == AnomalyClass::Communication
    }
}

impl Serialize for AnomalyKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_has_thirteen_subtypes_in_three_classes() {
        assert_eq!(AnomalyKind::COUNT, 13);
        let count = |class| AnomalyKind::all().filter(|k| k.class() == class).count();
        assert_eq!(count(AnomalyClass::Metrology), 1);
        assert_eq!(count(AnomalyClass::Wiring), 6);
        assert_eq!(count(AnomalyClass::Communication), 6);
    }

    #[test]
    fn every_wiring_kind_maps_to_a_distinct_fault() {
        let faults: Vec<WiringFault> = AnomalyKind::all().filter_map(|k| k.wiring_fault()).collect();
        assert_eq!(faults.len(), 6);
        for fault in WiringFault::iter() {
            assert!(faults.contains(&fault));
        }
        for kind in AnomalyKind::all() {
            assert_eq!(kind.is_wiring(), kind.wiring_fault().is_some());
        }
    }

    #[test]
    fn measurement_disturbances_are_disjoint_from_wiring() {
        for kind in AnomalyKind::all() {
            if kind.measurement_disturbance().is_some() {
                assert!(!kind.is_wiring());
                assert!(kind.is_communication());
            }
        }
    }

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<&str> = AnomalyKind::all().map(|k| k.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), AnomalyKind::COUNT);
    }
}
