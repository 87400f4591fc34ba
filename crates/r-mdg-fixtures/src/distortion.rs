//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Three-phase power sampling and the wiring-fault signatures applied to it.
//!
//! Power factors are kept to 3 decimals and powers to 4. Voltage and current
//! are not represented here: miswiring changes power sign and power factor
//! only, so the voltage/current curve never consults this module.
use std::ops::RangeInclusive;

use crate::entities::MeterRole;
use crate::rng::{round_to, FixtureRng};
use crate::taxonomy::WiringFault;

const PF_DIGITS: i32 = 3;
const POWER_DIGITS: i32 = 4;

/// Power base drawn for a main meter, in kW.
pub const MAIN_POWER_BASE: RangeInclusive<f64> = 50.0..=150.0;
/// Power base drawn for a sub meter, in kW.
pub const SUB_POWER_BASE: RangeInclusive<f64> = 1.0..=10.0;
/// Normal-operation power factor, per phase and total.
pub const NORMAL_POWER_FACTOR: RangeInclusive<f64> = 0.85..=0.99;

const PHASE_ACTIVE_SHARE: (f64, f64) = (0.30, 0.35);
const PHASE_REACTIVE_SHARE: (f64, f64) = (0.20, 0.40);
const TOTAL_REACTIVE_SHARE: (f64, f64) = (0.60, 1.20);
const PHASE_APPARENT_SHARE: (f64, f64) = (0.32, 0.37);
const TOTAL_APPARENT_SHARE: (f64, f64) = (1.00, 1.10);

/// One phase (or the aggregate) of a power reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhasePower {
    pub power_factor: f64,
    pub active: f64,
    pub reactive: f64,
    pub apparent: f64,
}

impl PhasePower {
    fn reverse(&mut self) {
        self.active = -self.active.abs();
        self.reactive = -self.reactive.abs();
        self.power_factor = -self.power_factor.abs();
    }
}

/// A full power-curve reading: phases A, B, C plus the aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSample {
    /// Power base the reading was scaled from.
    pub base: f64,
    pub phases: [PhasePower; 3],
    pub total: PhasePower,
}

impl PowerSample {
    /// Normal-operation reading with a fresh power base for `role`.
    pub fn baseline(role: MeterRole, rng: &mut FixtureRng) -> Self {
        let range = if role.is_main() { MAIN_POWER_BASE } else { SUB_POWER_BASE };
        let base = rng.uniform(*range.start(), *range.end());
        Self::from_base(base, rng)
    }

    /// Normal-operation reading scaled from `base`.
    pub fn from_base(base: f64, rng: &mut FixtureRng) -> Self {
        let (pf_low, pf_high) = (*NORMAL_POWER_FACTOR.start(), *NORMAL_POWER_FACTOR.end());
        let mut phases = [PhasePower::default(); 3];
        for phase in phases.iter_mut() {
            phase.power_factor = rng.uniform_rounded(pf_low, pf_high, PF_DIGITS);
        }
        let mut total = PhasePower {
            power_factor: rng.uniform_rounded(pf_low, pf_high, PF_DIGITS),
            active: round_to(base, POWER_DIGITS),
            ..PhasePower::default()
        };
        for phase in phases.iter_mut() {
            phase.active = scaled(base, PHASE_ACTIVE_SHARE, rng);
        }
        for phase in phases.iter_mut() {
            phase.reactive = scaled(base, PHASE_REACTIVE_SHARE, rng);
        }
        total.reactive = scaled(base, TOTAL_REACTIVE_SHARE, rng);
        for phase in phases.iter_mut() {
            phase.apparent = scaled(base, PHASE_APPARENT_SHARE, rng);
        }
        total.apparent = scaled(base, TOTAL_APPARENT_SHARE, rng);
        Self { base, phases, total }
    }

    fn sum_active(&mut self) {
        self.total.active = round_to(self.phases.iter().map(|p| p.active).sum(), POWER_DIGITS);
    }

    fn sum_reactive(&mut self) {
        self.total.reactive = round_to(self.phases.iter().map(|p| p.reactive).sum(), POWER_DIGITS);
    }
}

fn scaled(base: f64, (low, high): (f64, f64), rng: &mut FixtureRng) -> f64 {
    round_to(base * rng.uniform(low, high), POWER_DIGITS)
}

fn redraw_factor(low: f64, high: f64, rng: &mut FixtureRng) -> f64 {
    rng.uniform_rounded(low, high, PF_DIGITS)
}

fn maybe_flip(value: &mut f64, p: f64, rng: &mut FixtureRng) {
    if rng.chance(p) {
        *value = -value.abs();
    }
}

impl WiringFault {
    /// Rewrite `sample` with this fault's signature. Apparent power is
    /// untouched by every variant.
    pub fn apply(&self, sample: &mut PowerSample, rng: &mut FixtureRng) {
        match self {
            WiringFault::SinglePhaseReversal => {
                sample.phases[0].reverse();
                sample.sum_active();
                sample.sum_reactive();
                sample.total.power_factor = redraw_factor(0.5, 0.75, rng);
            }
            WiringFault::TwoPhaseReversal => {
                sample.phases[0].reverse();
                sample.phases[1].reverse();
                sample.sum_active();
                sample.sum_reactive();
                sample.total.power_factor = redraw_factor(0.2, 0.5, rng);
            }
            WiringFault::ThreePhaseReversal => {
                for phase in sample.phases.iter_mut() {
                    phase.reverse();
                }
                sample.sum_active();
                sample.sum_reactive();
                sample.total.power_factor = -sample.total.power_factor.abs();
            }
            WiringFault::MisphasedCurrent => {
                for phase in sample.phases.iter_mut() {
                    phase.power_factor = redraw_factor(-0.5, 1.2, rng);
                }
                for phase in sample.phases.iter_mut() {
                    maybe_flip(&mut phase.reactive, 0.5, rng);
                }
                sample.total.power_factor = redraw_factor(-0.3, 1.15, rng);
                sample.sum_reactive();
            }
            WiringFault::VoltageSequence => {
                for phase in sample.phases.iter_mut() {
                    phase.power_factor = redraw_factor(-0.8, 0.3, rng);
                }
                for phase in sample.phases.iter_mut() {
                    maybe_flip(&mut phase.reactive, 0.7, rng);
                }
                sample.total.power_factor = redraw_factor(-0.6, 0.5, rng);
                sample.sum_reactive();
            }
            WiringFault::Mixed => {
                for phase in sample.phases.iter_mut() {
                    maybe_flip(&mut phase.active, 0.5, rng);
                }
                for phase in sample.phases.iter_mut() {
                    maybe_flip(&mut phase.reactive, 0.6, rng);
                }
                for phase in sample.phases.iter_mut() {
                    phase.power_factor = redraw_factor(-1.0, 1.2, rng);
                }
                sample.sum_active();
                sample.sum_reactive();
                sample.total.power_factor = redraw_factor(-0.9, 1.1, rng);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn baseline_stays_in_normal_bounds() {
        let mut rng = FixtureRng::seeded(8);
        for role in [MeterRole::Main, MeterRole::Sub] {
            for _ in 0..200 {
                let sample = PowerSample::baseline(role, &mut rng);
                let range = if role.is_main() { MAIN_POWER_BASE } else { SUB_POWER_BASE };
                assert!(range.contains(&sample.base));
                for phase in sample.phases.iter().chain(std::iter::once(&sample.total)) {
                    assert!(NORMAL_POWER_FACTOR.contains(&phase.power_factor));
                }
                for phase in &sample.phases {
                    let share = phase.active / sample.base;
                    assert!((0.2999..=0.3501).contains(&share), "share {share}");
                    assert!(phase.reactive > 0.0 && phase.apparent > 0.0);
                }
                assert!(close(sample.total.active, sample.base));
            }
        }
    }

    #[test]
    fn three_phase_reversal_runs_backwards() {
        let mut rng = FixtureRng::seeded(21);
        for _ in 0..100 {
            let mut sample = PowerSample::baseline(MeterRole::Sub, &mut rng);
            WiringFault::ThreePhaseReversal.apply(&mut sample, &mut rng);
            assert!(sample.phases.iter().all(|p| p.active <= 0.0 && p.reactive <= 0.0 && p.power_factor <= 0.0));
            assert!(sample.total.active <= 0.0);
            assert!(sample.total.power_factor <= 0.0);
        }
    }

    #[test]
    fn partial_reversals_touch_only_their_phases() {
        let mut rng = FixtureRng::seeded(4);
        let clean = PowerSample::baseline(MeterRole::Main, &mut rng);

        let mut single = clean;
        WiringFault::SinglePhaseReversal.apply(&mut single, &mut rng);
        assert!(single.phases[0].active < 0.0);
        assert_eq!(single.phases[1], clean.phases[1]);
        assert_eq!(single.phases[2], clean.phases[2]);
        assert!((0.5..=0.75).contains(&single.total.power_factor));

        let mut double = clean;
        WiringFault::TwoPhaseReversal.apply(&mut double, &mut rng);
        assert!(double.phases[0].active < 0.0 && double.phases[1].active < 0.0);
        assert_eq!(double.phases[2], clean.phases[2]);
        assert!((0.2..=0.5).contains(&double.total.power_factor));
    }

    #[test]
    fn totals_are_recomputed_from_phases() {
        let mut rng = FixtureRng::seeded(99);
        for fault in WiringFault::iter() {
            let mut sample = PowerSample::baseline(MeterRole::Main, &mut rng);
            let before = sample;
            fault.apply(&mut sample, &mut rng);
            let reactive: f64 = sample.phases.iter().map(|p| p.reactive).sum();
            assert!(close(sample.total.reactive, reactive), "{fault:?}");
            let active: f64 = sample.phases.iter().map(|p| p.active).sum();
            match fault {
                WiringFault::MisphasedCurrent | WiringFault::VoltageSequence => {
                    assert_eq!(sample.total.active, before.total.active, "{fault:?}");
                }
                _ => assert!(close(sample.total.active, active), "{fault:?}"),
            }
            assert_eq!(sample.total.apparent, before.total.apparent);
        }
    }

    #[test]
    fn sign_scrambling_faults_keep_magnitudes() {
        let mut rng = FixtureRng::seeded(12);
        for fault in [WiringFault::MisphasedCurrent, WiringFault::VoltageSequence, WiringFault::Mixed] {
            let clean = PowerSample::baseline(MeterRole::Sub, &mut rng);
            let mut sample = clean;
            fault.apply(&mut sample, &mut rng);
            for (after, before) in sample.phases.iter().zip(clean.phases.iter()) {
                assert_eq!(after.active.abs(), before.active.abs());
                assert_eq!(after.reactive.abs(), before.reactive.abs());
                assert!((-1.0..=1.2).contains(&after.power_factor));
            }
        }
    }
}
