//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Timestamped anomaly events shared by every derived table.
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use r_mdg_common::time::timestamp_serde;
use r_mdg_common::Timeline;
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::context::RunContext;
use crate::rng::FixtureRng;
use crate::schema::{Column, Record, TableId};
use crate::taxonomy::AnomalyKind;

/// Most events drawn for a single timestamp.
pub const MAX_EVENTS_PER_TIMESTAMP: u64 = 3;

/// Whether the flagged data lives in a source or a business table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableLayer {
    #[serde(rename = "源表")]
    Source,
    #[serde(rename = "业务表")]
    Business,
}

/// Downstream table an event is attributed to. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter)]
pub enum AffectedTable {
    PowerCurve,
    VoltageCurve,
    AbnormalMeter,
    UnsuccessfulMeter,
}

impl AffectedTable {
    pub fn english_name(&self) -> &'static str {
        match self {
            AffectedTable::PowerCurve => "MK_1_15_运行电能表功率曲线",
            AffectedTable::VoltageCurve => "MK_1_16_运行电能表电压电流曲线",
            AffectedTable::AbnormalMeter => "MK_RI_ABNORMAL_METER",
            AffectedTable::UnsuccessfulMeter => "MK_RI_UNSUCCESSFUL_METER",
        }
    }

    pub fn chinese_name(&self) -> &'static str {
        match self {
            AffectedTable::PowerCurve => "功率曲线表",
            AffectedTable::VoltageCurve => "电压电流表",
            AffectedTable::AbnormalMeter => "异常电表",
            AffectedTable::UnsuccessfulMeter => "抄表失败表",
        }
    }
}

/// One ledger row. Not bound to any meter or terminal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AnomalyEvent {
    #[serde(with = "timestamp_serde")]
    pub data_time: NaiveDateTime,
    pub supply_org_no: String,
    #[serde(rename = "DATA_ANOMALY_TYPE")]
    pub kind: AnomalyKind,
    pub tables: TableLayer,
    pub tables_english_name: &'static str,
    pub tables_chinese_name: &'static str,
    pub number_of: u64,
}

impl Record for AnomalyEvent {
    const TABLE: TableId = TableId::DataAnomaly;
    const COLUMNS: &'static [Column] = &[
        Column::new("DATA_TIME", "主键,数据时间"),
        Column::new("SUPPLY_ORG_NO", "主键,供电单位编码"),
        Column::new("DATA_ANOMALY_TYPE", "数据异常类型"),
        Column::new("TABLES", "表格类型"),
        Column::new("TABLES_ENGLISH_NAME", "表英文名称"),
        Column::new("TABLES_CHINESE_NAME", "表中文名称"),
        Column::new("NUMBER_OF", "异常条数"),
    ];
}

/// Time-ordered anomaly events for the whole window.
#[derive(Debug, Clone, Default)]
pub struct AnomalyLedger {
    events: Vec<AnomalyEvent>,
}

impl AnomalyLedger {
    /// For every timestamp, draw `0..=3` distinct subtypes independently.
    pub fn generate(timeline: &Timeline, ctx: &RunContext, rng: &mut FixtureRng) -> Self {
        let kinds: Vec<AnomalyKind> = AnomalyKind::iter().collect();
        let tables: Vec<AffectedTable> = AffectedTable::iter().collect();
        let mut events = Vec::new();
        for &at in timeline.points() {
            let count = rng.int(0..=MAX_EVENTS_PER_TIMESTAMP) as usize;
            for &kind in rng.sample(&kinds, count) {
                let table = rng.choose(&tables).copied().unwrap_or(AffectedTable::PowerCurve);
                events.push(AnomalyEvent {
                    data_time: at,
                    supply_org_no: ctx.default_supply_org.clone(),
                    kind,
                    tables: rng.pick(&[TableLayer::Source, TableLayer::Business]),
                    tables_english_name: table.english_name(),
                    tables_chinese_name: table.chinese_name(),
                    number_of: rng.int(1..=50),
                });
            }
        }
        debug!(events = events.len(), timestamps = timeline.len(), "generated anomaly ledger");
        Self { events }
    }

    pub fn from_events(events: Vec<AnomalyEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[AnomalyEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<AnomalyEvent> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Kinds matching `filter`, grouped by timestamp in first-seen order.
    /// Timestamps without a matching kind are absent.
    pub fn grouped<F>(&self, filter: F) -> IndexMap<NaiveDateTime, Vec<AnomalyKind>>
    where
        F: Fn(AnomalyKind) -> bool,
    {
        let mut grouped: IndexMap<NaiveDateTime, Vec<AnomalyKind>> = IndexMap::new();
        for event in self.events.iter().filter(|e| filter(e.kind)) {
            grouped.entry(event.data_time).or_default().push(event.kind);
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn event(time: NaiveDateTime, kind: AnomalyKind) -> AnomalyEvent {
        AnomalyEvent {
            data_time: time,
            supply_org_no: "0501".into(),
            kind,
            tables: TableLayer::Source,
            tables_english_name: AffectedTable::PowerCurve.english_name(),
            tables_chinese_name: AffectedTable::PowerCurve.chinese_name(),
            number_of: 1,
        }
    }

    #[test]
    fn per_timestamp_events_are_bounded_and_distinct() {
        let timeline = Timeline::new(at(0, 0), at(23, 45), 15).unwrap();
        let ctx = RunContext::new(at(0, 0), "440000", "0501");
        let mut rng = FixtureRng::seeded(17);
        let ledger = AnomalyLedger::generate(&timeline, &ctx, &mut rng);
        let grouped = ledger.grouped(|_| true);
        for kinds in grouped.values() {
            assert!(kinds.len() as u64 <= MAX_EVENTS_PER_TIMESTAMP);
            let unique: HashSet<_> = kinds.iter().collect();
            assert_eq!(unique.len(), kinds.len());
        }
        assert!(ledger.events().iter().all(|e| e.supply_org_no == "0501"));
        assert!(ledger.events().iter().all(|e| (1..=50).contains(&e.number_of)));
        assert!(ledger.events().windows(2).all(|w| w[0].data_time <= w[1].data_time));
    }

    #[test]
    fn grouping_filters_by_declared_class() {
        let ledger = AnomalyLedger::from_events(vec![
            event(at(0, 0), AnomalyKind::MixedWiring),
            event(at(0, 0), AnomalyKind::SimCardFault),
            event(at(0, 15), AnomalyKind::MeteringInaccuracy),
            event(at(0, 30), AnomalyKind::ThreePhaseCurrentReversed),
        ]);
        let wiring = ledger.grouped(|k| k.is_wiring());
        assert_eq!(wiring.len(), 2);
        assert_eq!(wiring[&at(0, 0)], vec![AnomalyKind::MixedWiring]);
        assert_eq!(wiring[&at(0, 30)], vec![AnomalyKind::ThreePhaseCurrentReversed]);
        let communication = ledger.grouped(|k| k.is_communication());
        assert_eq!(communication.keys().copied().collect::<Vec<_>>(), vec![at(0, 0)]);
    }
}
