//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use serde::{Serialize, Serializer};

/// Five-level risk grade, `Grade1` being the highest risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskGrade {
    Grade1,
    Grade2,
    Grade3,
    Grade4,
    Grade5,
}

impl RiskGrade {
    /// Step function over a score in `[0, 1]`. Lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.80 {
            RiskGrade::Grade1
        } else if score >= 0.65 {
            RiskGrade::Grade2
        } else if score >= 0.50 {
            RiskGrade::Grade3
        } else if score >= 0.35 {
            RiskGrade::Grade4
        } else {
            RiskGrade::Grade5
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            RiskGrade::Grade1 => 1,
            RiskGrade::Grade2 => 2,
            RiskGrade::Grade3 => 3,
            RiskGrade::Grade4 => 4,
            RiskGrade::Grade5 => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskGrade::Grade1 => "一级风险",
            RiskGrade::Grade2 => "二级风险",
            RiskGrade::Grade3 => "三级风险",
            RiskGrade::Grade4 => "四级风险",
            RiskGrade::Grade5 => "五级风险",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [
            RiskGrade::Grade1,
            RiskGrade::Grade2,
            RiskGrade::Grade3,
            RiskGrade::Grade4,
            RiskGrade::Grade5,
        ]
        .into_iter()
        .find(|grade| grade.label() == label)
    }
}

impl Serialize for RiskGrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_the_higher_grade() {
        assert_eq!(RiskGrade::from_score(0.80), RiskGrade::Grade1);
        assert_eq!(RiskGrade::from_score(0.7999), RiskGrade::Grade2);
        assert_eq!(RiskGrade::from_score(0.65), RiskGrade::Grade2);
        assert_eq!(RiskGrade::from_score(0.50), RiskGrade::Grade3);
        assert_eq!(RiskGrade::from_score(0.35), RiskGrade::Grade4);
        assert_eq!(RiskGrade::from_score(0.3499), RiskGrade::Grade5);
        assert_eq!(RiskGrade::from_score(0.0), RiskGrade::Grade5);
        assert_eq!(RiskGrade::from_score(1.0), RiskGrade::Grade1);
    }

    #[test]
    fn grades_are_monotonic_over_the_unit_interval() {
        let mut previous = RiskGrade::Grade5;
        for step in 0..=100 {
            let grade = RiskGrade::from_score(step as f64 / 100.0);
            assert!(grade <= previous);
            previous = grade;
        }
    }

    #[test]
    fn labels_round_trip() {
        for level in 1..=5u8 {
            let score = match level {
                1 => 0.9,
                2 => 0.7,
                3 => 0.55,
                4 => 0.4,
                _ => 0.1,
            };
            let grade = RiskGrade::from_score(score);
            assert_eq!(grade.level(), level);
            assert_eq!(RiskGrade::from_label(grade.label()), Some(grade));
        }
        assert_eq!(RiskGrade::from_label("未知"), None);
    }
}
