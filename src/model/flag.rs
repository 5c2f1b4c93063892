use std::fmt;

use chrono::NaiveDate;
use strum_macros::{Display, EnumIter};

use crate::model::slot::Slot;

/// How a slot got resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum FlagKind {
    Submitted,
    Absent,
}

/// Key of a durable submission flag.
///
/// Renders as `<kind>-<employeeId>-<YYYY-MM-DD>-<slot>`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FlagKey {
    pub kind: FlagKind,
    pub employee_id: String,
    pub date: NaiveDate,
    pub slot: Slot,
}

impl FlagKey {
    pub fn new(kind: FlagKind, employee_id: &str, date: NaiveDate, slot: Slot) -> Self {
        Self {
            kind,
            employee_id: employee_id.to_string(),
            date,
            slot,
        }
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.kind,
            self.employee_id,
            self.date.format("%Y-%m-%d"),
            self.slot
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        assert_eq!(
            FlagKey::new(FlagKind::Submitted, "E1", date, Slot::Morning).to_string(),
            "submitted-E1-2026-10-16-morning"
        );
        assert_eq!(
            FlagKey::new(FlagKind::Absent, "EMP-7", date, Slot::Evening).to_string(),
            "absent-EMP-7-2026-10-16-evening"
        );
    }
}
