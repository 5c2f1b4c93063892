use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

const TIME_FORMAT: &str = "%-I:%M:%S %p";
const DATE_FORMAT: &str = "%-m/%-d/%Y";
const DAY_FORMAT: &str = "%A";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Present,
    Absent,
}

/// A single attendance entry as shown on the dashboard and stored by the
/// remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "status": "present",
        "time": "9:10:00 AM",
        "date": "10/16/2026",
        "day": "Friday"
    })
)]
pub struct AttendanceRecord {
    pub status: Status,
    #[schema(example = "9:10:00 AM")]
    pub time: String,
    #[schema(example = "10/16/2026")]
    pub date: String,
    #[schema(example = "Friday")]
    pub day: String,
}

impl AttendanceRecord {
    pub fn at(status: Status, now: NaiveDateTime) -> Self {
        Self {
            status,
            time: format_time(now),
            date: format_date(now),
            day: format_day(now),
        }
    }
}

pub fn format_time(now: NaiveDateTime) -> String {
    now.format(TIME_FORMAT).to_string()
}

pub fn format_date(now: NaiveDateTime) -> String {
    now.format(DATE_FORMAT).to_string()
}

pub fn format_day(now: NaiveDateTime) -> String {
    now.format(DAY_FORMAT).to_string()
}

/// Body of `POST /attendance` on the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub employee_id: String,
    pub name: String,
    #[serde(flatten)]
    pub record: AttendanceRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn record_uses_locale_style_strings() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(17, 5, 9)
            .unwrap();

        let record = AttendanceRecord::at(Status::Absent, now);

        assert_eq!(record.time, "5:05:09 PM");
        assert_eq!(record.date, "10/16/2026");
        assert_eq!(record.day, "Friday");
    }

    #[test]
    fn entry_flattens_record_fields() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 10, 0)
            .unwrap();
        let entry = AttendanceEntry {
            employee_id: "E1".into(),
            name: "Ada".into(),
            record: AttendanceRecord::at(Status::Present, now),
        };

        let body = serde_json::to_value(&entry).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "employeeId": "E1",
                "name": "Ada",
                "status": "present",
                "time": "9:10:00 AM",
                "date": "10/16/2026",
                "day": "Friday"
            })
        );
    }

    #[test]
    fn remote_history_ignores_extra_fields() {
        let raw = r#"[{"_id":"x","employeeId":"E1","status":"absent","time":"5:46:00 PM","date":"10/15/2026","day":"Thursday"}]"#;

        let records: Vec<AttendanceRecord> = serde_json::from_str(raw).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Status::Absent);
    }
}
