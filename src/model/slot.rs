use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Slot {
    Morning,
    Evening,
}

/// Half-open `[start, end)` wall-clock window.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SlotWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SlotWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, String> {
        if start >= end {
            return Err(format!("window start {start} must be before end {end}"));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }

    pub fn overlaps(&self, other: &SlotWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Parses `HH:MM-HH:MM`.
impl FromStr for SlotWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("expected HH:MM-HH:MM, got {s:?}"))?;
        SlotWindow::new(parse_clock(start)?, parse_clock(end)?)
    }
}

/// Renders the way the dashboard shows it, last open minute included:
/// `[09:00, 09:51)` becomes `9:00–9:50 AM`. The meridiem is repeated only when
/// the window crosses noon.
impl fmt::Display for SlotWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.end - Duration::minutes(1);
        let start = if (self.start.hour() < 12) == (last.hour() < 12) {
            self.start.format("%-I:%M")
        } else {
            self.start.format("%-I:%M %p")
        };
        write!(f, "{}–{}", start, last.format("%-I:%M %p"))
    }
}

pub fn parse_clock(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|e| format!("invalid time {s:?}: {e}"))
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlotWindows {
    morning: SlotWindow,
    evening: SlotWindow,
}

impl SlotWindows {
    pub fn new(morning: SlotWindow, evening: SlotWindow) -> Result<Self, String> {
        if morning.overlaps(&evening) {
            return Err("morning and evening windows overlap".to_string());
        }
        Ok(Self { morning, evening })
    }

    pub fn window(&self, slot: Slot) -> &SlotWindow {
        match slot {
            Slot::Morning => &self.morning,
            Slot::Evening => &self.evening,
        }
    }

    pub fn classify(&self, time: NaiveTime) -> Option<Slot> {
        if self.morning.contains(time) {
            Some(Slot::Morning)
        } else if self.evening.contains(time) {
            Some(Slot::Evening)
        } else {
            None
        }
    }

    /// e.g. `9:00–9:50 AM or 5:00–5:45 PM`
    pub fn describe(&self) -> String {
        format!("{} or {}", self.morning, self.evening)
    }
}

impl Default for SlotWindows {
    fn default() -> Self {
        Self {
            morning: SlotWindow {
                start: clock(9, 0),
                end: clock(9, 51),
            },
            evening: SlotWindow {
                start: clock(17, 0),
                end: clock(17, 46),
            },
        }
    }
}

/// Fixed instants at which an unresolved slot is marked absent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AbsentTriggers {
    pub morning: NaiveTime,
    pub evening: NaiveTime,
    /// How long after the instant a tick still counts as hitting it.
    pub grace: Duration,
}

impl AbsentTriggers {
    pub fn at(&self, slot: Slot) -> NaiveTime {
        match slot {
            Slot::Morning => self.morning,
            Slot::Evening => self.evening,
        }
    }

    /// True inside `[trigger, trigger + grace)`. A window running past
    /// midnight is cut at the end of the day.
    pub fn fires(&self, slot: Slot, time: NaiveTime) -> bool {
        let at = self.at(slot);
        let (until, wrapped) = at.overflowing_add_signed(self.grace);
        time >= at && (wrapped != 0 || time < until)
    }

    /// Slots whose trigger would fire while their window is still open.
    pub fn premature(&self, windows: &SlotWindows) -> Vec<Slot> {
        Slot::iter()
            .filter(|slot| self.at(*slot) < windows.window(*slot).end)
            .collect()
    }
}

impl Default for AbsentTriggers {
    fn default() -> Self {
        Self {
            morning: clock(9, 51),
            evening: clock(17, 46),
            grace: Duration::minutes(1),
        }
    }
}

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn classifies_default_windows() {
        let windows = SlotWindows::default();

        assert_eq!(windows.classify(t(9, 0)), Some(Slot::Morning));
        assert_eq!(windows.classify(t(9, 50)), Some(Slot::Morning));
        assert_eq!(windows.classify(t(17, 0)), Some(Slot::Evening));
        assert_eq!(windows.classify(t(17, 45)), Some(Slot::Evening));
    }

    #[test]
    fn every_minute_outside_windows_is_unclassified() {
        let windows = SlotWindows::default();

        for minute in 0..24 * 60 {
            let time = t(minute / 60, minute % 60);
            let inside = (t(9, 0) <= time && time < t(9, 51)) || (t(17, 0) <= time && time < t(17, 46));
            if !inside {
                assert_eq!(windows.classify(time), None, "{time} should be outside");
            }
        }
    }

    #[test]
    fn window_end_is_exclusive() {
        let windows = SlotWindows::default();

        assert_eq!(windows.classify(t(9, 51)), None);
        assert_eq!(windows.classify(t(17, 46)), None);
        assert_eq!(windows.classify(NaiveTime::from_hms_opt(9, 50, 59).unwrap()), Some(Slot::Morning));
    }

    #[test]
    fn parses_and_describes_windows() {
        let morning: SlotWindow = "09:00-09:51".parse().unwrap();
        let evening: SlotWindow = "17:00-17:46".parse().unwrap();
        let windows = SlotWindows::new(morning, evening).unwrap();

        assert_eq!(windows, SlotWindows::default());
        assert_eq!(windows.describe(), "9:00–9:50 AM or 5:00–5:45 PM");
    }

    #[test]
    fn rejects_bad_windows() {
        assert!("09:00".parse::<SlotWindow>().is_err());
        assert!("10:00-09:00".parse::<SlotWindow>().is_err());
        assert!("25:00-26:00".parse::<SlotWindow>().is_err());

        let a: SlotWindow = "09:00-12:00".parse().unwrap();
        let b: SlotWindow = "11:00-13:00".parse().unwrap();
        assert!(SlotWindows::new(a, b).is_err());
    }

    #[test]
    fn flags_triggers_inside_open_window() {
        let windows = SlotWindows::default();
        let triggers = AbsentTriggers {
            morning: t(21, 55),
            evening: t(17, 30),
            ..AbsentTriggers::default()
        };

        assert_eq!(triggers.premature(&windows), vec![Slot::Evening]);
        assert!(AbsentTriggers::default().premature(&windows).is_empty());
    }

    #[test]
    fn triggers_fire_only_within_their_minute() {
        let triggers = AbsentTriggers::default();
        let secs = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();

        assert!(!triggers.fires(Slot::Morning, secs(9, 50, 59)));
        assert!(triggers.fires(Slot::Morning, secs(9, 51, 0)));
        assert!(triggers.fires(Slot::Morning, secs(9, 51, 59)));
        assert!(!triggers.fires(Slot::Morning, secs(9, 52, 0)));
        assert!(!triggers.fires(Slot::Morning, t(18, 0)));
        assert!(triggers.fires(Slot::Evening, secs(17, 46, 30)));
        assert!(!triggers.fires(Slot::Evening, t(23, 0)));
    }

    #[test]
    fn trigger_near_midnight_stops_at_end_of_day() {
        let triggers = AbsentTriggers {
            evening: t(23, 59),
            grace: Duration::minutes(5),
            ..AbsentTriggers::default()
        };

        assert!(triggers.fires(Slot::Evening, NaiveTime::from_hms_opt(23, 59, 59).unwrap()));
        assert!(!triggers.fires(Slot::Evening, t(0, 2)));
    }

    #[test]
    fn window_across_noon_names_both_halves() {
        let window: SlotWindow = "11:00-13:00".parse().unwrap();

        assert_eq!(window.to_string(), "11:00 AM–12:59 PM");
    }

    #[test]
    fn slot_names_are_lowercase() {
        assert_eq!(Slot::Morning.to_string(), "morning");
        assert_eq!("evening".parse::<Slot>().unwrap(), Slot::Evening);
    }
}
