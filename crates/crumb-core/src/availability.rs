//! # Opening Hours
//!
//! Decides whether a restaurant is open at a given moment.
//!
//! ## Check Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Availability Check                                 │
//! │                                                                         │
//! │  now (local time)                                                       │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  weekday label ("MON") ──► schedule entry for the day?                  │
//! │     │                          │                                        │
//! │     │                          └── none ──► CLOSED (schedule gap)       │
//! │     ▼                                                                   │
//! │  any window contains hh:mm? ──► yes ──► OPEN                            │
//! │     (plus yesterday's overnight windows still running)                  │
//! │                             └─► no ───► CLOSED (outside hours)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Window Comparison
//! Two modes exist. [`WindowComparison::Combined`] (the default) compares
//! minutes since midnight, so 10:05 falls inside 09:00-17:00.
//! [`WindowComparison::PerField`] compares hour and minute independently
//! (`h >= sh && m >= sm && h <= eh && m <= em`), which rejects 10:05 for
//! 09:00-17:00. It is kept only for deployments that must reproduce the
//! legacy app's answers.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::Restaurant;

// =============================================================================
// Day of Week
// =============================================================================

/// Day tag used by the schedule wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    #[serde(rename = "SUN")]
    Sunday,
    #[serde(rename = "MON")]
    Monday,
    #[serde(rename = "TUE")]
    Tuesday,
    #[serde(rename = "WED")]
    Wednesday,
    #[serde(rename = "THU")]
    Thursday,
    #[serde(rename = "FRI")]
    Friday,
    #[serde(rename = "SAT")]
    Saturday,
}

impl DayOfWeek {
    /// The day before, wrapping Sunday back to Saturday.
    pub fn previous(&self) -> DayOfWeek {
        match self {
            DayOfWeek::Sunday => DayOfWeek::Saturday,
            DayOfWeek::Monday => DayOfWeek::Sunday,
            DayOfWeek::Tuesday => DayOfWeek::Monday,
            DayOfWeek::Wednesday => DayOfWeek::Tuesday,
            DayOfWeek::Thursday => DayOfWeek::Wednesday,
            DayOfWeek::Friday => DayOfWeek::Thursday,
            DayOfWeek::Saturday => DayOfWeek::Friday,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "SUN",
            DayOfWeek::Monday => "MON",
            DayOfWeek::Tuesday => "TUE",
            DayOfWeek::Wednesday => "WED",
            DayOfWeek::Thursday => "THU",
            DayOfWeek::Friday => "FRI",
            DayOfWeek::Saturday => "SAT",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Time of Day
// =============================================================================

/// Hour and minute on a 24h clock.
///
/// Serialized as `["HH", "MM"]`, the shape the restaurant API uses.
/// Numeric pairs (`[9, 0]`) are accepted on input too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeOfDayWire", into = "[String; 2]")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Creates a time, rejecting hours above 23 and minutes above 59.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 {
            return Err(ValidationError::OutOfRange {
                field: "hour".to_string(),
                min: 0,
                max: 23,
            });
        }
        if minute > 59 {
            return Err(ValidationError::OutOfRange {
                field: "minute".to_string(),
                min: 0,
                max: 59,
            });
        }
        Ok(TimeOfDay { hour, minute })
    }

    /// Reads the clock fields of any chrono time value.
    pub fn of<T: Timelike>(now: &T) -> Self {
        TimeOfDay {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn minutes_since_midnight(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Parses `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "time".to_string(),
            reason: format!("expected HH:MM, got '{}'", s),
        };
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = h.trim().parse::<u8>().map_err(|_| invalid())?;
        let minute = m.trim().parse::<u8>().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeOfDayWire {
    Text([String; 2]),
    Numeric([u8; 2]),
}

impl TryFrom<TimeOfDayWire> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(wire: TimeOfDayWire) -> Result<Self, Self::Error> {
        match wire {
            TimeOfDayWire::Numeric([hour, minute]) => TimeOfDay::new(hour, minute),
            TimeOfDayWire::Text([hour, minute]) => {
                let parse = |field: &str, value: &str| {
                    value
                        .trim()
                        .parse::<u8>()
                        .map_err(|_| ValidationError::InvalidFormat {
                            field: field.to_string(),
                            reason: format!("'{}' is not a number", value),
                        })
                };
                TimeOfDay::new(parse("hour", &hour)?, parse("minute", &minute)?)
            }
        }
    }
}

impl From<TimeOfDay> for [String; 2] {
    fn from(time: TimeOfDay) -> Self {
        [format!("{:02}", time.hour), format!("{:02}", time.minute)]
    }
}

// =============================================================================
// Windows & Schedule
// =============================================================================

/// How a time of day is matched against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowComparison {
    /// Minutes since midnight, inclusive at both ends.
    #[default]
    Combined,
    /// Legacy independent hour/minute comparison.
    PerField,
}

impl FromStr for WindowComparison {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "combined" => Ok(WindowComparison::Combined),
            "per_field" | "per-field" | "legacy" => Ok(WindowComparison::PerField),
            other => Err(ValidationError::InvalidFormat {
                field: "window_comparison".to_string(),
                reason: format!("unknown mode '{}', expected combined or per_field", other),
            }),
        }
    }
}

/// A contiguous opening interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningWindow {
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl OpeningWindow {
    pub fn new(start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        OpeningWindow {
            start_time,
            end_time,
        }
    }

    /// End before start: the window closes on the following day.
    pub fn is_overnight(&self) -> bool {
        self.end_time < self.start_time
    }

    /// True when an overnight window opened the day before still covers `time`.
    pub fn contains_after_midnight(&self, time: TimeOfDay) -> bool {
        self.is_overnight() && time <= self.end_time
    }

    /// True when `time` falls in the window on the day it opens.
    ///
    /// An overnight window (22:00-02:00) only covers 22:00-23:59 here; the
    /// part after midnight belongs to the next day, see
    /// [`OpeningWindow::contains_after_midnight`].
    pub fn contains(&self, time: TimeOfDay, mode: WindowComparison) -> bool {
        match mode {
            WindowComparison::Combined => {
                let t = time.minutes_since_midnight();
                let start = self.start_time.minutes_since_midnight();
                let end = self.end_time.minutes_since_midnight();
                if self.is_overnight() {
                    t >= start
                } else {
                    start <= t && t <= end
                }
            }
            WindowComparison::PerField => {
                time.hour >= self.start_time.hour
                    && time.minute >= self.start_time.minute
                    && time.hour <= self.end_time.hour
                    && time.minute <= self.end_time.minute
            }
        }
    }
}

/// Opening windows for one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningTime {
    pub day: DayOfWeek,
    #[serde(default)]
    pub times: Vec<OpeningWindow>,
}

/// A restaurant's weekly schedule; days without an entry are closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantSchedule(pub Vec<OpeningTime>);

impl RestaurantSchedule {
    pub fn new(days: Vec<OpeningTime>) -> Self {
        RestaurantSchedule(days)
    }

    /// The entry for a day; the first one wins if the day is listed twice.
    pub fn for_day(&self, day: DayOfWeek) -> Option<&OpeningTime> {
        self.0.iter().find(|entry| entry.day == day)
    }
}

// =============================================================================
// Checks
// =============================================================================

/// True when any of today's windows contains the current time.
///
/// `now` is whatever local-time value the caller holds; the core never
/// reads the clock itself.
pub fn is_open<T>(schedule: &RestaurantSchedule, now: &T, mode: WindowComparison) -> bool
where
    T: Datelike + Timelike,
{
    matches!(evaluate(schedule, now, mode), Availability::Open)
}

/// Why a restaurant cannot take the order right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReason {
    /// Switched off by the restaurant.
    Unavailable,
    /// No schedule entry for today.
    ScheduleGap,
    /// Today has windows but none contains the current time.
    OutsideOpeningHours,
}

/// Result of an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum Availability {
    Open,
    Closed(ClosedReason),
}

impl Availability {
    pub fn is_open(&self) -> bool {
        matches!(self, Availability::Open)
    }
}

/// Full check for a restaurant: the manual switch first, then the schedule.
pub fn check_availability<T>(restaurant: &Restaurant, now: &T, mode: WindowComparison) -> Availability
where
    T: Datelike + Timelike,
{
    if !restaurant.is_available {
        return Availability::Closed(ClosedReason::Unavailable);
    }
    evaluate(&restaurant.schedule, now, mode)
}

fn evaluate<T>(schedule: &RestaurantSchedule, now: &T, mode: WindowComparison) -> Availability
where
    T: Datelike + Timelike,
{
    let day = DayOfWeek::from(now.weekday());
    let time = TimeOfDay::of(now);

    if mode == WindowComparison::Combined {
        let carried_over = schedule.for_day(day.previous()).is_some_and(|yesterday| {
            yesterday
                .times
                .iter()
                .any(|window| window.contains_after_midnight(time))
        });
        if carried_over {
            return Availability::Open;
        }
    }

    let Some(today) = schedule.for_day(day) else {
        return Availability::Closed(ClosedReason::ScheduleGap);
    };

    if today.times.iter().any(|window| window.contains(time, mode)) {
        Availability::Open
    } else {
        Availability::Closed(ClosedReason::OutsideOpeningHours)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    /// 2024-01-01 was a Monday.
    fn monday(hour: u32, minute: u32) -> NaiveDateTime {
        at(2024, 1, 1, hour, minute)
    }

    fn sunday(hour: u32, minute: u32) -> NaiveDateTime {
        at(2024, 1, 7, hour, minute)
    }

    fn window(start: &str, end: &str) -> OpeningWindow {
        OpeningWindow::new(start.parse().unwrap(), end.parse().unwrap())
    }

    fn monday_nine_to_five() -> RestaurantSchedule {
        RestaurantSchedule::new(vec![OpeningTime {
            day: DayOfWeek::Monday,
            times: vec![window("09:00", "17:00")],
        }])
    }

    #[test]
    fn test_open_at_lunchtime_with_combined_comparison() {
        let schedule = monday_nine_to_five();
        assert!(is_open(&schedule, &monday(12, 30), WindowComparison::Combined));
    }

    /// The two comparison modes disagree whenever the minute of `now` is
    /// past the window's end minute.
    #[test]
    fn test_per_field_and_combined_disagree() {
        let schedule = monday_nine_to_five();

        assert!(is_open(&schedule, &monday(10, 5), WindowComparison::Combined));
        assert!(!is_open(&schedule, &monday(10, 5), WindowComparison::PerField));

        assert!(!is_open(&schedule, &monday(12, 30), WindowComparison::PerField));

        // On the hour both agree.
        assert!(is_open(&schedule, &monday(12, 0), WindowComparison::PerField));
        assert!(is_open(&schedule, &monday(12, 0), WindowComparison::Combined));
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let schedule = monday_nine_to_five();
        assert!(is_open(&schedule, &monday(9, 0), WindowComparison::Combined));
        assert!(is_open(&schedule, &monday(17, 0), WindowComparison::Combined));
        assert!(!is_open(&schedule, &monday(8, 59), WindowComparison::Combined));
        assert!(!is_open(&schedule, &monday(17, 1), WindowComparison::Combined));
    }

    #[test]
    fn test_missing_day_is_closed_all_day() {
        let schedule = monday_nine_to_five();
        for hour in 0..24 {
            for mode in [WindowComparison::Combined, WindowComparison::PerField] {
                assert!(!is_open(&schedule, &sunday(hour, 30), mode));
            }
        }
    }

    #[test]
    fn test_any_window_matches() {
        let schedule = RestaurantSchedule::new(vec![OpeningTime {
            day: DayOfWeek::Monday,
            times: vec![window("08:00", "11:00"), window("18:00", "22:30")],
        }]);
        assert!(is_open(&schedule, &monday(19, 45), WindowComparison::Combined));
        assert!(!is_open(&schedule, &monday(14, 0), WindowComparison::Combined));
    }

    #[test]
    fn test_overnight_window() {
        let late = window("22:00", "02:00");
        assert!(late.is_overnight());
        assert!(late.contains("23:30".parse().unwrap(), WindowComparison::Combined));
        assert!(!late.contains("01:15".parse().unwrap(), WindowComparison::Combined));
        assert!(!late.contains("12:00".parse().unwrap(), WindowComparison::Combined));
        assert!(late.contains_after_midnight("01:15".parse().unwrap()));
        assert!(late.contains_after_midnight("02:00".parse().unwrap()));
        assert!(!late.contains_after_midnight("02:01".parse().unwrap()));
    }

    #[test]
    fn test_overnight_tail_belongs_to_next_day() {
        let schedule = RestaurantSchedule::new(vec![OpeningTime {
            day: DayOfWeek::Monday,
            times: vec![window("22:00", "02:00")],
        }]);
        let tuesday = |hour, minute| at(2024, 1, 2, hour, minute);

        assert!(!is_open(&schedule, &monday(1, 15), WindowComparison::Combined));
        assert!(is_open(&schedule, &monday(23, 30), WindowComparison::Combined));
        assert!(is_open(&schedule, &tuesday(1, 15), WindowComparison::Combined));
        assert!(!is_open(&schedule, &tuesday(2, 30), WindowComparison::Combined));
        assert_eq!(
            evaluate(&schedule, &tuesday(2, 30), WindowComparison::Combined),
            Availability::Closed(ClosedReason::ScheduleGap)
        );
    }

    #[test]
    fn test_saturday_night_runs_into_sunday() {
        let schedule = RestaurantSchedule::new(vec![OpeningTime {
            day: DayOfWeek::Saturday,
            times: vec![window("20:00", "01:00")],
        }]);
        assert!(is_open(&schedule, &sunday(0, 30), WindowComparison::Combined));
        assert!(!is_open(&schedule, &sunday(1, 30), WindowComparison::Combined));
    }

    #[test]
    fn test_check_availability_reasons() {
        let mut restaurant = Restaurant {
            id: "R1".to_string(),
            name: "Burger Barn".to_string(),
            is_available: true,
            minimum_order: Default::default(),
            location: Default::default(),
            schedule: monday_nine_to_five(),
            catalog: Default::default(),
        };

        let mode = WindowComparison::Combined;
        assert_eq!(check_availability(&restaurant, &monday(12, 30), mode), Availability::Open);
        assert_eq!(
            check_availability(&restaurant, &monday(20, 0), mode),
            Availability::Closed(ClosedReason::OutsideOpeningHours)
        );
        assert_eq!(
            check_availability(&restaurant, &sunday(12, 0), mode),
            Availability::Closed(ClosedReason::ScheduleGap)
        );

        restaurant.is_available = false;
        assert_eq!(
            check_availability(&restaurant, &monday(12, 30), mode),
            Availability::Closed(ClosedReason::Unavailable)
        );
    }

    #[test]
    fn test_schedule_wire_format() {
        let json = r#"[
            {"day":"MON","times":[{"startTime":["09","00"],"endTime":["17","00"]}]},
            {"day":"TUE","times":[{"startTime":[10,30],"endTime":[14,0]}]}
        ]"#;
        let schedule: RestaurantSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule, {
            let mut expected = monday_nine_to_five();
            expected.0.push(OpeningTime {
                day: DayOfWeek::Tuesday,
                times: vec![window("10:30", "14:00")],
            });
            expected
        });

        let out = serde_json::to_value(&schedule.0[0].times[0]).unwrap();
        assert_eq!(out["startTime"], serde_json::json!(["09", "00"]));
    }

    #[test]
    fn test_invalid_times_rejected() {
        assert!(TimeOfDay::new(24, 0).is_err());
        assert!(TimeOfDay::new(12, 60).is_err());
        assert!("noon".parse::<TimeOfDay>().is_err());
        assert!(serde_json::from_str::<TimeOfDay>(r#"["25","00"]"#).is_err());
    }

    #[test]
    fn test_weekday_labels() {
        assert_eq!(DayOfWeek::from(Weekday::Sun).label(), "SUN");
        assert_eq!(DayOfWeek::from(Weekday::Sat).to_string(), "SAT");
        assert_eq!(
            serde_json::to_string(&DayOfWeek::Wednesday).unwrap(),
            "\"WED\""
        );
    }

    #[test]
    fn test_window_comparison_parsing() {
        assert_eq!("combined".parse::<WindowComparison>().unwrap(), WindowComparison::Combined);
        assert_eq!("per_field".parse::<WindowComparison>().unwrap(), WindowComparison::PerField);
        assert!("sometimes".parse::<WindowComparison>().is_err());
    }
}
