use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Weekday};
use chrono_tz::Tz;
use serde::{de::Visitor, Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SendWindowError {
    #[error("Time of day `{0}` is malformed, expected HH:mm")]
    InvalidTimeOfDay(String),
    #[error("Send window start `{start}` must be earlier than end `{end}`")]
    InvalidWindow { start: TimeOfDay, end: TimeOfDay },
    #[error("Timestamp is outside of the supported range")]
    OutOfRange,
}

/// A local wall clock time, minute resolution. Parsed from and displayed
/// as `HH:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hours: u32,
    minutes: u32,
}

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u32) -> Result<Self, SendWindowError> {
        if hours > 23 || minutes > 59 {
            return Err(SendWindowError::InvalidTimeOfDay(format!(
                "{}:{}",
                hours, minutes
            )));
        }
        Ok(Self { hours, minutes })
    }

    pub fn minute_of_day(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

impl FromStr for TimeOfDay {
    type Err = SendWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SendWindowError::InvalidTimeOfDay(s.to_string());

        let parts = s.split(':').collect::<Vec<_>>();
        if parts.len() != 2 {
            return Err(malformed());
        }
        let hours = parts[0].parse::<u32>().map_err(|_| malformed())?;
        let minutes = parts[1].parse::<u32>().map_err(|_| malformed())?;
        TimeOfDay::new(hours, minutes).map_err(|_| malformed())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimeOfDayVisitor;

        impl<'de> Visitor<'de> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A time of day formatted as HH:mm")
            }

            fn visit_str<E>(self, value: &str) -> Result<TimeOfDay, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<TimeOfDay>()
                    .map_err(|_| E::custom(format!("Malformed time of day: {}", value)))
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}

/// The workspace policy for when reminder emails may actually go out:
/// a local time of day range plus an optional weekday restriction.
#[derive(Debug, Clone)]
pub struct SendWindow {
    pub timezone: Tz,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub weekdays_only: bool,
}

impl SendWindow {
    /// Moves a candidate send instant into the window. The instant is
    /// converted to workspace local wall clock and walked forward day by
    /// day until it lands on an allowed weekday inside `[start, end)`;
    /// an instant already inside the window is returned unchanged.
    ///
    /// The computed local day and time are authoritative. Around DST
    /// transitions the conversion back to an absolute instant resolves
    /// ambiguous wall clocks to the earliest instant and skips forward
    /// over nonexistent ones.
    pub fn clamp(&self, timestamp_millis: i64) -> Result<i64, SendWindowError> {
        if self.start >= self.end {
            return Err(SendWindowError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        let start = self.start.minute_of_day();
        let end = self.end.minute_of_day();

        let local = DateTime::from_timestamp_millis(timestamp_millis)
            .ok_or(SendWindowError::OutOfRange)?
            .with_timezone(&self.timezone);

        let mut day = local.date_naive();
        let mut minute = local.hour() * 60 + local.minute();
        let mut moved = false;

        // Terminates because every continue strictly advances the date.
        loop {
            let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
            if self.weekdays_only && weekend {
                day = next_day(day)?;
                minute = start;
                moved = true;
                continue;
            }
            if minute < start {
                minute = start;
                moved = true;
                break;
            }
            if minute >= end {
                day = next_day(day)?;
                minute = start;
                moved = true;
                continue;
            }
            break;
        }

        if !moved {
            return Ok(timestamp_millis);
        }

        let wall = day
            .and_hms_opt(minute / 60, minute % 60, 0)
            .ok_or(SendWindowError::OutOfRange)?;
        Ok(resolve_local(&self.timezone, wall)?.timestamp_millis())
    }
}

fn next_day(day: NaiveDate) -> Result<NaiveDate, SendWindowError> {
    day.succ_opt().ok_or(SendWindowError::OutOfRange)
}

fn resolve_local(tz: &Tz, wall: NaiveDateTime) -> Result<DateTime<Tz>, SendWindowError> {
    if let Some(resolved) = tz.from_local_datetime(&wall).earliest() {
        return Ok(resolved);
    }
    // The wall clock fell in a DST gap. Probe forward in half hour steps
    // until the clock exists again; gaps are at most a few hours.
    let mut probe = wall;
    for _ in 0..8 {
        probe += Duration::minutes(30);
        if let Some(resolved) = tz.from_local_datetime(&probe).earliest() {
            return Ok(resolved);
        }
    }
    Err(SendWindowError::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::America::New_York;

    fn window(start: &str, end: &str, weekdays_only: bool) -> SendWindow {
        SendWindow {
            timezone: New_York,
            start: start.parse().expect("Valid time of day"),
            end: end.parse().expect("Valid time of day"),
            weekdays_only,
        }
    }

    fn utc(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn ny(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> i64 {
        New_York
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn it_parses_time_of_day() {
        let t = "09:30".parse::<TimeOfDay>().unwrap();
        assert_eq!(t.minute_of_day(), 9 * 60 + 30);
        assert_eq!(t.to_string(), "09:30");

        for bad in &["9", "09:30:00", "24:00", "09:60", "ab:cd", ""] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn it_rejects_inverted_window() {
        let w = window("17:00", "09:00", false);
        assert!(matches!(
            w.clamp(0),
            Err(SendWindowError::InvalidWindow { .. })
        ));

        let w = window("09:00", "09:00", false);
        assert!(w.clamp(0).is_err());
    }

    #[test]
    fn it_moves_a_weekend_instant_to_monday_window_start() {
        // Saturday 2026-03-14 22:30 UTC is Saturday evening in New York
        let saturday = utc(2026, 3, 14, 22, 30);
        let w = window("09:00", "17:00", true);

        let clamped = w.clamp(saturday).unwrap();
        assert_eq!(clamped, ny(2026, 3, 16, 9, 0));

        let local = DateTime::from_timestamp_millis(clamped)
            .unwrap()
            .with_timezone(&New_York);
        assert_eq!(local.weekday(), Weekday::Mon);
        assert_eq!((local.hour(), local.minute()), (9, 0));
    }

    #[test]
    fn it_keeps_an_instant_already_inside_the_window() {
        // Wednesday 2026-03-11 14:23 New York, seconds included
        let inside = ny(2026, 3, 11, 14, 23) + 17 * 1000;
        let w = window("09:00", "17:00", true);
        assert_eq!(w.clamp(inside).unwrap(), inside);
    }

    #[test]
    fn it_snaps_an_early_instant_to_window_start_same_day() {
        let early = ny(2026, 3, 11, 6, 45);
        let w = window("09:00", "17:00", true);
        assert_eq!(w.clamp(early).unwrap(), ny(2026, 3, 11, 9, 0));
    }

    #[test]
    fn it_rolls_a_late_instant_to_the_next_day() {
        // Friday evening with weekdays_only rolls all the way to Monday
        let friday_evening = ny(2026, 3, 13, 19, 30);
        let w = window("09:00", "17:00", true);
        assert_eq!(w.clamp(friday_evening).unwrap(), ny(2026, 3, 16, 9, 0));

        // Without the weekday rule it lands on Saturday
        let w = window("09:00", "17:00", false);
        assert_eq!(w.clamp(friday_evening).unwrap(), ny(2026, 3, 14, 9, 0));
    }

    #[test]
    fn it_resolves_a_window_start_inside_a_dst_gap() {
        // US DST starts 2026-03-08 02:00 New York: 02:00-02:59 does not
        // exist. A window starting 02:30 resolves to the first existing
        // wall clock after the gap.
        let sunday_night = utc(2026, 3, 8, 6, 30); // 01:30 EST
        let w = window("02:30", "06:00", false);

        let clamped = w.clamp(sunday_night).unwrap();
        assert_eq!(clamped, ny(2026, 3, 8, 3, 0));
    }

    #[test]
    fn it_resolves_an_ambiguous_window_start_to_the_earliest_instant() {
        // US DST ends 2026-11-01 02:00 New York: 01:00-01:59 happens
        // twice. The first (EDT) occurrence wins.
        let just_after_midnight = utc(2026, 11, 1, 4, 30); // 00:30 EDT
        let w = window("01:30", "07:00", false);

        let clamped = w.clamp(just_after_midnight).unwrap();
        assert_eq!(clamped, utc(2026, 11, 1, 5, 30)); // 01:30 EDT
    }
}
