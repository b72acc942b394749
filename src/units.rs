// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unit conversions and date helpers used when building Notion pages.

use chrono::{DateTime, Datelike, Utc, Weekday};

/// Round to two decimals, with halves rounded toward positive infinity.
pub fn two_decimals(num: f64) -> f64 {
    ((num + f64::EPSILON) * 100.0 + 0.5).floor() / 100.0
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    two_decimals(celsius * (9.0 / 5.0) + 32.0)
}

pub fn meters_per_sec_to_mph(meters_per_sec: f64) -> f64 {
    two_decimals(meters_per_sec * 2.237)
}

pub fn meters_to_miles(meters: f64) -> f64 {
    two_decimals(meters / 1609.0)
}

pub fn meters_to_feet(meters: f64) -> f64 {
    two_decimals(meters * 3.281)
}

/// Format a duration in seconds as `HH:MM:SS`, wrapping at 24 hours.
pub fn seconds_to_time(seconds: u64) -> String {
    let secs = seconds % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Day of the week (in UTC) of an RFC 3339 timestamp.
pub fn date_to_day_of_week(date: &str) -> Option<&'static str> {
    let parsed = DateTime::parse_from_rfc3339(date).ok()?.with_timezone(&Utc);
    Some(match parsed.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    })
}

/// Whether a unix timestamp (seconds) is in the past relative to `now`, after
/// subtracting `margin_secs` of safety margin.
pub fn is_expired(expires_at: i64, now: i64, margin_secs: i64) -> bool {
    expires_at < now + margin_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimals() {
        assert_eq!(two_decimals(1.005), 1.01);
        assert_eq!(two_decimals(2.344), 2.34);
        assert_eq!(two_decimals(-1.125), -1.12);
        assert_eq!(two_decimals(-2.346), -2.35);
        assert_eq!(two_decimals(0.0), 0.0);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(celsius_to_fahrenheit(20.0), 68.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
        assert_eq!(meters_to_miles(1609.0), 1.0);
        assert_eq!(meters_to_miles(8046.0), 5.0);
        assert_eq!(meters_to_feet(100.0), 328.1);
        assert_eq!(meters_per_sec_to_mph(10.0), 22.37);
    }

    #[test]
    fn test_seconds_to_time() {
        assert_eq!(seconds_to_time(0), "00:00:00");
        assert_eq!(seconds_to_time(3725), "01:02:05");
        assert_eq!(seconds_to_time(86_400 + 61), "00:01:01");
    }

    #[test]
    fn test_date_to_day_of_week() {
        assert_eq!(date_to_day_of_week("2022-01-30T09:58:22Z"), Some("Sunday"));
        assert_eq!(date_to_day_of_week("2024-07-04T23:30:00Z"), Some("Thursday"));
        assert_eq!(date_to_day_of_week("not a date"), None);
    }

    #[test]
    fn test_is_expired() {
        assert!(is_expired(99, 100, 0));
        assert!(!is_expired(100, 100, 0));
        assert!(!is_expired(200, 100, 0));
        assert!(is_expired(150, 100, 60));
    }
}
