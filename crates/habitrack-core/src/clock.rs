//! Source of "today" for streak and completion calculations.

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Anything that can report the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Which time zone decides where one day ends and the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneSetting {
    /// The host's local time zone
    #[default]
    Local,
    Utc,
    /// Fixed offset from UTC, e.g. `+05:30`
    Fixed(FixedOffset),
}

impl FromStr for TimeZoneSetting {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(TimeZoneSetting::Local),
            "utc" | "z" => Ok(TimeZoneSetting::Utc),
            other => parse_offset(other).map(TimeZoneSetting::Fixed).ok_or_else(|| {
                ValidationError::invalid(
                    "timezone",
                    format!("'{s}' is not \"local\", \"utc\" or an offset like +05:30"),
                )
            }),
        }
    }
}

impl fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneSetting::Local => write!(f, "local"),
            TimeZoneSetting::Utc => write!(f, "utc"),
            TimeZoneSetting::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl Serialize for TimeZoneSetting {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeZoneSetting {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse `+HH:MM`, `-HH:MM` or `+HH`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Wall clock in a configured time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    zone: TimeZoneSetting,
}

impl SystemClock {
    pub fn new(zone: TimeZoneSetting) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self.zone {
            TimeZoneSetting::Local => Local::now().date_naive(),
            TimeZoneSetting::Utc => Utc::now().date_naive(),
            TimeZoneSetting::Fixed(offset) => Utc::now().with_timezone(&offset).date_naive(),
        }
    }
}

/// Clock frozen on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_zones() {
        assert_eq!("local".parse::<TimeZoneSetting>().unwrap(), TimeZoneSetting::Local);
        assert_eq!("UTC".parse::<TimeZoneSetting>().unwrap(), TimeZoneSetting::Utc);
    }

    #[test]
    fn parses_fixed_offsets() {
        let zone: TimeZoneSetting = "+05:30".parse().unwrap();
        assert_eq!(
            zone,
            TimeZoneSetting::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap())
        );

        let zone: TimeZoneSetting = "-08".parse().unwrap();
        assert_eq!(
            zone,
            TimeZoneSetting::Fixed(FixedOffset::west_opt(8 * 3600).unwrap())
        );
    }

    #[test]
    fn rejects_garbage_zones() {
        assert!("Mars/Olympus".parse::<TimeZoneSetting>().is_err());
        assert!("+25:00".parse::<TimeZoneSetting>().is_err());
        assert!("+05:75".parse::<TimeZoneSetting>().is_err());
        assert!("".parse::<TimeZoneSetting>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for s in ["local", "utc", "+05:30", "-08:00"] {
            let zone: TimeZoneSetting = s.parse().unwrap();
            assert_eq!(zone.to_string().parse::<TimeZoneSetting>().unwrap(), zone);
        }
    }

    #[test]
    fn fixed_clock_reports_its_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(FixedClock(date).today(), date);

        let boxed: Box<dyn Clock> = Box::new(FixedClock(date));
        assert_eq!(boxed.today(), date);
    }

    #[test]
    fn utc_clock_matches_chrono() {
        // Guard against running exactly across midnight.
        let before = Utc::now().date_naive();
        let today = SystemClock::new(TimeZoneSetting::Utc).today();
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(
            parse_date("2026-10-18").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        );
        assert!(parse_date("18/10/2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }
}
