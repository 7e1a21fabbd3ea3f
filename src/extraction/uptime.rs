//! Device uptime and boot instant.
//!
//! The connection log prints the entry recorded at the last device start as
//! `Mise en route` instead of a date. Its instant is recovered from the uptime
//! printed in the general information section: `boot = now - uptime`, to the
//! minute since the uptime has no finer unit.

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::ReportError;

/// Heading of the section holding the uptime line.
pub const GENERAL_SECTION: &str = "Informations générales";

lazy_static! {
    static ref UPTIME_PATTERN: Regex = Regex::new(
        r"Temps depuis la mise en route[ \t]+(?:(\d+)[ \t]+jours?,?)?[ \t]*(?:(\d+)[ \t]+heures?,?)?[ \t]*(?:(\d+)[ \t]+minutes?)?"
    ).unwrap();
}

/// Time since the last device start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Uptime {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Uptime {
    /// `None` when the components do not fit in a `Duration`.
    pub fn to_duration(&self) -> Option<Duration> {
        Duration::try_days(self.days)?
            .checked_add(&Duration::try_hours(self.hours)?)?
            .checked_add(&Duration::try_minutes(self.minutes)?)
    }
}

/// Parse the uptime line out of the general information section.
///
/// Each component is optional and defaults to zero, but at least one must be
/// present.
pub fn parse_uptime(body: &str) -> Result<Uptime, ReportError> {
    let missing = || ReportError::MissingField("uptime".to_string());
    let caps = UPTIME_PATTERN.captures(body).ok_or_else(missing)?;

    if (1..=3).all(|i| caps.get(i).is_none()) {
        return Err(missing());
    }

    let component = |i: usize| -> Result<i64, ReportError> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().map_err(|_| missing()),
            None => Ok(0),
        }
    };

    Ok(Uptime {
        days: component(1)?,
        hours: component(2)?,
        minutes: component(3)?,
    })
}

/// Instant of the last device start.
///
/// An uptime too large to represent is `MissingField("uptime")`; one that
/// reaches before the earliest representable instant is `InvalidTimestamp`.
pub fn resolve_boot_time(
    uptime: &Uptime,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ReportError> {
    let elapsed = uptime
        .to_duration()
        .ok_or_else(|| ReportError::MissingField("uptime".to_string()))?;

    now.checked_sub_signed(elapsed).ok_or_else(|| {
        ReportError::InvalidTimestamp(format!(
            "{} minus {} days, {} hours, {} minutes",
            now, uptime.days, uptime.hours, uptime.minutes
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_full_uptime() {
        let body = "  Modèle                         Freebox ADSL\n  Temps depuis la mise en route  2 jours, 3 heures, 15 minutes\n";
        assert_eq!(
            parse_uptime(body),
            Ok(Uptime {
                days: 2,
                hours: 3,
                minutes: 15
            })
        );
    }

    #[test]
    fn test_parse_partial_uptime() {
        assert_eq!(
            parse_uptime("Temps depuis la mise en route  1 heure, 1 minute\n"),
            Ok(Uptime {
                days: 0,
                hours: 1,
                minutes: 1
            })
        );
        assert_eq!(
            parse_uptime("Temps depuis la mise en route  1 jour, 5 minutes\n"),
            Ok(Uptime {
                days: 1,
                hours: 0,
                minutes: 5
            })
        );
        assert_eq!(
            parse_uptime("Temps depuis la mise en route  4 jours\n"),
            Ok(Uptime {
                days: 4,
                hours: 0,
                minutes: 0
            })
        );
    }

    #[test]
    fn test_missing_uptime() {
        let missing = Err(ReportError::MissingField("uptime".to_string()));
        assert_eq!(parse_uptime("  Modèle  Freebox ADSL\n"), missing);
        assert_eq!(parse_uptime("Temps depuis la mise en route  inconnu\n"), missing);
    }

    #[test]
    fn test_boot_time_is_now_minus_uptime() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let uptime = parse_uptime("Temps depuis la mise en route  2 jours, 3 heures, 15 minutes").unwrap();

        let boot = resolve_boot_time(&uptime, now).unwrap();
        assert_eq!(boot, Utc.with_ymd_and_hms(2026, 10, 16, 8, 45, 0).unwrap());
        assert_eq!(
            now - boot,
            Duration::days(2) + Duration::hours(3) + Duration::minutes(15)
        );
    }

    #[test]
    fn test_huge_uptime_is_an_error() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

        // Fits in a Duration, but lands before the earliest DateTime.
        let uptime =
            parse_uptime("Temps depuis la mise en route  99999999999 jours, 3 heures").unwrap();
        assert!(uptime.to_duration().is_some());
        assert!(matches!(
            resolve_boot_time(&uptime, now),
            Err(ReportError::InvalidTimestamp(_))
        ));

        // Does not fit in a Duration at all.
        let uptime = parse_uptime("Temps depuis la mise en route  999999999999 jours").unwrap();
        assert_eq!(uptime.to_duration(), None);
        assert_eq!(
            resolve_boot_time(&uptime, now),
            Err(ReportError::MissingField("uptime".to_string()))
        );

        let uptime = Uptime {
            days: 0,
            hours: i64::MAX,
            minutes: 0,
        };
        assert_eq!(uptime.to_duration(), None);
    }
}
