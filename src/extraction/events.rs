//! Connection log extraction.
//!
//! The log sits at the end of the `Adsl` section, newest entry first:
//!
//! ```text
//!   14/10/2026 à 08:12:40       Connexion    12000 / 800
//!   14/10/2026 à 08:11:55       Déconnexion
//!   Mise en route               Connexion    11800 / 795
//! ```
//!
//! Dates are wall-clock time in the device's zone. `Mise en route` marks the
//! entry recorded at the last device start; it gets its instant from the
//! uptime once the whole report is parsed.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ReportError;
use crate::extraction::values::parse_int;
use crate::logging::structured::LogContext;
use crate::storage::models::{ConnectionEvent, EventKind};

/// Format of explicit log dates.
pub const LOG_DATE_FORMAT: &str = "%d/%m/%Y à %H:%M:%S";

lazy_static! {
    static ref EVENT_PATTERN: Regex = Regex::new(
        r"(?m)^[ \t]*(?:(\d{1,2}/\d{1,2}/\d{4} à \d{1,2}:\d{2}:\d{2})|Mise en route)[ \t]+(\S+)(?:[ \t]+(\d+)[ \t]*/[ \t]*(\d+))?[ \t]*\r?$"
    ).unwrap();
}

/// When a log entry happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStamp {
    At(DateTime<Utc>),
    /// Recorded at the last device start.
    Boot,
}

/// Log entry before boot-relative stamps are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub stamp: EventStamp,
    pub kind: EventKind,
    pub rate_down: Option<i64>,
    pub rate_up: Option<i64>,
}

impl LogEntry {
    pub fn is_boot(&self) -> bool {
        self.stamp == EventStamp::Boot
    }

    /// Turn into a stored event, using `boot_time` for boot-relative entries.
    pub fn resolve(self, boot_time: DateTime<Utc>) -> ConnectionEvent {
        let (timestamp, boot_relative) = match self.stamp {
            EventStamp::At(at) => (at, false),
            EventStamp::Boot => (boot_time, true),
        };
        ConnectionEvent {
            timestamp,
            boot_relative,
            kind: self.kind,
            rate_down: self.rate_down,
            rate_up: self.rate_up,
        }
    }
}

/// Map a localized event phrase to its kind.
pub fn parse_event_kind(phrase: &str) -> Result<EventKind, ReportError> {
    match phrase {
        "Connexion" => Ok(EventKind::Connect),
        "Déconnexion" => Ok(EventKind::Disconnect),
        other => Err(ReportError::UnknownEventKind(other.to_string())),
    }
}

/// Convert a log date printed in the device's zone to UTC.
///
/// A wall-clock time repeated by a DST change resolves to its first
/// occurrence; one skipped by a DST change is an error.
pub fn parse_log_date<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<DateTime<Utc>, ReportError> {
    let invalid = || ReportError::InvalidTimestamp(raw.to_string());
    let naive = NaiveDateTime::parse_from_str(raw, LOG_DATE_FORMAT).map_err(|_| invalid())?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(invalid()),
    }
}

/// Parse the connection log out of the `Adsl` section body.
///
/// Entries come back oldest first.
pub fn parse_event_log<Tz: TimeZone>(
    body: &str,
    tz: &Tz,
    ctx: &LogContext,
) -> Result<Vec<LogEntry>, ReportError> {
    let mut entries = Vec::new();

    for caps in EVENT_PATTERN.captures_iter(body) {
        let stamp = match caps.get(1) {
            Some(date) => EventStamp::At(parse_log_date(date.as_str(), tz)?),
            None => EventStamp::Boot,
        };

        let kind = parse_event_kind(&caps[2])?;

        let (rate_down, rate_up) = match (kind, caps.get(3), caps.get(4)) {
            (EventKind::Connect, Some(down), Some(up)) => (
                Some(parse_int("event_rate", down.as_str())?),
                Some(parse_int("event_rate", up.as_str())?),
            ),
            _ => (None, None),
        };

        entries.push(LogEntry {
            stamp,
            kind,
            rate_down,
            rate_up,
        });
    }

    entries.reverse();

    let unordered = entries.windows(2).any(|pair| match (pair[0].stamp, pair[1].stamp) {
        (EventStamp::At(a), EventStamp::At(b)) => a > b,
        _ => false,
    });
    if unordered {
        log::warn!("{} EVENT_LOG_UNORDERED entries={}", ctx, entries.len());
    }

    log::debug!(
        "{} EVENT_LOG_PARSED entries={} boot_entries={}",
        ctx,
        entries.len(),
        entries.iter().filter(|e| e.is_boot()).count()
    );

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    const LOG: &str = "
  Journal de connexion adsl :
  ---------------------------

    Date                        Etat         Débit (kb/s)
    ------------------------    ----------   ------------
    14/10/2026 à 08:12:40       Connexion    12000 / 800
    14/10/2026 à 08:11:55       Déconnexion
    Mise en route               Connexion    11800 / 795
";

    fn ctx() -> LogContext {
        LogContext::new("cycle-test")
    }

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_entries_are_oldest_first() {
        let entries = parse_event_log(LOG, &Utc, &ctx()).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].stamp, EventStamp::Boot);
        assert_eq!(entries[0].kind, EventKind::Connect);
        assert_eq!((entries[0].rate_down, entries[0].rate_up), (Some(11800), Some(795)));

        assert_eq!(entries[1].stamp, EventStamp::At(utc("2026-10-14T08:11:55Z")));
        assert_eq!(entries[1].kind, EventKind::Disconnect);
        assert_eq!(entries[1].rate_down, None);

        assert_eq!(entries[2].stamp, EventStamp::At(utc("2026-10-14T08:12:40Z")));
        assert_eq!(entries[2].kind, EventKind::Connect);
        assert_eq!((entries[2].rate_down, entries[2].rate_up), (Some(12000), Some(800)));
    }

    #[test]
    fn test_explicit_timestamps_ascend() {
        let log = "\
    03/01/2026 à 10:00:00       Connexion    12000 / 800
    02/01/2026 à 23:59:59       Déconnexion
    01/01/2026 à 00:00:01       Connexion    11000 / 700
";
        let entries = parse_event_log(log, &Utc, &ctx()).unwrap();
        let stamps: Vec<_> = entries
            .iter()
            .map(|e| match e.stamp {
                EventStamp::At(at) => at,
                EventStamp::Boot => panic!("unexpected boot entry"),
            })
            .collect();
        assert_eq!(stamps.len(), 3);
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_local_dates_are_converted_to_utc() {
        let paris_summer = FixedOffset::east_opt(2 * 3600).unwrap();
        let entries = parse_event_log(LOG, &paris_summer, &ctx()).unwrap();
        assert_eq!(entries[2].stamp, EventStamp::At(utc("2026-10-14T06:12:40Z")));
    }

    #[test]
    fn test_unknown_event_kind() {
        let log = "    14/10/2026 à 08:12:40       Resynchro    12000 / 800\n";
        assert_eq!(
            parse_event_log(log, &Utc, &ctx()),
            Err(ReportError::UnknownEventKind("Resynchro".to_string()))
        );
    }

    #[test]
    fn test_invalid_date() {
        let log = "    31/02/2026 à 08:12:40       Connexion\n";
        assert_eq!(
            parse_event_log(log, &Utc, &ctx()),
            Err(ReportError::InvalidTimestamp("31/02/2026 à 08:12:40".to_string()))
        );
    }

    #[test]
    fn test_no_entries() {
        let body = "  Débit ATM             12000 kb/s         800 kb/s\n";
        assert_eq!(parse_event_log(body, &Utc, &ctx()), Ok(Vec::new()));
    }

    #[test]
    fn test_resolve_boot_entry() {
        let boot = utc("2026-10-12T03:00:00Z");
        let entries = parse_event_log(LOG, &Utc, &ctx()).unwrap();
        let events: Vec<_> = entries.into_iter().map(|e| e.resolve(boot)).collect();

        assert!(events[0].boot_relative);
        assert_eq!(events[0].timestamp, boot);
        assert!(!events[2].boot_relative);
        assert_eq!(events[2].timestamp, utc("2026-10-14T08:12:40Z"));
    }
}
