//! Report snapshot.
//!
//! Everything derived from one fetched report, computed once when the
//! snapshot is built and never shared with another cycle.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ReportError;
use crate::extraction::events::parse_event_log;
use crate::extraction::line_state::{extract_line_state, ADSL_SECTION};
use crate::extraction::links::{extract_links, NETWORK_SECTION};
use crate::extraction::sections::{split_sections, Sections};
use crate::extraction::uptime::{parse_uptime, resolve_boot_time, Uptime, GENERAL_SECTION};
use crate::logging::structured::LogContext;
use crate::storage::models::{ConnectionEvent, LineState, LinkState};

/// Parsed facts of one status report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    #[serde(skip)]
    pub raw: String,
    pub sha256: String,
    #[serde(skip)]
    pub sections: Sections,
    /// Only read when the connection log has a boot-relative entry.
    pub uptime: Option<Uptime>,
    pub boot_time: Option<DateTime<Utc>>,
    pub line_state: LineState,
    /// Oldest first.
    pub events: Vec<ConnectionEvent>,
    pub links: Vec<LinkState>,
}

impl ReportSnapshot {
    /// Parse a raw report.
    ///
    /// `now` anchors boot-relative entries; `tz` is the zone the device prints
    /// its log dates in.
    pub fn parse<Tz: TimeZone>(
        raw: String,
        now: DateTime<Utc>,
        tz: &Tz,
        ctx: &LogContext,
    ) -> Result<Self, ReportError> {
        let sha256 = compute_hash(&raw);
        let sections = split_sections(&raw)?;

        log::debug!(
            "{} REPORT_SECTIONS sha256={} count={}",
            ctx,
            sha256,
            sections.len()
        );

        let adsl = sections.get(ADSL_SECTION)?;
        let line_state = extract_line_state(adsl, ctx)?;
        let entries = parse_event_log(adsl, tz, ctx)?;

        let (uptime, boot_time) = if entries.iter().any(|e| e.is_boot()) {
            let uptime = parse_uptime(sections.get(GENERAL_SECTION)?)?;
            let boot_time = resolve_boot_time(&uptime, now)?;
            log::debug!(
                "{} BOOT_TIME_RESOLVED uptime={:?} boot_time={}",
                ctx,
                uptime,
                boot_time
            );
            (Some(uptime), Some(boot_time))
        } else {
            (None, None)
        };

        let events = entries
            .into_iter()
            .map(|e| e.resolve(boot_time.unwrap_or(now)))
            .collect();

        let links = extract_links(sections.get(NETWORK_SECTION)?, ctx)?;

        Ok(Self {
            raw,
            sha256,
            sections,
            uptime,
            boot_time,
            line_state,
            events,
            links,
        })
    }
}

/// SHA-256 of the report text, hex encoded.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{EventKind, LinkStatus};
    use crate::testdata::STATUS_REPORT;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn parse(raw: &str) -> Result<ReportSnapshot, ReportError> {
        ReportSnapshot::parse(raw.to_string(), now(), &Utc, &LogContext::new("cycle-test"))
    }

    #[test]
    fn test_parse_fixture() {
        let snapshot = parse(STATUS_REPORT).unwrap();

        assert_eq!(snapshot.sha256.len(), 64);
        assert_eq!(snapshot.line_state.atm_bw_down, 12000);
        assert_eq!(snapshot.line_state.noise_margin_up, 6.0);

        assert_eq!(snapshot.events.len(), 3);
        let boot = Utc.with_ymd_and_hms(2026, 10, 16, 8, 45, 0).unwrap();
        assert_eq!(snapshot.boot_time, Some(boot));
        assert!(snapshot.events[0].boot_relative);
        assert_eq!(snapshot.events[0].timestamp, boot);
        assert_eq!(snapshot.events[2].kind, EventKind::Connect);
        assert!(snapshot.events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        assert_eq!(snapshot.links.len(), 1);
        assert_eq!(snapshot.links[0].state, LinkStatus::Up);
    }

    #[test]
    fn test_uptime_only_needed_for_boot_entries() {
        let raw = STATUS_REPORT
            .replace("Informations générales :\n========================\n", "")
            .replace("Mise en route               Connexion    11800 / 795\n", "");
        let snapshot = parse(&raw).unwrap();
        assert_eq!(snapshot.uptime, None);
        assert_eq!(snapshot.events.len(), 2);
        assert!(snapshot.events.iter().all(|e| !e.boot_relative));
    }

    #[test]
    fn test_missing_network_section() {
        let raw = STATUS_REPORT.replace("Réseau :", "Network :");
        assert_eq!(
            parse(&raw).unwrap_err(),
            ReportError::MissingSection("Réseau".to_string())
        );
    }

    #[test]
    fn test_negative_margin_in_full_report() {
        let raw = STATUS_REPORT.replace("6.00 dB", "-0.50 dB");
        let snapshot = parse(&raw).unwrap();
        assert_eq!(snapshot.line_state.noise_margin_up, -0.5);
    }

    #[test]
    fn test_garbled_uptime_is_rejected() {
        let raw = STATUS_REPORT.replace("2 jours, 3 heures", "99999999999 jours, 3 heures");
        assert!(matches!(
            parse(&raw).unwrap_err(),
            ReportError::InvalidTimestamp(_)
        ));
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(parse("").unwrap_err(), ReportError::MalformedReport);
    }

    #[test]
    fn test_serialized_facts_skip_raw_text() {
        let snapshot = parse(STATUS_REPORT).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("raw").is_none());
        assert_eq!(json["line_state"]["atm_bw_up"], 800);
        assert_eq!(json["links"][0]["state"], "UP");
    }

    #[test]
    fn test_compute_hash() {
        assert_eq!(
            compute_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
