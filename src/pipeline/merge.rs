//! Connection log merge.
//!
//! Each cycle sees the whole log the device still remembers, so most entries
//! were already stored by an earlier cycle. Only entries newer than the stored
//! high-water mark are kept.
//!
//! Boot-relative entries get a fresh instant every cycle (`now - uptime`, with
//! uptime truncated to the minute), so the same entry can come out up to a
//! minute later than the instant stored the first time. They are compared one
//! minute earlier than their resolved timestamp.

use chrono::{DateTime, Duration, Utc};

use crate::error::ReportError;
use crate::logging::structured::LogContext;
use crate::storage::models::ConnectionEvent;

/// Backward shift applied to boot-relative entries before comparison.
pub fn boot_tolerance() -> Duration {
    Duration::minutes(1)
}

/// Timestamp used to compare an event with the high-water mark.
pub fn effective_timestamp(event: &ConnectionEvent) -> DateTime<Utc> {
    if event.boot_relative {
        event
            .timestamp
            .checked_sub_signed(boot_tolerance())
            .unwrap_or(event.timestamp)
    } else {
        event.timestamp
    }
}

/// Keep the events strictly newer than `high_water`, preserving order.
///
/// `None` means nothing was stored yet and every event is new. An empty
/// `events` list is a data fault, not "nothing new".
pub fn select_new_events(
    events: &[ConnectionEvent],
    high_water: Option<DateTime<Utc>>,
    ctx: &LogContext,
) -> Result<Vec<ConnectionEvent>, ReportError> {
    if events.is_empty() {
        return Err(ReportError::NoEventsObserved);
    }

    let mark = high_water.unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut accepted = Vec::new();
    for event in events {
        let effective = effective_timestamp(event);
        if effective > mark {
            accepted.push(event.clone());
        } else {
            log::debug!(
                "{} EVENT_SKIPPED timestamp={} effective={} boot_relative={} high_water={}",
                ctx,
                event.timestamp,
                effective,
                event.boot_relative,
                mark
            );
        }
    }

    log::info!(
        "{} EVENTS_MERGED observed={} accepted={} high_water={:?}",
        ctx,
        events.len(),
        accepted.len(),
        high_water
    );

    Ok(accepted)
}
