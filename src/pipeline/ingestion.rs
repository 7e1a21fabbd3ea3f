//! Main ingestion pipeline.
//!
//! Coordinates one cycle:
//! 1. Fetch the report
//! 2. Parse the snapshot (every extractor runs before anything is written)
//! 3. Open a store transaction
//! 4. Read the event high-water mark and keep only new events
//! 5. Write line state, new events, link states
//! 6. Commit, or roll back on any failure or in dry-run mode

use chrono::TimeZone;
use serde::Serialize;

use crate::error::IngestError;
use crate::fetch::ReportSource;
use crate::logging::structured::LogContext;
use crate::storage::TelemetryStore;

use super::context::CycleContext;
use super::merge::select_new_events;
use super::snapshot::{compute_hash, ReportSnapshot};

/// Outcome of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSummary {
    pub cycle_id: String,
    pub report_sha256: String,
    pub events_observed: usize,
    pub events_stored: usize,
    pub links_stored: usize,
    /// False in dry-run mode.
    pub committed: bool,
}

/// Fetch a report and ingest it.
pub fn run_cycle<R, S, Tz>(
    ctx: &CycleContext,
    source: &R,
    store: &mut S,
    tz: &Tz,
) -> Result<CycleSummary, IngestError>
where
    R: ReportSource + ?Sized,
    S: TelemetryStore + ?Sized,
    Tz: TimeZone,
{
    let log_ctx = ctx.log_context();
    log::info!("{} CYCLE_START source={}", log_ctx, source.location());

    let raw = source.fetch().map_err(|e| {
        crate::log_error!(log_ctx, "FETCH_FAILED", error = e.to_string());
        e
    })?;

    log::debug!("{} REPORT_FETCHED bytes={}", log_ctx, raw.len());

    ingest_report(ctx, raw, store, tz)
}

/// Parse an already retrieved report and store its facts.
///
/// Either every fact of the cycle is written or none is.
pub fn ingest_report<S, Tz>(
    ctx: &CycleContext,
    raw: String,
    store: &mut S,
    tz: &Tz,
) -> Result<CycleSummary, IngestError>
where
    S: TelemetryStore + ?Sized,
    Tz: TimeZone,
{
    let log_ctx = ctx.log_context().with_report(&compute_hash(&raw));

    let snapshot = match ReportSnapshot::parse(raw, ctx.observed_at, tz, &log_ctx) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            crate::log_warn!(log_ctx, "REPORT_REJECTED", error = e.to_string());
            return Err(e.into());
        }
    };

    store.begin()?;

    let written = match write_snapshot(ctx, &snapshot, store, &log_ctx) {
        Ok(written) => written,
        Err(e) => {
            crate::log_error!(log_ctx, "CYCLE_ABORTED", error = e.to_string());
            if let Err(rollback_err) = store.rollback() {
                log::error!("{} ROLLBACK_FAILED error={}", log_ctx, rollback_err);
            }
            return Err(e);
        }
    };

    if ctx.dry_run {
        store.rollback()?;
        log::info!("{} CYCLE_DRY_RUN rolled_back=true", log_ctx);
    } else {
        store.commit()?;
    }

    let summary = CycleSummary {
        cycle_id: ctx.cycle_id.clone(),
        report_sha256: snapshot.sha256.clone(),
        events_observed: snapshot.events.len(),
        events_stored: written.events,
        links_stored: written.links,
        committed: !ctx.dry_run,
    };

    crate::log_info!(
        log_ctx,
        "CYCLE_COMPLETE",
        events_observed = summary.events_observed,
        events_stored = summary.events_stored,
        links_stored = summary.links_stored,
        committed = summary.committed,
    );

    Ok(summary)
}

struct Written {
    events: usize,
    links: usize,
}

fn write_snapshot<S>(
    ctx: &CycleContext,
    snapshot: &ReportSnapshot,
    store: &mut S,
    log_ctx: &LogContext,
) -> Result<Written, IngestError>
where
    S: TelemetryStore + ?Sized,
{
    let high_water = store.max_event_timestamp(&ctx.stream)?;
    let new_events = select_new_events(&snapshot.events, high_water, log_ctx)?;

    store.append_line_state(ctx.observed_at, &snapshot.line_state)?;

    if !new_events.is_empty() {
        store.append_events(&ctx.stream, &new_events)?;
    }

    for link in &snapshot.links {
        store.append_link_state(ctx.observed_at, link)?;
    }

    log::debug!(
        "{} SNAPSHOT_WRITTEN line_state=1 events={} links={}",
        log_ctx,
        new_events.len(),
        snapshot.links.len()
    );

    Ok(Written {
        events: new_events.len(),
        links: snapshot.links.len(),
    })
}
