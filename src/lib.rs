//! fbxstats Core - Router status report ingestion
//!
//! This crate turns the plain-text status report published by a Freebox
//! router into line telemetry rows. The implementation prioritizes:
//!
//! 1. **Correctness** - A report is fully parsed before anything is written
//! 2. **Logging** - Every decision point logged with full context
//! 3. **Idempotence** - Re-ingesting the same log never duplicates events
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `pipeline` - Cycle orchestrator, event merge, parsed snapshot
//! - `extraction` - Section splitter and per-section extractors
//! - `storage` - Telemetry store trait, SQLite and in-memory stores
//! - `fetch` - Report sources (HTTP, file)
//! - `config` - Defaults and environment overrides
//! - `logging` - Structured logging with cycle context

pub mod config;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod storage;

#[cfg(test)]
mod testdata;

pub use config::Config;
pub use error::{ConfigError, FetchError, IngestError, ReportError, StoreError};
pub use fetch::{FileReportSource, HttpReportSource, ReportSource};
pub use pipeline::context::CycleContext;
pub use pipeline::ingestion::{ingest_report, run_cycle, CycleSummary};
pub use pipeline::snapshot::ReportSnapshot;
pub use storage::memory::MemoryStore;
pub use storage::sqlite::SqliteStore;
pub use storage::TelemetryStore;

/// Initialize the process logger.
///
/// Level defaults to `info`; `RUST_LOG` overrides it. Safe to call twice.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
