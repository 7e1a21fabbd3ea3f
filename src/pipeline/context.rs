//! Cycle context management.
//!
//! Provides the per-cycle identity and clock used for logging and storage.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

/// Context for one fetch -> parse -> store cycle.
#[derive(Debug, Clone)]
pub struct CycleContext {
    pub cycle_id: String,
    /// "Now" for the whole cycle: boot anchoring and line/link row dates.
    pub observed_at: DateTime<Utc>,
    /// Event stream whose high-water mark is consulted.
    pub stream: String,
    /// Roll the cycle back instead of committing it.
    pub dry_run: bool,
}

impl CycleContext {
    pub fn new(stream: &str) -> Self {
        Self::at(stream, Utc::now())
    }

    pub fn at(stream: &str, observed_at: DateTime<Utc>) -> Self {
        let cycle_id = format!("cycle-{}", &Uuid::new_v4().simple().to_string()[..8]);

        Self {
            cycle_id,
            observed_at,
            stream: stream.to_string(),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.cycle_id)
            .with_stream(&self.stream)
            .dry_run(self.dry_run)
    }
}
