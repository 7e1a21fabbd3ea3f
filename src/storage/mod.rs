//! Storage module.
//!
//! The store contract consumed by the ingestion pipeline, its SQLite and
//! in-memory implementations, SQL query builders and record models.

pub mod memory;
pub mod models;
pub mod queries;
pub mod sqlite;

pub use memory::*;
pub use models::*;
pub use queries::*;
pub use sqlite::*;

use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// Persistent store for extracted telemetry.
///
/// The pipeline wraps one cycle in `begin` .. `commit`, so the high-water
/// mark read and the writes it allows form one transaction.
pub trait TelemetryStore {
    fn begin(&mut self) -> Result<(), StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Latest stored event timestamp of `stream`, if any.
    fn max_event_timestamp(&mut self, stream: &str) -> Result<Option<DateTime<Utc>>, StoreError>;

    fn append_line_state(
        &mut self,
        observed_at: DateTime<Utc>,
        record: &LineState,
    ) -> Result<(), StoreError>;

    /// Append events, already in chronological order.
    fn append_events(&mut self, stream: &str, events: &[ConnectionEvent])
        -> Result<(), StoreError>;

    fn append_link_state(
        &mut self,
        observed_at: DateTime<Utc>,
        record: &LinkState,
    ) -> Result<(), StoreError>;
}
