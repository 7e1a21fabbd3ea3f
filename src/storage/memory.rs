//! In-memory store.
//!
//! Same contract as the SQLite store; writes made inside a transaction are
//! staged and only become visible on commit.

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::storage::models::{ConnectionEvent, LineState, LinkState};
use crate::storage::TelemetryStore;

/// Stored rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTables {
    pub line_states: Vec<(DateTime<Utc>, LineState)>,
    pub events: Vec<(String, ConnectionEvent)>,
    pub links: Vec<(DateTime<Utc>, LinkState)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    committed: MemoryTables,
    staged: Option<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed rows.
    pub fn tables(&self) -> &MemoryTables {
        &self.committed
    }

    fn current(&self) -> &MemoryTables {
        self.staged.as_ref().unwrap_or(&self.committed)
    }

    fn current_mut(&mut self) -> &mut MemoryTables {
        match self.staged {
            Some(ref mut staged) => staged,
            None => &mut self.committed,
        }
    }
}

impl TelemetryStore for MemoryStore {
    fn begin(&mut self) -> Result<(), StoreError> {
        if self.staged.is_some() {
            return Err(StoreError::Transaction("transaction already open".to_string()));
        }
        self.staged = Some(self.committed.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        match self.staged.take() {
            Some(staged) => {
                self.committed = staged;
                Ok(())
            }
            None => Err(StoreError::Transaction("no open transaction".to_string())),
        }
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.staged = None;
        Ok(())
    }

    fn max_event_timestamp(&mut self, stream: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .current()
            .events
            .iter()
            .filter(|(s, _)| s == stream)
            .map(|(_, e)| e.timestamp)
            .max())
    }

    fn append_line_state(
        &mut self,
        observed_at: DateTime<Utc>,
        record: &LineState,
    ) -> Result<(), StoreError> {
        self.current_mut()
            .line_states
            .push((observed_at, record.clone()));
        Ok(())
    }

    fn append_events(
        &mut self,
        stream: &str,
        events: &[ConnectionEvent],
    ) -> Result<(), StoreError> {
        let tables = self.current_mut();
        tables
            .events
            .extend(events.iter().map(|e| (stream.to_string(), e.clone())));
        Ok(())
    }

    fn append_link_state(
        &mut self,
        observed_at: DateTime<Utc>,
        record: &LinkState,
    ) -> Result<(), StoreError> {
        self.current_mut().links.push((observed_at, record.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::EventKind;

    fn event(s: &str) -> ConnectionEvent {
        ConnectionEvent {
            timestamp: s.parse().unwrap(),
            boot_relative: false,
            kind: EventKind::Disconnect,
            rate_down: None,
            rate_up: None,
        }
    }

    #[test]
    fn test_staged_writes_visible_inside_transaction_only() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        store.append_events("adsl", &[event("2026-10-17T08:11:55Z")]).unwrap();
        assert!(store.max_event_timestamp("adsl").unwrap().is_some());
        assert!(store.tables().events.is_empty());

        store.rollback().unwrap();
        assert_eq!(store.max_event_timestamp("adsl").unwrap(), None);

        store.begin().unwrap();
        store.append_events("adsl", &[event("2026-10-17T08:11:55Z")]).unwrap();
        store.commit().unwrap();
        assert_eq!(store.tables().events.len(), 1);
        assert_eq!(store.max_event_timestamp("vdsl").unwrap(), None);
    }

    #[test]
    fn test_commit_without_begin() {
        let mut store = MemoryStore::new();
        assert!(matches!(store.commit(), Err(StoreError::Transaction(_))));
    }
}
