//! SQLite store.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC text
//! (`2026-10-17T08:12:40.000000Z`) so that `MAX(date)` is chronological.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::storage::models::{ConnectionEvent, LineState, LinkState};
use crate::storage::queries::{
    build_date_update, build_event_insert, build_legacy_date_select, build_line_state_insert,
    build_link_insert, build_max_event_date, CONNECTION_PRAGMAS, CREATE_INDEXES, CREATE_TABLES,
    DATED_TABLES, LEGACY_TOKEN_MIGRATION, STREAM_COLUMN_MIGRATION,
};
use crate::storage::TelemetryStore;

/// Format a timestamp for storage.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp.
///
/// Also reads the `YYYY-MM-DD HH:MM:SS[.ffffff][+HH:MM]` text written by
/// older versions of the collector; values without an offset are UTC.
pub fn parse_stored_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| StoreError::Timestamp(raw.to_string()))
}

/// Telemetry store backed by one SQLite connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    in_transaction: bool,
}

impl SqliteStore {
    /// Open or create the database at `path` and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        log::debug!("SQLITE_OPEN path={}", path.as_ref().display());
        Self::init(conn)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        conn.execute_batch(CREATE_TABLES)?;

        // A database without the stream column was written by the legacy
        // collector.
        if !has_column(&conn, "adsl_connection", "stream")? {
            migrate_legacy(&mut conn)?;
        }

        conn.execute_batch(CREATE_INDEXES)?;

        Ok(Self {
            conn,
            in_transaction: false,
        })
    }

    /// Let SQLite refresh its planner statistics. Run outside a transaction.
    pub fn optimize(&self) -> Result<(), StoreError> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }

    /// Underlying connection, for read queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Bring a legacy database to the current layout in one transaction: stream
/// column, event/link tokens, timestamp text.
fn migrate_legacy(conn: &mut Connection) -> Result<(), StoreError> {
    let tx = conn.transaction()?;

    tx.execute(STREAM_COLUMN_MIGRATION, [])?;
    tx.execute_batch(LEGACY_TOKEN_MIGRATION)?;

    let mut rewritten = 0;
    let mut undecodable = 0;
    for table in DATED_TABLES {
        let rows: Vec<(i64, String)> = {
            let mut stmt = tx.prepare(&build_legacy_date_select(table))?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let rows = rows.collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut update = tx.prepare(&build_date_update(table))?;
        for (rowid, raw) in rows {
            match parse_stored_timestamp(&raw) {
                Ok(ts) => {
                    update.execute(params![format_timestamp(ts), rowid])?;
                    rewritten += 1;
                }
                Err(_) => {
                    log::warn!(
                        "SQLITE_MIGRATE_BAD_DATE table={} rowid={} date={:?}",
                        table,
                        rowid,
                        raw
                    );
                    undecodable += 1;
                }
            }
        }
    }

    tx.commit()?;

    log::info!(
        "SQLITE_MIGRATE add_column=stream tokens=CONNECT/DISCONNECT/UP/DOWN dates_rewritten={} dates_undecodable={}",
        rewritten,
        undecodable
    );
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

impl TelemetryStore for SqliteStore {
    fn begin(&mut self) -> Result<(), StoreError> {
        if self.in_transaction {
            return Err(StoreError::Transaction("transaction already open".to_string()));
        }
        // IMMEDIATE takes the write lock before the high-water mark is read.
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Err(StoreError::Transaction("no open transaction".to_string()));
        }
        self.conn.execute_batch("COMMIT")?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn max_event_timestamp(&mut self, stream: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        let latest: Option<String> =
            self.conn
                .query_row(build_max_event_date(), params![stream], |row| row.get(0))?;
        latest.as_deref().map(parse_stored_timestamp).transpose()
    }

    fn append_line_state(
        &mut self,
        observed_at: DateTime<Utc>,
        record: &LineState,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            &build_line_state_insert(),
            params![
                format_timestamp(observed_at),
                record.atm_bw_down,
                record.atm_bw_up,
                record.noise_margin_down,
                record.noise_margin_up,
                record.att_down,
                record.att_up,
                record.fec_down,
                record.fec_up,
                record.crc_down,
                record.crc_up,
                record.hec_down,
                record.hec_up,
            ],
        )?;
        Ok(())
    }

    fn append_events(
        &mut self,
        stream: &str,
        events: &[ConnectionEvent],
    ) -> Result<(), StoreError> {
        let mut stmt = self.conn.prepare_cached(build_event_insert())?;
        for event in events {
            stmt.execute(params![
                format_timestamp(event.timestamp),
                event.boot_relative,
                event.kind.as_str(),
                event.rate_down,
                event.rate_up,
                stream,
            ])?;
        }
        Ok(())
    }

    fn append_link_state(
        &mut self,
        observed_at: DateTime<Utc>,
        record: &LinkState,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            build_link_insert(),
            params![
                format_timestamp(observed_at),
                record.link,
                record.state.as_str(),
                record.usage_down,
                record.usage_up,
            ],
        )?;
        Ok(())
    }
}
