//! SQL query builders.
//!
//! Generates the schema and insert statements for the telemetry tables.

/// Tables, created if missing.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS adsl_connection (
    date TEXT,
    isbootup INT,
    event TEXT,
    bw_down INT,
    bw_up INT,
    stream TEXT NOT NULL DEFAULT 'adsl'
);

CREATE TABLE IF NOT EXISTS adsl_state (
    date TEXT,
    atm_bw_down INT,
    atm_bw_up INT,
    noise_margin_down FLOAT,
    noise_margin_up FLOAT,
    att_down FLOAT,
    att_up FLOAT,
    fec_down INT,
    fec_up INT,
    crc_down INT,
    crc_up INT,
    hec_down INT,
    hec_up INT
);

CREATE TABLE IF NOT EXISTS netlinks (
    date TEXT,
    link TEXT,
    state TEXT,
    usage_down INT,
    usage_up INT
);
"#;

/// Indexes; run after `STREAM_COLUMN_MIGRATION` when it applies.
pub const CREATE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS adsl_connection_idx ON adsl_connection(date, event);
CREATE INDEX IF NOT EXISTS adsl_connection_stream_idx ON adsl_connection(stream, date);
CREATE INDEX IF NOT EXISTS adsl_state_idx ON adsl_state(date);
CREATE INDEX IF NOT EXISTS netlinks_idx ON netlinks(date, link, state);
"#;

/// Databases created before streams existed lack the column.
pub const STREAM_COLUMN_MIGRATION: &str =
    "ALTER TABLE adsl_connection ADD COLUMN stream TEXT NOT NULL DEFAULT 'adsl'";

/// Tokens written by the legacy collector, mapped to the current ones.
pub const LEGACY_TOKEN_MIGRATION: &str = r#"
UPDATE adsl_connection SET event = 'CONNECT' WHERE event = 'CONN';
UPDATE adsl_connection SET event = 'DISCONNECT' WHERE event = 'DECO';
UPDATE netlinks SET state = 'UP' WHERE state = 'Ok';
UPDATE netlinks SET state = 'DOWN' WHERE state = 'Non connecté';
"#;

/// Tables with a `date` column.
pub const DATED_TABLES: [&str; 3] = ["adsl_connection", "adsl_state", "netlinks"];

/// Rows whose date is not in the current `...Z` form.
pub fn build_legacy_date_select(table: &str) -> String {
    format!(
        "SELECT rowid, date FROM {} WHERE date IS NOT NULL AND date NOT LIKE '%Z'",
        table
    )
}

pub fn build_date_update(table: &str) -> String {
    format!("UPDATE {} SET date = ?1 WHERE rowid = ?2", table)
}

/// Connection pragmas.
pub const CONNECTION_PRAGMAS: &str = r#"
PRAGMA foreign_keys = ON;
PRAGMA synchronous = NORMAL;
PRAGMA journal_mode = WAL;
"#;

/// Columns of `adsl_state` after `date`, in `LineState` field order.
pub fn get_line_state_columns() -> Vec<&'static str> {
    vec![
        "atm_bw_down",
        "atm_bw_up",
        "noise_margin_down",
        "noise_margin_up",
        "att_down",
        "att_up",
        "fec_down",
        "fec_up",
        "crc_down",
        "crc_up",
        "hec_down",
        "hec_up",
    ]
}

/// Build INSERT query for adsl_state. `?1` is the date.
pub fn build_line_state_insert() -> String {
    let columns = get_line_state_columns();
    let placeholders: Vec<String> = (2..=columns.len() + 1).map(|i| format!("?{}", i)).collect();

    format!(
        "INSERT INTO adsl_state (date, {}) VALUES (?1, {})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Build INSERT query for adsl_connection.
pub fn build_event_insert() -> &'static str {
    r#"
    INSERT INTO adsl_connection (date, isbootup, event, bw_down, bw_up, stream)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#
}

/// Build INSERT query for netlinks.
pub fn build_link_insert() -> &'static str {
    r#"
    INSERT INTO netlinks (date, link, state, usage_down, usage_up)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#
}

/// High-water mark of one event stream.
pub fn build_max_event_date() -> &'static str {
    "SELECT MAX(date) FROM adsl_connection WHERE stream = ?1"
}
