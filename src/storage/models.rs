//! Records extracted from a status report.
//!
//! These map one-to-one onto the rows of the `adsl_state`, `adsl_connection`
//! and `netlinks` tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical line health at observation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineState {
    pub atm_bw_down: i64, // kb/s
    pub atm_bw_up: i64,
    pub noise_margin_down: f64, // dB
    pub noise_margin_up: f64,
    pub att_down: f64, // dB
    pub att_up: f64,
    pub fec_down: i64,
    pub fec_up: i64,
    pub crc_down: i64,
    pub crc_up: i64,
    pub hec_down: i64,
    pub hec_up: i64,
}

/// Kind of a connection log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Connect,
    Disconnect,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connect => "CONNECT",
            EventKind::Disconnect => "DISCONNECT",
        }
    }
}

/// One entry of the connection log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEvent {
    pub timestamp: DateTime<Utc>,
    /// Timestamp derived from device uptime rather than printed in the log.
    pub boot_relative: bool,
    pub kind: EventKind,
    pub rate_down: Option<i64>, // kb/s, CONNECT only
    pub rate_up: Option<i64>,
}

/// Link state token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
    Up,
    Down,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Up => "UP",
            LinkStatus::Down => "DOWN",
        }
    }
}

/// Snapshot of one network link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkState {
    pub link: String,
    pub state: LinkStatus,
    pub usage_down: i64, // ko/s
    pub usage_up: i64,
}
