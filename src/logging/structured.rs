//! Structured logging utilities.
//!
//! Every message of a cycle starts with the same bracketed prefix, so all
//! lines of one fetch can be grepped together and matched with the report
//! that produced them:
//!
//! ```text
//! [cycle=cycle-1a2b3c4d] [stream=adsl] [report=ba7816bf8f01] EVENTS_MERGED observed=3 accepted=1
//! ```

use std::fmt;

/// Hex digits of the report digest shown in the prefix.
pub const REPORT_DIGEST_PREFIX_LEN: usize = 12;

/// Logging context for one ingestion cycle.
///
/// Starts with the cycle id only; the stream is known when the cycle is
/// set up and the report digest once the report has been fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    pub cycle_id: String,
    pub stream: Option<String>,
    /// Leading hex digits of the report SHA-256.
    pub report: Option<String>,
    pub dry_run: bool,
}

impl LogContext {
    pub fn new(cycle_id: &str) -> Self {
        Self {
            cycle_id: cycle_id.to_string(),
            ..Self::default()
        }
    }

    pub fn with_stream(mut self, stream: &str) -> Self {
        self.stream = Some(stream.to_string());
        self
    }

    /// Tag messages with the report they are about.
    pub fn with_report(mut self, sha256: &str) -> Self {
        let end = sha256
            .char_indices()
            .nth(REPORT_DIGEST_PREFIX_LEN)
            .map(|(i, _)| i)
            .unwrap_or(sha256.len());
        self.report = Some(sha256[..end].to_string());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[cycle={}]", self.cycle_id)?;
        if let Some(stream) = &self.stream {
            write!(f, " [stream={}]", stream)?;
        }
        if let Some(report) = &self.report {
            write!(f, " [report={}]", report)?;
        }
        if self.dry_run {
            f.write_str(" [dry-run]")?;
        }
        Ok(())
    }
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),+ $(,)?) => {
        log::info!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),+), $($value),+)
        );
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),+ $(,)?) => {
        log::warn!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),+), $($value),+)
        );
    };
}

/// Log an error message with context.
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),+ $(,)?) => {
        log::error!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),+), $($value),+)
        );
    };
}
