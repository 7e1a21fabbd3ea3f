//! Shared report fixtures.

/// A complete status report: one boot-relative entry and two dated ones.
pub const STATUS_REPORT: &str = include_str!("../testdata/status_report.txt");
