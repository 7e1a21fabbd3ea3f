//! Structured logging with cycle context.
//!
//! Provides logging macros and utilities that include cycle_id and stream
//! in every log message for easy correlation.

pub mod structured;

pub use structured::*;
