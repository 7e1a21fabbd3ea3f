//! Pipeline orchestration module.
//!
//! Main ingestion pipeline that coordinates:
//! - Report retrieval
//! - Snapshot parsing (sections, line state, connection log, links)
//! - Connection log merge against the stored high-water mark
//! - Transactional storage of the cycle

pub mod context;
pub mod ingestion;
pub mod merge;
pub mod snapshot;

pub use context::*;
pub use ingestion::*;
pub use merge::*;
pub use snapshot::*;
