//! Report field extraction.
//!
//! Splits a status report into sections and pulls typed values out of them.

pub mod events;
pub mod line_state;
pub mod links;
pub mod sections;
pub mod uptime;
pub mod values;

pub use events::*;
pub use line_state::*;
pub use links::*;
pub use sections::*;
pub use uptime::*;
pub use values::*;
