//! Reporting module.
//!
//! The two read-only reports over the activity log:
//! - `kpi` - distinct files per rule and state
//! - `latest` - current state and path of every file

pub mod context;
pub mod kpi;
pub mod latest;

pub use context::*;
pub use kpi::*;
pub use latest::*;
