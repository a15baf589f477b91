//! Storage module.
//!
//! Activity log models, SQL query builders and the log backends.

pub mod activity_log;
pub mod models;
pub mod queries;
pub mod sqlite;

pub use activity_log::*;
pub use models::*;
pub use queries::*;
pub use sqlite::*;
