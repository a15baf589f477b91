//! Approval rules.
//!
//! - `model` - rules and their approver/requester entries
//! - `store` - rule storage
//! - `validation` - rule and tag input checks
//! - `manager` - create/save/delete rules, create tags
//! - `enrichment` - display names for approvers/requesters

pub mod enrichment;
pub mod manager;
pub mod model;
pub mod store;
pub mod validation;

pub use enrichment::*;
pub use manager::*;
pub use model::*;
pub use store::*;
pub use validation::*;
