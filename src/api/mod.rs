//! Endpoint layer.
//!
//! Read endpoints (rules, KPIs, latest file states) and write endpoints
//! (rule management, tag creation), each with a `*_response` variant
//! producing the status/JSON envelope.

pub mod response;
pub mod service;

pub use response::*;
pub use service::*;
