//! Structured logging with request context.
//!
//! Provides logging macros and utilities that include the request id (and,
//! where relevant, the rule or file being processed) in every log message.

pub mod structured;

pub use structured::*;
