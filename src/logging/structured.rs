//! Structured logging utilities.
//!
//! Provides context-aware logging with request_id, and optionally rule_id or
//! file_id, included in every log message.

use std::fmt;

/// Logging context for one request.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub request_id: String,
    pub rule_id: Option<i64>,
    pub file_id: Option<i64>,
}

impl LogContext {
    pub fn new(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            rule_id: None,
            file_id: None,
        }
    }

    pub fn with_rule(&self, rule_id: i64) -> Self {
        Self {
            rule_id: Some(rule_id),
            ..self.clone()
        }
    }

    pub fn with_file(&self, file_id: i64) -> Self {
        Self {
            file_id: Some(file_id),
            ..self.clone()
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[request={}]", self.request_id)?;
        if let Some(rule_id) = self.rule_id {
            write!(f, " [rule={}]", rule_id)?;
        }
        if let Some(file_id) = self.file_id {
            write!(f, " [file={}]", file_id)?;
        }
        Ok(())
    }
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::info!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::warn!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// Log an error message with context.
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::error!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// Log a debug message with context.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::debug!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_accept_any_number_of_fields() {
        let ctx = LogContext::new("req-1");
        crate::log_info!(ctx, "NO_FIELDS",);
        crate::log_warn!(ctx, "ONE_FIELD", file_id = 3);
        crate::log_debug!(ctx.with_rule(2), "TWO_FIELDS", pending = 1, approved = 2);
        crate::log_error!(ctx, "THREE_FIELDS", a = 1, b = "two", c = 3.0);
    }

    #[test]
    fn test_log_context_display() {
        let ctx = LogContext::new("req-123");
        assert_eq!(format!("{}", ctx), "[request=req-123]");

        assert_eq!(
            format!("{}", ctx.with_rule(4)),
            "[request=req-123] [rule=4]"
        );
        assert_eq!(
            format!("{}", ctx.with_rule(4).with_file(99)),
            "[request=req-123] [rule=4] [file=99]"
        );
    }
}
