//! Request context management.
//!
//! Every endpoint call gets a short request id used to correlate its log
//! lines.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

/// Context for one endpoint call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub operation: &'static str,
    pub started_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(operation: &'static str) -> Self {
        let request_id = format!("req-{}", &Uuid::new_v4().to_string()[..8]);

        Self {
            request_id,
            operation,
            started_at: Utc::now(),
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.request_id)
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestContext::new("get_rules");
        let b = RequestContext::new("get_rules");
        assert!(a.request_id.starts_with("req-"));
        assert_eq!(a.request_id.len(), 12);
        assert_ne!(a.request_id, b.request_id);
        assert!(a.elapsed_ms() >= 0);
    }
}
