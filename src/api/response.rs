//! Response envelope.
//!
//! Status code plus JSON body, so the host can forward results without
//! knowing the error taxonomy. Failures carry `{"error": message}`.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ApprovalError, ApprovalResult};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    pub fn error(error: &ApprovalError) -> Self {
        let status = if error.is_client_error() {
            STATUS_BAD_REQUEST
        } else {
            STATUS_INTERNAL_ERROR
        };
        Self {
            status,
            body: json!({ "error": error.to_string() }),
        }
    }

    pub fn from_result<T: Serialize>(result: ApprovalResult<T>) -> Self {
        match result.and_then(|value| serde_json::to_value(value).map_err(ApprovalError::from)) {
            Ok(body) => Self::ok(body),
            Err(e) => Self::error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}
