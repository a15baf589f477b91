//! Activity log models.
//!
//! These models represent the rows of the `approval_activity` table and the
//! shapes returned by the two aggregation queries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ApprovalError;

/// State a file enters through an approval transition.
///
/// Serialized as its integer code, which is also the column value in
/// the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ApprovalState {
    Pending = 1,
    Approved = 2,
    Rejected = 3,
}

impl ApprovalState {
    pub const ALL: [ApprovalState; 3] = [
        ApprovalState::Pending,
        ApprovalState::Approved,
        ApprovalState::Rejected,
    ];

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ApprovalState::Pending),
            2 => Some(ApprovalState::Approved),
            3 => Some(ApprovalState::Rejected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalState::Pending => "pending",
            ApprovalState::Approved => "approved",
            ApprovalState::Rejected => "rejected",
        }
    }
}

/// State of a row read back from storage. Unknown codes are logged and
/// yield `None` so the caller can skip the row.
pub(crate) fn state_from_row(code: i64, file_id: i64) -> Option<ApprovalState> {
    let state = ApprovalState::from_code(code);
    if state.is_none() {
        log::warn!(
            "ACTIVITY_ROW_SKIPPED reason=unknown_state state={} file_id={}",
            code,
            file_id
        );
    }
    state
}

/// SQL list of the known state codes, e.g. `1, 2, 3`.
pub(crate) fn known_state_codes_sql() -> String {
    ApprovalState::ALL
        .iter()
        .map(|s| s.code().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl TryFrom<i64> for ApprovalState {
    type Error = ApprovalError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        ApprovalState::from_code(code)
            .ok_or_else(|| ApprovalError::validation(format!("unknown approval state code: {}", code)))
    }
}

impl From<ApprovalState> for i64 {
    fn from(state: ApprovalState) -> Self {
        state.code()
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged state transition. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Row id assigned on append; later appends get higher ids.
    pub id: i64,
    pub file_id: i64,
    pub rule_id: i64,
    pub new_state: ApprovalState,
    pub timestamp: i64,
}

/// Transition as submitted for appending, before it has a row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewActivity {
    pub file_id: i64,
    pub rule_id: i64,
    pub new_state: ApprovalState,
    pub timestamp: i64,
}

impl NewActivity {
    pub fn new(file_id: i64, rule_id: i64, new_state: ApprovalState, timestamp: i64) -> Self {
        Self {
            file_id,
            rule_id,
            new_state,
            timestamp,
        }
    }
}

/// One row of the grouped KPI query: a distinct (rule, state, file) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleStateFile {
    pub rule_id: i64,
    pub new_state: ApprovalState,
    pub file_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes() {
        for state in ApprovalState::ALL {
            assert_eq!(ApprovalState::from_code(state.code()), Some(state));
        }
        assert_eq!(ApprovalState::from_code(0), None);
        assert_eq!(ApprovalState::from_code(4), None);
        assert!(ApprovalState::try_from(9).is_err());
    }

    #[test]
    fn test_state_serializes_as_code() {
        let json = serde_json::to_string(&ApprovalState::Rejected).unwrap();
        assert_eq!(json, "3");
        let parsed: ApprovalState = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, ApprovalState::Approved);
        assert!(serde_json::from_str::<ApprovalState>("7").is_err());
    }
}
