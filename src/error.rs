//! Error types.
//!
//! `ApprovalError` is what every fallible operation of the crate returns.
//! `ResolveError` is what external collaborators (file lookup, user and
//! circle directories, tag storage) report back; the reporting stages
//! recover from it per item instead of propagating it.

use thiserror::Error;

/// Crate-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    /// Caller input was rejected. Surfaced as a structured failure result.
    #[error("{0}")]
    Validation(String),

    #[error("rule {0} not found")]
    RuleNotFound(i64),

    /// The activity log or rule store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Collaborator(#[from] ResolveError),
}

impl ApprovalError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApprovalError::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        ApprovalError::Storage(msg.into())
    }

    /// Whether the failure was caused by the caller (HTTP 400 class).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApprovalError::Validation(_) | ApprovalError::RuleNotFound(_)
        )
    }
}

impl From<rusqlite::Error> for ApprovalError {
    fn from(e: rusqlite::Error) -> Self {
        ApprovalError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for ApprovalError {
    fn from(e: serde_json::Error) -> Self {
        ApprovalError::Validation(format!("invalid JSON: {}", e))
    }
}

/// Failure reported by an external collaborator for a single item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The entity (file, circle, tag) no longer exists.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// An entity with the same name already exists (duplicate tag names).
    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// The collaborator is disabled or not installed.
    #[error("{0} is unavailable")]
    Unavailable(&'static str),

    #[error("lookup failed: {0}")]
    Failed(String),
}

impl ResolveError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        ResolveError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        ResolveError::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}

pub type ApprovalResult<T> = Result<T, ApprovalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(ApprovalError::validation("bad").is_client_error());
        assert!(ApprovalError::RuleNotFound(3).is_client_error());
        assert!(!ApprovalError::storage("disk").is_client_error());
        assert!(!ApprovalError::from(ResolveError::Unavailable("circles")).is_client_error());
    }

    #[test]
    fn test_resolve_error_display() {
        let err = ResolveError::not_found("file", 42);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "file 42 not found");
        assert_eq!(ApprovalError::RuleNotFound(7).to_string(), "rule 7 not found");
        assert_eq!(
            ResolveError::already_exists("Tag", "review").to_string(),
            "Tag \"review\" already exists"
        );
    }
}
