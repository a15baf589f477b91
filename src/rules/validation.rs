//! Input validation for rule management and tag creation.
//!
//! Failures come back as `ApprovalError::Validation` carrying the message
//! that is shown to the user.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ApprovalError, ApprovalResult};
use crate::rules::model::{Rule, RuleDraft, RuleEntity};

lazy_static! {
    /// Tag names: no control characters, not only whitespace
    static ref TAG_NAME_PATTERN: Regex = Regex::new(r"^[^\x00-\x1F\x7F]*\S[^\x00-\x1F\x7F]*$").unwrap();
}

/// Validate a rule draft against the rules already stored.
///
/// `editing` is the id of the rule being replaced, so that it does not
/// conflict with itself.
pub fn validate_rule_draft(
    draft: &RuleDraft,
    existing: &[Rule],
    editing: Option<i64>,
) -> ApprovalResult<()> {
    let [pending, approved, rejected] = draft.tags();
    if draft.tags().iter().any(|t| *t <= 0) {
        return Err(ApprovalError::validation("Invalid tag id"));
    }
    if pending == approved || pending == rejected || approved == rejected {
        return Err(ApprovalError::validation("All tags must be different"));
    }

    validate_entities("approver", &draft.approvers)?;
    validate_entities("requester", &draft.requesters)?;

    let conflict = existing
        .iter()
        .filter(|r| Some(r.id) != editing)
        .find(|r| r.tag_pending == pending);
    if let Some(other) = conflict {
        return Err(ApprovalError::validation(format!(
            "Rule {} already uses this pending tag",
            other.id
        )));
    }

    Ok(())
}

fn validate_entities(role: &str, entities: &[RuleEntity]) -> ApprovalResult<()> {
    if entities.is_empty() {
        return Err(ApprovalError::validation(format!(
            "At least one {} is required",
            role
        )));
    }
    if let Some(blank) = entities.iter().find(|e| e.entity_id.trim().is_empty()) {
        return Err(ApprovalError::validation(format!(
            "Empty {} id of type {}",
            role, blank.entity_type
        )));
    }
    Ok(())
}

/// Validate a new tag name. Returns the trimmed name.
pub fn validate_tag_name(name: &str, max_length: usize) -> ApprovalResult<String> {
    let trimmed = name.trim();
    if !TAG_NAME_PATTERN.is_match(trimmed) {
        return Err(ApprovalError::validation("Invalid tag name"));
    }
    if trimmed.chars().count() > max_length {
        return Err(ApprovalError::validation(format!(
            "Tag name is longer than {} characters",
            max_length
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RuleDraft {
        RuleDraft {
            tag_pending: 1,
            tag_approved: 2,
            tag_rejected: 3,
            approvers: vec![RuleEntity::user("alice")],
            requesters: vec![RuleEntity::group("staff")],
            description: String::new(),
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(validate_rule_draft(&draft(), &[], None).is_ok());
    }

    #[test]
    fn test_duplicate_tags() {
        let mut d = draft();
        d.tag_rejected = 1;
        assert_eq!(
            validate_rule_draft(&d, &[], None),
            Err(ApprovalError::validation("All tags must be different"))
        );
    }

    #[test]
    fn test_missing_entities() {
        let mut d = draft();
        d.approvers.clear();
        assert!(validate_rule_draft(&d, &[], None).is_err());

        let mut d = draft();
        d.requesters = vec![RuleEntity::user("  ")];
        assert!(validate_rule_draft(&d, &[], None).is_err());
    }

    #[test]
    fn test_pending_tag_conflict() {
        let existing = vec![Rule::from_draft(4, draft())];
        assert!(validate_rule_draft(&draft(), &existing, None).is_err());
        // Saving rule 4 itself is not a conflict
        assert!(validate_rule_draft(&draft(), &existing, Some(4)).is_ok());
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(validate_tag_name("  Needs review ", 64).unwrap(), "Needs review");
        assert!(validate_tag_name("", 64).is_err());
        assert!(validate_tag_name("   ", 64).is_err());
        assert!(validate_tag_name("bad\nname", 64).is_err());
        assert!(validate_tag_name("abcdef", 5).is_err());
    }
}
