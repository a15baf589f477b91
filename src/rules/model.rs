//! Rule models.
//!
//! JSON field names follow the wire format the frontend already speaks
//! (`tagPending`, `entityId`, `displayName`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of entity an approver/requester entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Group,
    Circle,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityType::User => "user",
            EntityType::Group => "group",
            EntityType::Circle => "circle",
        })
    }
}

/// One approver or requester of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl RuleEntity {
    pub fn new(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            display_name: None,
        }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self::new(EntityType::User, id)
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self::new(EntityType::Group, id)
    }

    pub fn circle(id: impl Into<String>) -> Self {
        Self::new(EntityType::Circle, id)
    }
}

/// Rule fields as submitted by a caller, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    pub tag_pending: i64,
    pub tag_approved: i64,
    pub tag_rejected: i64,
    pub approvers: Vec<RuleEntity>,
    pub requesters: Vec<RuleEntity>,
    #[serde(default)]
    pub description: String,
}

impl RuleDraft {
    pub fn tags(&self) -> [i64; 3] {
        [self.tag_pending, self.tag_approved, self.tag_rejected]
    }
}

/// A stored approval rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: i64,
    pub tag_pending: i64,
    pub tag_approved: i64,
    pub tag_rejected: i64,
    pub approvers: Vec<RuleEntity>,
    pub requesters: Vec<RuleEntity>,
    #[serde(default)]
    pub description: String,
}

impl Rule {
    pub fn from_draft(id: i64, draft: RuleDraft) -> Self {
        Self {
            id,
            tag_pending: draft.tag_pending,
            tag_approved: draft.tag_approved,
            tag_rejected: draft.tag_rejected,
            approvers: draft.approvers,
            requesters: draft.requesters,
            description: draft.description,
        }
    }

    pub fn tags(&self) -> [i64; 3] {
        [self.tag_pending, self.tag_approved, self.tag_rejected]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_wire_format() {
        let json = r#"{
            "id": 3,
            "tagPending": 1,
            "tagApproved": 2,
            "tagRejected": 3,
            "approvers": [{"type": "user", "entityId": "alice"}],
            "requesters": [{"type": "circle", "entityId": "c1", "displayName": "Team"}],
            "description": "invoices"
        }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.approvers[0], RuleEntity::user("alice"));
        assert_eq!(rule.requesters[0].display_name.as_deref(), Some("Team"));

        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["tagPending"], 1);
        assert_eq!(value["approvers"][0]["type"], "user");
        assert!(value["approvers"][0].get("displayName").is_none());
    }
}
