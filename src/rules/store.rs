//! Rule storage.
//!
//! The reporting stages only call `list_rules`; the write methods back the
//! rule management endpoints.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::{ApprovalError, ApprovalResult};
use crate::rules::model::{Rule, RuleDraft};

pub trait RuleStore: Send + Sync {
    /// Snapshot of every rule, ordered by id.
    fn list_rules(&self) -> ApprovalResult<Vec<Rule>>;

    fn find_rule(&self, id: i64) -> ApprovalResult<Option<Rule>>;

    /// Store a new rule and return it with its assigned id.
    fn insert_rule(&self, draft: RuleDraft) -> ApprovalResult<Rule>;

    /// Replace an existing rule. Fails with `RuleNotFound` for unknown ids.
    fn update_rule(&self, rule: Rule) -> ApprovalResult<Rule>;

    /// Fails with `RuleNotFound` for unknown ids.
    fn delete_rule(&self, id: i64) -> ApprovalResult<()>;
}

#[derive(Debug, Default)]
struct RuleTable {
    rules: BTreeMap<i64, Rule>,
    last_id: i64,
}

/// Rule store kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    table: RwLock<RuleTable>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with already-persisted rules.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        let last_id = rules.iter().map(|r| r.id).max().unwrap_or(0);
        let rules = rules.into_iter().map(|r| (r.id, r)).collect();
        Self {
            table: RwLock::new(RuleTable { rules, last_id }),
        }
    }
}

impl RuleStore for InMemoryRuleStore {
    fn list_rules(&self) -> ApprovalResult<Vec<Rule>> {
        Ok(self.table.read().rules.values().cloned().collect())
    }

    fn find_rule(&self, id: i64) -> ApprovalResult<Option<Rule>> {
        Ok(self.table.read().rules.get(&id).cloned())
    }

    fn insert_rule(&self, draft: RuleDraft) -> ApprovalResult<Rule> {
        let mut table = self.table.write();
        table.last_id += 1;
        let rule = Rule::from_draft(table.last_id, draft);
        table.rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    fn update_rule(&self, rule: Rule) -> ApprovalResult<Rule> {
        let mut table = self.table.write();
        match table.rules.get_mut(&rule.id) {
            Some(existing) => {
                *existing = rule.clone();
                Ok(rule)
            }
            None => Err(ApprovalError::RuleNotFound(rule.id)),
        }
    }

    fn delete_rule(&self, id: i64) -> ApprovalResult<()> {
        self.table
            .write()
            .rules
            .remove(&id)
            .map(|_| ())
            .ok_or(ApprovalError::RuleNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::model::RuleEntity;

    fn draft(base_tag: i64) -> RuleDraft {
        RuleDraft {
            tag_pending: base_tag,
            tag_approved: base_tag + 1,
            tag_rejected: base_tag + 2,
            approvers: vec![RuleEntity::user("alice")],
            requesters: vec![RuleEntity::group("staff")],
            description: "test".to_string(),
        }
    }

    #[test]
    fn test_insert_assigns_ids() {
        let store = InMemoryRuleStore::new();
        let first = store.insert_rule(draft(1)).unwrap();
        let second = store.insert_rule(draft(10)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.list_rules().unwrap().len(), 2);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = InMemoryRuleStore::with_rules(vec![Rule::from_draft(5, draft(1))]);
        store.delete_rule(5).unwrap();
        assert_eq!(store.insert_rule(draft(1)).unwrap().id, 6);
    }

    #[test]
    fn test_unknown_rule() {
        let store = InMemoryRuleStore::new();
        assert_eq!(store.delete_rule(9), Err(ApprovalError::RuleNotFound(9)));
        assert_eq!(
            store.update_rule(Rule::from_draft(9, draft(1))),
            Err(ApprovalError::RuleNotFound(9))
        );
        assert_eq!(store.find_rule(9).unwrap(), None);
    }
}
