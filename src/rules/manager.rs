//! Rule management and tag creation.
//!
//! Every operation validates first and reports rejected input as
//! `ApprovalError::Validation`; nothing is written on failure.

use crate::error::{ApprovalError, ApprovalResult, ResolveError};
use crate::logging::structured::LogContext;
use crate::platform::TagStore;
use crate::rules::model::{Rule, RuleDraft};
use crate::rules::store::RuleStore;
use crate::rules::validation::{validate_rule_draft, validate_tag_name};

pub struct RuleManager<'a> {
    store: &'a dyn RuleStore,
    tags: &'a dyn TagStore,
}

impl<'a> RuleManager<'a> {
    pub fn new(store: &'a dyn RuleStore, tags: &'a dyn TagStore) -> Self {
        Self { store, tags }
    }

    pub fn create_rule(&self, draft: RuleDraft, ctx: &LogContext) -> ApprovalResult<Rule> {
        let existing = self.store.list_rules()?;
        self.validate(&draft, &existing, None, ctx)?;

        let rule = self.store.insert_rule(draft)?;
        log::info!("{} RULE_CREATED rule_id={}", ctx, rule.id);
        Ok(rule)
    }

    pub fn save_rule(&self, id: i64, draft: RuleDraft, ctx: &LogContext) -> ApprovalResult<Rule> {
        if self.store.find_rule(id)?.is_none() {
            log::warn!("{} RULE_SAVE_REJECTED rule_id={} reason=not_found", ctx, id);
            return Err(ApprovalError::RuleNotFound(id));
        }
        let existing = self.store.list_rules()?;
        self.validate(&draft, &existing, Some(id), ctx)?;

        let rule = self.store.update_rule(Rule::from_draft(id, draft))?;
        log::info!("{} RULE_SAVED rule_id={}", ctx, rule.id);
        Ok(rule)
    }

    pub fn delete_rule(&self, id: i64, ctx: &LogContext) -> ApprovalResult<()> {
        self.store.delete_rule(id)?;
        log::info!("{} RULE_DELETED rule_id={}", ctx, id);
        Ok(())
    }

    /// Create a system tag and return its id.
    pub fn create_tag(&self, name: &str, max_length: usize, ctx: &LogContext) -> ApprovalResult<i64> {
        let name = validate_tag_name(name, max_length)?;
        match self.tags.create_tag(&name) {
            Ok(id) => {
                log::info!("{} TAG_CREATED tag_id={} name={}", ctx, id, name);
                Ok(id)
            }
            Err(e @ ResolveError::AlreadyExists { .. }) => {
                log::warn!("{} TAG_CREATE_REJECTED name={} reason={}", ctx, name, e);
                Err(ApprovalError::Validation(e.to_string()))
            }
            Err(e) => {
                log::error!("{} TAG_CREATE_FAILED name={} error={}", ctx, name, e);
                Err(e.into())
            }
        }
    }

    fn validate(
        &self,
        draft: &RuleDraft,
        existing: &[Rule],
        editing: Option<i64>,
        ctx: &LogContext,
    ) -> ApprovalResult<()> {
        let result = validate_rule_draft(draft, existing, editing).and_then(|_| {
            match draft.tags().into_iter().find(|t| !self.tags.tag_exists(*t)) {
                Some(missing) => Err(ApprovalError::validation(format!(
                    "Tag {} does not exist",
                    missing
                ))),
                None => Ok(()),
            }
        });
        if let Err(e) = &result {
            log::warn!("{} RULE_VALIDATION_FAILED reason={}", ctx, e);
        }
        result
    }
}
