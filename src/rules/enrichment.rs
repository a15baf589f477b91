//! Display-name enrichment of rule approvers and requesters.
//!
//! - user: the user's display name, or the raw id for unknown users
//! - group: the raw id
//! - circle: the circle's display name when circles are enabled; the entry
//!   is kept without a name if the circle was deleted, and dropped from
//!   the list entirely when circles are disabled

use crate::error::ApprovalResult;
use crate::logging::structured::LogContext;
use crate::platform::{CircleLookup, CircleSession, IdentityResolver};
use crate::rules::model::{EntityType, Rule, RuleEntity};
use crate::rules::store::RuleStore;

pub struct RuleEnricher<'a> {
    identities: &'a dyn IdentityResolver,
    circles: CircleLookup<'a>,
}

impl<'a> RuleEnricher<'a> {
    pub fn new(identities: &'a dyn IdentityResolver, circles: CircleLookup<'a>) -> Self {
        Self {
            identities,
            circles,
        }
    }

    /// List the stored rules with display names filled in.
    ///
    /// One privileged circle session spans the whole listing and is closed
    /// on every exit path, including a failing rule store.
    pub fn list_enriched(&self, store: &dyn RuleStore, ctx: &LogContext) -> ApprovalResult<Vec<Rule>> {
        let session = self.circles.session();
        let rules = store.list_rules()?;
        Ok(self.enrich_in_session(rules, session.as_ref(), ctx))
    }

    /// Enrich rules loaded by the caller. Opens its own circle session when
    /// circles are enabled.
    pub fn enrich(&self, rules: Vec<Rule>, ctx: &LogContext) -> Vec<Rule> {
        let session = self.circles.session();
        self.enrich_in_session(rules, session.as_ref(), ctx)
    }

    fn enrich_in_session(
        &self,
        rules: Vec<Rule>,
        session: Option<&CircleSession<'_>>,
        ctx: &LogContext,
    ) -> Vec<Rule> {
        let enriched: Vec<Rule> = rules
            .into_iter()
            .map(|mut rule| {
                let rule_ctx = ctx.with_rule(rule.id);
                rule.approvers = self.enrich_entities(rule.approvers, session, &rule_ctx);
                rule.requesters = self.enrich_entities(rule.requesters, session, &rule_ctx);
                rule
            })
            .collect();

        log::debug!(
            "{} RULES_ENRICHED rules={} circles_enabled={}",
            ctx,
            enriched.len(),
            self.circles.is_enabled()
        );
        enriched
    }

    fn enrich_entities(
        &self,
        entities: Vec<RuleEntity>,
        session: Option<&CircleSession<'_>>,
        ctx: &LogContext,
    ) -> Vec<RuleEntity> {
        entities
            .into_iter()
            .filter_map(|mut entity| {
                match entity.entity_type {
                    EntityType::User => {
                        let name = self
                            .identities
                            .display_name_for_user(&entity.entity_id)
                            .unwrap_or_else(|| entity.entity_id.clone());
                        entity.display_name = Some(name);
                    }
                    EntityType::Group => {
                        entity.display_name = Some(entity.entity_id.clone());
                    }
                    EntityType::Circle => {
                        let Some(session) = session else {
                            log::debug!(
                                "{} CIRCLE_ENTRY_DROPPED circle_id={} reason=circles_disabled",
                                ctx,
                                entity.entity_id
                            );
                            return None;
                        };
                        match session.display_name(&entity.entity_id) {
                            Ok(name) => entity.display_name = Some(name),
                            Err(e) if e.is_not_found() => {
                                log::debug!(
                                    "{} CIRCLE_NOT_FOUND circle_id={}",
                                    ctx,
                                    entity.entity_id
                                );
                            }
                            Err(e) => {
                                log::warn!(
                                    "{} CIRCLE_LOOKUP_FAILED circle_id={} error={}",
                                    ctx,
                                    entity.entity_id,
                                    e
                                );
                            }
                        }
                    }
                }
                Some(entity)
            })
            .collect()
    }
}
