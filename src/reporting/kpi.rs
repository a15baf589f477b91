//! Per-rule KPIs.
//!
//! Counts, per rule and state, the distinct files that ever reached that
//! state. The counts are not exclusive: a file that went pending then
//! approved is counted under both.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ApprovalResult;
use crate::logging::structured::LogContext;
use crate::rules::model::Rule;
use crate::storage::activity_log::ActivityLogReader;
use crate::storage::models::ApprovalState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleKpi {
    pub rule_id: i64,
    pub description: String,
    pub pending_count: u64,
    pub approved_count: u64,
    pub rejected_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StateCounts {
    pending: u64,
    approved: u64,
    rejected: u64,
}

impl StateCounts {
    fn increment(&mut self, state: ApprovalState) {
        match state {
            ApprovalState::Pending => self.pending += 1,
            ApprovalState::Approved => self.approved += 1,
            ApprovalState::Rejected => self.rejected += 1,
        }
    }
}

pub struct ActivityAggregator<'a> {
    log: &'a dyn ActivityLogReader,
}

impl<'a> ActivityAggregator<'a> {
    pub fn new(log: &'a dyn ActivityLogReader) -> Self {
        Self { log }
    }

    /// One `RuleKpi` per rule, in rule order. Rules without activity get
    /// zero counts; activity of unknown rules is ignored.
    pub fn rule_kpis(&self, rules: &[Rule], ctx: &LogContext) -> ApprovalResult<Vec<RuleKpi>> {
        let groups = self.log.distinct_rule_state_files()?;

        let mut counts_by_rule: HashMap<i64, StateCounts> = HashMap::new();
        for group in &groups {
            counts_by_rule
                .entry(group.rule_id)
                .or_default()
                .increment(group.new_state);
        }

        let kpis: Vec<RuleKpi> = rules
            .iter()
            .map(|rule| {
                let counts = counts_by_rule.get(&rule.id).copied().unwrap_or_default();
                RuleKpi {
                    rule_id: rule.id,
                    description: rule.description.clone(),
                    pending_count: counts.pending,
                    approved_count: counts.approved,
                    rejected_count: counts.rejected,
                }
            })
            .collect();

        crate::log_info!(ctx, "KPIS_COMPUTED", rules = kpis.len(), groups = groups.len());
        Ok(kpis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::model::{RuleDraft, RuleEntity};
    use crate::storage::activity_log::InMemoryActivityLog;
    use crate::storage::models::NewActivity;

    fn rule(id: i64) -> Rule {
        Rule::from_draft(
            id,
            RuleDraft {
                tag_pending: id * 10,
                tag_approved: id * 10 + 1,
                tag_rejected: id * 10 + 2,
                approvers: vec![RuleEntity::user("alice")],
                requesters: vec![RuleEntity::user("bob")],
                description: format!("rule {}", id),
            },
        )
    }

    #[test]
    fn test_rules_without_activity() {
        let log = InMemoryActivityLog::new();
        let kpis = ActivityAggregator::new(&log)
            .rule_kpis(&[rule(1), rule(2)], &LogContext::new("test"))
            .unwrap();
        assert_eq!(kpis.len(), 2);
        for kpi in kpis {
            assert_eq!(
                (kpi.pending_count, kpi.approved_count, kpi.rejected_count),
                (0, 0, 0)
            );
        }
    }

    #[test]
    fn test_counts_are_not_exclusive() {
        let log = InMemoryActivityLog::new();
        log.append(NewActivity::new(100, 1, ApprovalState::Pending, 1));
        log.append(NewActivity::new(100, 1, ApprovalState::Approved, 2));

        let kpis = ActivityAggregator::new(&log)
            .rule_kpis(&[rule(1)], &LogContext::new("test"))
            .unwrap();
        assert_eq!(kpis[0].pending_count, 1);
        assert_eq!(kpis[0].approved_count, 1);
        assert_eq!(kpis[0].rejected_count, 0);
    }

    #[test]
    fn test_distinct_files_counted_once() {
        let log = InMemoryActivityLog::new();
        // Same file requested three times under the same rule
        for ts in 1..=3 {
            log.append(NewActivity::new(7, 1, ApprovalState::Pending, ts));
        }
        log.append(NewActivity::new(8, 1, ApprovalState::Pending, 4));
        log.append(NewActivity::new(9, 1, ApprovalState::Rejected, 5));
        // Unknown rule is ignored
        log.append(NewActivity::new(9, 42, ApprovalState::Rejected, 6));

        let kpis = ActivityAggregator::new(&log)
            .rule_kpis(&[rule(1)], &LogContext::new("test"))
            .unwrap();
        assert_eq!(kpis.len(), 1);
        assert_eq!(kpis[0].pending_count, 2);
        assert_eq!(kpis[0].rejected_count, 1);
        assert_eq!(kpis[0].description, "rule 1");
    }

    #[test]
    fn test_kpi_wire_format() {
        let kpi = RuleKpi {
            rule_id: 1,
            description: "d".to_string(),
            pending_count: 2,
            approved_count: 0,
            rejected_count: 1,
        };
        let value = serde_json::to_value(&kpi).unwrap();
        assert_eq!(value["rule_id"], 1);
        assert_eq!(value["pending_count"], 2);
    }
}
