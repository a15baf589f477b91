//! Read access to the activity log.
//!
//! The reporting stages only ever see `ActivityLogReader`. Three backends
//! implement it: an in-memory append-only log, a log prefetched by the host
//! (the host runs the queries from `storage::queries` and passes the rows
//! in), and `SqliteActivityLog`.

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;

use crate::error::ApprovalResult;
use crate::storage::models::{state_from_row, ActivityRecord, NewActivity, RuleStateFile};

/// Read-only query capability over the append-only activity log.
pub trait ActivityLogReader: Send + Sync {
    /// Distinct (rule, state, file) triples, one per group.
    fn distinct_rule_state_files(&self) -> ApprovalResult<Vec<RuleStateFile>>;

    /// Every record whose timestamp equals its file's maximum timestamp.
    /// Ties are all returned.
    fn latest_per_file(&self) -> ApprovalResult<Vec<ActivityRecord>>;
}

/// Group records by (rule, state, file), collapsing duplicates.
pub fn group_distinct(records: &[ActivityRecord]) -> Vec<RuleStateFile> {
    records
        .iter()
        .map(|r| RuleStateFile {
            rule_id: r.rule_id,
            new_state: r.new_state,
            file_id: r.file_id,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Records matching their file's maximum timestamp.
pub fn rows_at_max_timestamp(records: &[ActivityRecord]) -> Vec<ActivityRecord> {
    let mut max_by_file: HashMap<i64, i64> = HashMap::new();
    for record in records {
        max_by_file
            .entry(record.file_id)
            .and_modify(|ts| *ts = (*ts).max(record.timestamp))
            .or_insert(record.timestamp);
    }

    records
        .iter()
        .filter(|r| max_by_file.get(&r.file_id) == Some(&r.timestamp))
        .cloned()
        .collect()
}

/// Append-only log kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryActivityLog {
    records: RwLock<Vec<ActivityRecord>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition and return the stored record.
    pub fn append(&self, activity: NewActivity) -> ActivityRecord {
        let mut records = self.records.write();
        let record = ActivityRecord {
            id: records.len() as i64 + 1,
            file_id: activity.file_id,
            rule_id: activity.rule_id,
            new_state: activity.new_state,
            timestamp: activity.timestamp,
        };
        records.push(record.clone());
        record
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn records(&self) -> Vec<ActivityRecord> {
        self.records.read().clone()
    }
}

impl ActivityLogReader for InMemoryActivityLog {
    fn distinct_rule_state_files(&self) -> ApprovalResult<Vec<RuleStateFile>> {
        Ok(group_distinct(&self.records.read()))
    }

    fn latest_per_file(&self) -> ApprovalResult<Vec<ActivityRecord>> {
        Ok(rows_at_max_timestamp(&self.records.read()))
    }
}

/// Query results fetched by the host.
///
/// Rows carrying an unknown state code are dropped with a warning.
#[derive(Debug, Clone, Default)]
pub struct PrefetchedActivityLog {
    distinct: Vec<RuleStateFile>,
    latest: Vec<ActivityRecord>,
}

impl PrefetchedActivityLog {
    /// # Arguments
    /// * `kpi_rows` - (rule_id, new_state, file_id) from `build_kpi_query`
    /// * `latest_rows` - (id, file_id, rule_id, new_state, timestamp) from
    ///   `build_latest_state_query`
    pub fn from_rows(
        kpi_rows: Vec<(i64, i64, i64)>,
        latest_rows: Vec<(i64, i64, i64, i64, i64)>,
    ) -> Self {
        let distinct = kpi_rows
            .into_iter()
            .filter_map(|(rule_id, state_code, file_id)| {
                let new_state = state_from_row(state_code, file_id)?;
                Some(RuleStateFile {
                    rule_id,
                    new_state,
                    file_id,
                })
            })
            .collect();

        let latest = latest_rows
            .into_iter()
            .filter_map(|(id, file_id, rule_id, state_code, timestamp)| {
                let new_state = state_from_row(state_code, file_id)?;
                Some(ActivityRecord {
                    id,
                    file_id,
                    rule_id,
                    new_state,
                    timestamp,
                })
            })
            .collect();

        Self { distinct, latest }
    }

    pub fn kpi_only(kpi_rows: Vec<(i64, i64, i64)>) -> Self {
        Self::from_rows(kpi_rows, Vec::new())
    }

    pub fn latest_only(latest_rows: Vec<(i64, i64, i64, i64, i64)>) -> Self {
        Self::from_rows(Vec::new(), latest_rows)
    }
}

impl ActivityLogReader for PrefetchedActivityLog {
    fn distinct_rule_state_files(&self) -> ApprovalResult<Vec<RuleStateFile>> {
        Ok(self.distinct.clone())
    }

    fn latest_per_file(&self) -> ApprovalResult<Vec<ActivityRecord>> {
        Ok(self.latest.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::ApprovalState;

    fn sample_log() -> InMemoryActivityLog {
        let log = InMemoryActivityLog::new();
        log.append(NewActivity::new(10, 1, ApprovalState::Pending, 100));
        log.append(NewActivity::new(10, 1, ApprovalState::Pending, 150));
        log.append(NewActivity::new(10, 1, ApprovalState::Approved, 200));
        log.append(NewActivity::new(11, 2, ApprovalState::Rejected, 120));
        log
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let log = sample_log();
        let ids: Vec<i64> = log.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_group_distinct_collapses_duplicates() {
        let groups = sample_log().distinct_rule_state_files().unwrap();
        assert_eq!(groups.len(), 3);
        assert!(groups.contains(&RuleStateFile {
            rule_id: 1,
            new_state: ApprovalState::Pending,
            file_id: 10
        }));
    }

    #[test]
    fn test_latest_per_file() {
        let mut latest = sample_log().latest_per_file().unwrap();
        latest.sort_by_key(|r| r.file_id);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].new_state, ApprovalState::Approved);
        assert_eq!(latest[0].timestamp, 200);
        assert_eq!(latest[1].file_id, 11);
    }

    #[test]
    fn test_latest_keeps_ties() {
        let log = InMemoryActivityLog::new();
        log.append(NewActivity::new(5, 1, ApprovalState::Pending, 300));
        log.append(NewActivity::new(5, 1, ApprovalState::Approved, 300));
        assert_eq!(log.latest_per_file().unwrap().len(), 2);
    }

    #[test]
    fn test_prefetched_skips_unknown_states() {
        let log = PrefetchedActivityLog::from_rows(
            vec![(1, 1, 10), (1, 9, 11)],
            vec![(1, 10, 1, 1, 100), (2, 11, 1, 0, 100)],
        );
        assert_eq!(log.distinct_rule_state_files().unwrap().len(), 1);
        let latest = log.latest_per_file().unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].file_id, 10);
    }
}
