//! Latest approval state per file.
//!
//! For every file present in the activity log, the record with the highest
//! timestamp decides its current state. When several records share that
//! timestamp, the one appended last (highest record id) wins.
//!
//! Rows with an unknown state code are invisible here: the SQL backends
//! exclude them before taking the maximum, so the file reports its latest
//! valid row. Hosts feeding `PrefetchedActivityLog` from their own query
//! should filter the same way, otherwise such a file is left out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ApprovalResult;
use crate::logging::structured::LogContext;
use crate::platform::FileResolver;
use crate::storage::activity_log::ActivityLogReader;
use crate::storage::models::{ActivityRecord, ApprovalState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileApprovalSnapshot {
    pub file_id: i64,
    pub path: String,
    pub rule_id: i64,
    /// 1: pending, 2: approved, 3: rejected
    pub status_code: ApprovalState,
    pub timestamp: i64,
}

/// Reduce candidate rows to one record per file: highest timestamp, then
/// highest record id.
pub fn pick_latest(rows: Vec<ActivityRecord>) -> BTreeMap<i64, ActivityRecord> {
    let mut latest: BTreeMap<i64, ActivityRecord> = BTreeMap::new();
    for row in rows {
        let newer = latest
            .get(&row.file_id)
            .map_or(true, |current| (row.timestamp, row.id) > (current.timestamp, current.id));
        if newer {
            latest.insert(row.file_id, row);
        }
    }
    latest
}

pub struct LatestStateResolver<'a> {
    log: &'a dyn ActivityLogReader,
    files: &'a dyn FileResolver,
}

impl<'a> LatestStateResolver<'a> {
    pub fn new(log: &'a dyn ActivityLogReader, files: &'a dyn FileResolver) -> Self {
        Self { log, files }
    }

    /// Snapshot of every file that still resolves to a path.
    ///
    /// Files whose lookup fails are left out and logged; the remaining
    /// files are still reported. The result is ordered by file id, which
    /// callers should not depend on.
    pub fn snapshots(&self, ctx: &LogContext) -> ApprovalResult<Vec<FileApprovalSnapshot>> {
        let rows = self.log.latest_per_file()?;
        let row_count = rows.len();
        let latest = pick_latest(rows);

        let mut snapshots = Vec::with_capacity(latest.len());
        let mut skipped = 0usize;
        for record in latest.into_values() {
            let file_ctx = ctx.with_file(record.file_id);
            match self.files.resolve_by_id(record.file_id) {
                Ok(path) => snapshots.push(FileApprovalSnapshot {
                    file_id: record.file_id,
                    path,
                    rule_id: record.rule_id,
                    status_code: record.new_state,
                    timestamp: record.timestamp,
                }),
                Err(e) if e.is_not_found() => {
                    skipped += 1;
                    crate::log_warn!(file_ctx, "FILE_NOT_FOUND", state = record.new_state);
                }
                Err(e) => {
                    skipped += 1;
                    crate::log_warn!(file_ctx, "FILE_LOOKUP_FAILED", error = e.to_string());
                }
            }
        }

        log::info!(
            "{} LATEST_STATES_RESOLVED rows={} files={} skipped={}",
            ctx,
            row_count,
            snapshots.len(),
            skipped
        );
        Ok(snapshots)
    }
}
