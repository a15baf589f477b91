//! SQLite-backed activity log.
//!
//! Reads open a read-only connection per query; the connection is dropped
//! before the call returns, so nothing is held across requests.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};

use crate::config::CoreConfig;
use crate::error::ApprovalResult;
use crate::storage::activity_log::ActivityLogReader;
use crate::storage::models::{state_from_row, ActivityRecord, NewActivity, RuleStateFile};
use crate::storage::queries::{
    build_activity_insert, build_activity_table_ddl, build_kpi_query, build_latest_state_query,
};

#[derive(Debug, Clone)]
pub struct SqliteActivityLog {
    path: PathBuf,
}

impl SqliteActivityLog {
    /// Open (creating if needed) the log at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> ApprovalResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        conn.execute_batch(&build_activity_table_ddl())?;
        log::info!("ACTIVITY_LOG_OPENED path={}", path.display());
        Ok(Self { path })
    }

    /// Open the log named by `activity_db_path`, or `None` when the host
    /// did not configure one.
    pub fn from_config(config: &CoreConfig) -> ApprovalResult<Option<Self>> {
        config
            .activity_db_path
            .as_deref()
            .map(|path| Self::open(path))
            .transpose()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one transition. Used by the host-side event listener, never by
    /// the reporting stages.
    pub fn append(&self, activity: NewActivity) -> ApprovalResult<ActivityRecord> {
        let conn = Connection::open(&self.path)?;
        conn.execute(
            &build_activity_insert(),
            params![
                activity.file_id,
                activity.rule_id,
                activity.new_state.code(),
                activity.timestamp
            ],
        )?;
        Ok(ActivityRecord {
            id: conn.last_insert_rowid(),
            file_id: activity.file_id,
            rule_id: activity.rule_id,
            new_state: activity.new_state,
            timestamp: activity.timestamp,
        })
    }

    fn read_connection(&self) -> ApprovalResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }
}

impl ActivityLogReader for SqliteActivityLog {
    fn distinct_rule_state_files(&self) -> ApprovalResult<Vec<RuleStateFile>> {
        let conn = self.read_connection()?;
        let mut stmt = conn.prepare(&build_kpi_query())?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(rule_id, state, file_id)| {
                Some(RuleStateFile {
                    rule_id,
                    new_state: state_from_row(state, file_id)?,
                    file_id,
                })
            })
            .collect())
    }

    fn latest_per_file(&self) -> ApprovalResult<Vec<ActivityRecord>> {
        let conn = self.read_connection()?;
        let mut stmt = conn.prepare(&build_latest_state_query())?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, file_id, rule_id, state, timestamp)| {
                Some(ActivityRecord {
                    id,
                    file_id,
                    rule_id,
                    new_state: state_from_row(state, file_id)?,
                    timestamp,
                })
            })
            .collect())
    }
}
