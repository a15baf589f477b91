//! SQL query builders.
//!
//! Generates the SQL for the activity log. Hosts that own the database
//! connection execute these themselves and hand the rows back;
//! `SqliteActivityLog` executes them directly.
//!
//! The read queries only consider rows with a known state code, so a stray
//! row never hides a file's earlier valid history.

use crate::storage::models::known_state_codes_sql;

/// Name of the activity log table.
pub const ACTIVITY_TABLE: &str = "approval_activity";

/// Columns of the activity log table, in select order.
pub fn get_activity_columns() -> Vec<&'static str> {
    vec!["id", "file_id", "rule_id", "new_state", "timestamp"]
}

/// DDL for the activity log table and its lookup indexes.
pub fn build_activity_table_ddl() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_id INTEGER NOT NULL,
            rule_id INTEGER NOT NULL,
            new_state INTEGER NOT NULL,
            timestamp INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_file_ts ON {table} (file_id, timestamp);
        CREATE INDEX IF NOT EXISTS idx_{table}_rule_state ON {table} (rule_id, new_state);",
        table = ACTIVITY_TABLE
    )
}

/// Build the INSERT for one transition. Parameters: file_id, rule_id,
/// new_state, timestamp.
pub fn build_activity_insert() -> String {
    format!(
        "INSERT INTO {} (file_id, rule_id, new_state, timestamp) VALUES (?1, ?2, ?3, ?4)",
        ACTIVITY_TABLE
    )
}

/// Build the grouped KPI query.
///
/// Yields one row per distinct (rule_id, new_state, file_id): the set of
/// files that ever reached a state under a rule, not their latest state.
pub fn build_kpi_query() -> String {
    format!(
        "SELECT rule_id, new_state, file_id FROM {} WHERE new_state IN ({}) GROUP BY rule_id, new_state, file_id",
        ACTIVITY_TABLE,
        known_state_codes_sql()
    )
}

/// Build the latest-state query.
///
/// Joins every row against the per-file maximum timestamp. Files whose
/// maximum is shared by several rows come back once per such row; the
/// caller picks among them (see `reporting::latest`). Rows with an unknown
/// state code take no part, so such a file reports its latest valid row.
pub fn build_latest_state_query() -> String {
    format!(
        "SELECT aa.id, aa.file_id, aa.rule_id, aa.new_state, aa.timestamp
         FROM {table} aa
         INNER JOIN (
             SELECT file_id, MAX(timestamp) AS max_timestamp
             FROM {table}
             WHERE new_state IN ({states})
             GROUP BY file_id
         ) latest_aa
         ON aa.file_id = latest_aa.file_id AND aa.timestamp = latest_aa.max_timestamp
         WHERE aa.new_state IN ({states})",
        table = ACTIVITY_TABLE,
        states = known_state_codes_sql()
    )
}
