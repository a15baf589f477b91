//! Approval Center Core - approval workflow reporting and rule management
//!
//! This crate provides the logic behind the approval center of a
//! content-management platform: files are tagged pending, approved or
//! rejected under approval rules, and every transition is appended to an
//! activity log. The platform itself (file tree, users, circles, tags,
//! HTTP routing) stays outside and is reached through traits.
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `reporting` - KPI aggregation and latest-state resolution
//! - `rules` - rule model, storage, validation, display-name enrichment
//! - `storage` - activity log models, SQL builders and backends
//! - `platform` - collaborator traits and the circle capability
//! - `api` - request-scoped endpoints and the response envelope
//! - `config` - core configuration
//! - `logging` - structured logging with request context
//!
//! With the `python` feature the read endpoints are exposed to a Python
//! host through PyO3.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod reporting;
pub mod rules;
pub mod storage;

pub use api::{ApiResponse, ApprovalApi, PlatformServices};
pub use config::CoreConfig;
pub use error::{ApprovalError, ApprovalResult, ResolveError};

/// Initialize the module-level logger.
///
/// Safe to call repeatedly; only the first call installs the logger.
/// `RUST_LOG` overrides the configured level.
pub fn init_logger(config: &CoreConfig) {
    let _ = env_logger::builder()
        .filter_level(config.level_filter())
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

#[cfg(feature = "python")]
mod python {
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::config::CoreConfig;
    use crate::error::{ApprovalError, ResolveError};
    use crate::platform::{CircleLookup, FileResolver, IdentityResolver, MembershipResolver};
    use crate::reporting::context::RequestContext;
    use crate::reporting::kpi::ActivityAggregator;
    use crate::reporting::latest::LatestStateResolver;
    use crate::rules::enrichment::RuleEnricher;
    use crate::rules::model::Rule;
    use crate::storage::activity_log::PrefetchedActivityLog;
    use crate::storage::queries;

    fn to_py_err(e: ApprovalError) -> PyErr {
        PyValueError::new_err(e.to_string())
    }

    fn init() {
        crate::init_logger(&CoreConfig::default());
    }

    /// Calls `resolver(file_id)`; `None` means the file is gone.
    struct PyFileResolver(PyObject);

    impl FileResolver for PyFileResolver {
        fn resolve_by_id(&self, file_id: i64) -> Result<String, ResolveError> {
            Python::with_gil(|py| {
                let result = self
                    .0
                    .call1(py, (file_id,))
                    .map_err(|e| ResolveError::Failed(e.to_string()))?;
                let path: Option<String> = result
                    .extract(py)
                    .map_err(|e| ResolveError::Failed(e.to_string()))?;
                path.ok_or_else(|| ResolveError::not_found("file", file_id))
            })
        }
    }

    /// Calls `resolver(user_id)`; `None` or an exception means unknown user.
    struct PyIdentityResolver(PyObject);

    impl IdentityResolver for PyIdentityResolver {
        fn display_name_for_user(&self, user_id: &str) -> Option<String> {
            Python::with_gil(|py| {
                self.0
                    .call1(py, (user_id,))
                    .and_then(|r| r.extract::<Option<String>>(py))
                    .ok()
                    .flatten()
            })
        }
    }

    /// Wraps an object with `start_session()`, `stop_session()` and
    /// `display_name(circle_id)` methods.
    struct PyMembershipResolver(PyObject);

    impl PyMembershipResolver {
        fn call_session_method(&self, name: &str) {
            Python::with_gil(|py| {
                if let Err(e) = self.0.call_method0(py, name) {
                    log::warn!("CIRCLE_SESSION_CALL_FAILED method={} error={}", name, e);
                }
            });
        }
    }

    impl MembershipResolver for PyMembershipResolver {
        fn start_session(&self) {
            self.call_session_method("start_session");
        }

        fn stop_session(&self) {
            self.call_session_method("stop_session");
        }

        fn display_name_for_circle(&self, circle_id: &str) -> Result<String, ResolveError> {
            Python::with_gil(|py| {
                let result = self
                    .0
                    .call_method1(py, "display_name", (circle_id,))
                    .map_err(|e| ResolveError::Failed(e.to_string()))?;
                let name: Option<String> = result
                    .extract(py)
                    .map_err(|e| ResolveError::Failed(e.to_string()))?;
                name.ok_or_else(|| ResolveError::not_found("circle", circle_id))
            })
        }
    }

    fn parse_rules(rules_json: &str) -> PyResult<Vec<Rule>> {
        serde_json::from_str(rules_json).map_err(|e| to_py_err(e.into()))
    }

    /// SQL for the grouped KPI rows: (rule_id, new_state, file_id).
    #[pyfunction]
    fn kpi_query() -> String {
        queries::build_kpi_query()
    }

    /// SQL for the latest-state rows: (id, file_id, rule_id, new_state, timestamp).
    #[pyfunction]
    fn latest_state_query() -> String {
        queries::build_latest_state_query()
    }

    #[pyfunction]
    fn activity_table_ddl() -> String {
        queries::build_activity_table_ddl()
    }

    /// Compute per-rule KPIs from grouped KPI rows.
    ///
    /// # Arguments
    /// * `kpi_rows` - Rows of `kpi_query()`
    /// * `rules_json` - JSON array of rules
    ///
    /// # Returns
    /// JSON array of KPIs
    #[pyfunction]
    fn compute_workflow_kpis(kpi_rows: Vec<(i64, i64, i64)>, rules_json: String) -> PyResult<String> {
        init();
        let rules = parse_rules(&rules_json)?;
        let request = RequestContext::new("compute_workflow_kpis");
        let log = PrefetchedActivityLog::kpi_only(kpi_rows);

        let kpis = ActivityAggregator::new(&log)
            .rule_kpis(&rules, &request.log_context())
            .map_err(to_py_err)?;
        serde_json::to_string(&kpis).map_err(|e| to_py_err(e.into()))
    }

    /// Resolve the latest state of every file.
    ///
    /// # Arguments
    /// * `latest_rows` - Rows of `latest_state_query()`
    /// * `file_resolver` - Callable `file_id -> Optional[str]`
    ///
    /// # Returns
    /// JSON array of file snapshots
    #[pyfunction]
    fn resolve_latest_files(
        latest_rows: Vec<(i64, i64, i64, i64, i64)>,
        file_resolver: PyObject,
    ) -> PyResult<String> {
        init();
        let request = RequestContext::new("resolve_latest_files");
        let log = PrefetchedActivityLog::latest_only(latest_rows);
        let files = PyFileResolver(file_resolver);

        let snapshots = LatestStateResolver::new(&log, &files)
            .snapshots(&request.log_context())
            .map_err(to_py_err)?;
        serde_json::to_string(&snapshots).map_err(|e| to_py_err(e.into()))
    }

    /// Fill in approver/requester display names.
    ///
    /// # Arguments
    /// * `rules_json` - JSON array of rules
    /// * `user_resolver` - Callable `user_id -> Optional[str]`
    /// * `circle_resolver` - Circle directory object, `None` when circles
    ///   are not installed
    #[pyfunction]
    #[pyo3(signature = (rules_json, user_resolver, circle_resolver=None, circles_enabled=true))]
    fn enrich_rules(
        rules_json: String,
        user_resolver: PyObject,
        circle_resolver: Option<PyObject>,
        circles_enabled: bool,
    ) -> PyResult<String> {
        init();
        let rules = parse_rules(&rules_json)?;
        let request = RequestContext::new("enrich_rules");
        let identities = PyIdentityResolver(user_resolver);
        let membership = circle_resolver.map(PyMembershipResolver);
        let circles = CircleLookup::select(
            circles_enabled,
            membership.as_ref().map(|m| m as &dyn MembershipResolver),
        );

        let enriched = RuleEnricher::new(&identities, circles).enrich(rules, &request.log_context());
        serde_json::to_string(&enriched).map_err(|e| to_py_err(e.into()))
    }

    /// Python module definition
    #[pymodule]
    fn approval_center_core(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(kpi_query, m)?)?;
        m.add_function(wrap_pyfunction!(latest_state_query, m)?)?;
        m.add_function(wrap_pyfunction!(activity_table_ddl, m)?)?;
        m.add_function(wrap_pyfunction!(compute_workflow_kpis, m)?)?;
        m.add_function(wrap_pyfunction!(resolve_latest_files, m)?)?;
        m.add_function(wrap_pyfunction!(enrich_rules, m)?)?;
        Ok(())
    }
}
