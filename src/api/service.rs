//! Approval endpoints.
//!
//! `ApprovalApi` wires the platform collaborators to the reports and the
//! rule management. Each call is stateless: it reads the log and the rules
//! afresh and keeps nothing between calls.

use std::sync::Arc;

use crate::api::response::ApiResponse;
use crate::config::CoreConfig;
use crate::error::ApprovalResult;
use crate::logging::structured::LogContext;
use crate::platform::{
    CircleLookup, FileResolver, IdentityResolver, MembershipResolver, TagStore,
};
use crate::reporting::context::RequestContext;
use crate::reporting::kpi::{ActivityAggregator, RuleKpi};
use crate::reporting::latest::{FileApprovalSnapshot, LatestStateResolver};
use crate::rules::enrichment::RuleEnricher;
use crate::rules::manager::RuleManager;
use crate::rules::model::{Rule, RuleDraft};
use crate::rules::store::RuleStore;
use crate::storage::activity_log::ActivityLogReader;
use crate::storage::sqlite::SqliteActivityLog;

/// Platform services the endpoints depend on.
#[derive(Clone)]
pub struct PlatformServices {
    pub activity: Arc<dyn ActivityLogReader>,
    pub rules: Arc<dyn RuleStore>,
    pub files: Arc<dyn FileResolver>,
    pub identities: Arc<dyn IdentityResolver>,
    /// `None` when the circles feature is not installed.
    pub circles: Option<Arc<dyn MembershipResolver>>,
    pub tags: Arc<dyn TagStore>,
}

#[derive(Clone)]
pub struct ApprovalApi {
    config: CoreConfig,
    services: PlatformServices,
}

impl ApprovalApi {
    pub fn new(config: CoreConfig, services: PlatformServices) -> Self {
        Self { config, services }
    }

    /// Build the endpoints with the activity log named by the config's
    /// `activity_db_path`, replacing `services.activity`.
    pub fn with_configured_log(config: CoreConfig, mut services: PlatformServices) -> ApprovalResult<Self> {
        match SqliteActivityLog::from_config(&config)? {
            Some(sqlite) => services.activity = Arc::new(sqlite),
            None => log::debug!("ACTIVITY_LOG_DEFAULT app={} reason=no_db_path", config.app_name),
        }
        Ok(Self::new(config, services))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Rules with approver/requester display names.
    pub fn get_rules(&self) -> ApprovalResult<Vec<Rule>> {
        self.run("get_rules", |ctx| {
            let circles = CircleLookup::select(
                self.config.circles_enabled,
                self.services.circles.as_deref(),
            );
            RuleEnricher::new(self.services.identities.as_ref(), circles)
                .list_enriched(self.services.rules.as_ref(), ctx)
        })
    }

    pub fn get_workflow_kpis(&self) -> ApprovalResult<Vec<RuleKpi>> {
        self.run("get_workflow_kpis", |ctx| {
            let rules = self.services.rules.list_rules()?;
            ActivityAggregator::new(self.services.activity.as_ref()).rule_kpis(&rules, ctx)
        })
    }

    pub fn get_all_approval_files(&self) -> ApprovalResult<Vec<FileApprovalSnapshot>> {
        self.run("get_all_approval_files", |ctx| {
            LatestStateResolver::new(
                self.services.activity.as_ref(),
                self.services.files.as_ref(),
            )
            .snapshots(ctx)
        })
    }

    /// Returns the new rule's id.
    pub fn create_rule(&self, draft: RuleDraft) -> ApprovalResult<i64> {
        self.run("create_rule", |ctx| {
            self.manager().create_rule(draft, ctx).map(|rule| rule.id)
        })
    }

    /// Returns the saved rule's id.
    pub fn save_rule(&self, id: i64, draft: RuleDraft) -> ApprovalResult<i64> {
        self.run("save_rule", |ctx| {
            self.manager().save_rule(id, draft, ctx).map(|rule| rule.id)
        })
    }

    pub fn delete_rule(&self, id: i64) -> ApprovalResult<()> {
        self.run("delete_rule", |ctx| self.manager().delete_rule(id, ctx))
    }

    /// Returns the new tag's id.
    pub fn create_tag(&self, name: &str) -> ApprovalResult<i64> {
        self.run("create_tag", |ctx| {
            self.manager()
                .create_tag(name, self.config.max_tag_name_length, ctx)
        })
    }

    pub fn get_rules_response(&self) -> ApiResponse {
        ApiResponse::from_result(self.get_rules())
    }

    pub fn get_workflow_kpis_response(&self) -> ApiResponse {
        ApiResponse::from_result(self.get_workflow_kpis())
    }

    pub fn get_all_approval_files_response(&self) -> ApiResponse {
        ApiResponse::from_result(self.get_all_approval_files())
    }

    pub fn create_rule_response(&self, draft: RuleDraft) -> ApiResponse {
        ApiResponse::from_result(self.create_rule(draft))
    }

    pub fn save_rule_response(&self, id: i64, draft: RuleDraft) -> ApiResponse {
        ApiResponse::from_result(self.save_rule(id, draft))
    }

    pub fn delete_rule_response(&self, id: i64) -> ApiResponse {
        ApiResponse::from_result(self.delete_rule(id))
    }

    pub fn create_tag_response(&self, name: &str) -> ApiResponse {
        ApiResponse::from_result(self.create_tag(name))
    }

    fn manager(&self) -> RuleManager<'_> {
        RuleManager::new(self.services.rules.as_ref(), self.services.tags.as_ref())
    }

    fn run<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&LogContext) -> ApprovalResult<T>,
    ) -> ApprovalResult<T> {
        let request = RequestContext::new(operation);
        let ctx = request.log_context();
        log::debug!(
            "{} REQUEST_START app={} op={}",
            ctx,
            self.config.app_name,
            request.operation
        );

        let result = f(&ctx);
        match &result {
            Ok(_) => log::info!(
                "{} REQUEST_COMPLETE app={} op={} elapsed_ms={}",
                ctx,
                self.config.app_name,
                request.operation,
                request.elapsed_ms()
            ),
            Err(e) if e.is_client_error() => {
                crate::log_warn!(
                    ctx,
                    "REQUEST_REJECTED",
                    app = self.config.app_name,
                    op = request.operation,
                    error = e.to_string(),
                );
            }
            Err(e) => {
                crate::log_error!(
                    ctx,
                    "REQUEST_FAILED",
                    app = self.config.app_name,
                    op = request.operation,
                    error = e.to_string(),
                    elapsed_ms = request.elapsed_ms(),
                );
            }
        }
        result
    }
}
