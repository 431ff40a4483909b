//! Remote operation gateway: the boundary between the navigator and the
//! cloud provider's delivery-pipeline API.

pub mod aws_cli;
pub mod resolution;


use crate::config::GatewayConfig;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use aws_cli::{AwsCliGateway, CommandRunner, ProcessCommandRunner};
pub use resolution::resolve_pending_approvals;

pub const STATUS_IN_PROGRESS: &str = "InProgress";
pub const STATUS_SUCCEEDED: &str = "Succeeded";
pub const STATUS_FAILED: &str = "Failed";
pub const STATUS_NOT_STARTED: &str = "NotStarted";

/// A pending human decision inside a pipeline stage.
///
/// `token` is issued by the remote system, is single-use, and must be sent
/// back unchanged with the decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApprovalAction {
    pub pipeline_name: String,
    pub stage_name: String,
    pub action_name: String,
    pub token: String,
}

impl ApprovalAction {
    /// `pipeline/stage/action`, unique within one fetch.
    pub fn key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.pipeline_name, self.stage_name, self.action_name
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageStatus {
    pub name: String,
    pub status: String,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Point-in-time run-state of one pipeline, replaced wholesale on refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PipelineSnapshot {
    pub name: String,
    pub stages: Vec<StageStatus>,
}

impl PipelineSnapshot {
    /// Single status summarizing the stages: in-progress wins over failed,
    /// failed over everything else.
    pub fn overall_status(&self) -> &str {
        if self.stages.iter().any(|s| s.status == STATUS_IN_PROGRESS) {
            STATUS_IN_PROGRESS
        } else if self.stages.iter().any(|s| s.status == STATUS_FAILED) {
            STATUS_FAILED
        } else if !self.stages.is_empty()
            && self.stages.iter().all(|s| s.status == STATUS_SUCCEEDED)
        {
            STATUS_SUCCEEDED
        } else {
            self.stages
                .iter()
                .rev()
                .find(|s| s.status != STATUS_NOT_STARTED)
                .map(|s| s.status.as_str())
                .unwrap_or(STATUS_NOT_STARTED)
        }
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.stages.iter().filter_map(|s| s.last_updated).max()
    }
}

/// The four remote entry points the navigator consumes.
///
/// Implementations are called from dispatcher threads and must not keep
/// per-call state.
pub trait PipelineGateway: Send + Sync {
    fn list_pending_approvals(&self, config: &GatewayConfig) -> Result<Vec<ApprovalAction>>;

    fn submit_approval_decision(
        &self,
        config: &GatewayConfig,
        action: &ApprovalAction,
        approved: bool,
        comment: &str,
    ) -> Result<()>;

    fn list_pipeline_statuses(&self, config: &GatewayConfig) -> Result<Vec<PipelineSnapshot>>;

    /// Starts an execution and returns its id. `None` (or an empty string)
    /// runs the latest source revision.
    fn start_pipeline_execution(
        &self,
        config: &GatewayConfig,
        pipeline_name: &str,
        revision_id: Option<&str>,
    ) -> Result<String>;
}
