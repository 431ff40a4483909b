//! Shared fakes for unit tests.

use crate::config::GatewayConfig;
use crate::gateway::{
    ApprovalAction, PipelineGateway, PipelineSnapshot, STATUS_IN_PROGRESS, STATUS_SUCCEEDED,
    StageStatus,
};
use anyhow::{Result, anyhow};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    ListApprovals {
        profile: String,
        region: String,
    },
    Decide {
        key: String,
        token: String,
        approved: bool,
        comment: String,
    },
    ListPipelines {
        profile: String,
        region: String,
    },
    Start {
        pipeline: String,
        revision: Option<String>,
    },
}

/// In-memory gateway that records every call and answers from fixtures.
pub struct FakeGateway {
    approvals: Vec<ApprovalAction>,
    pipelines: Vec<PipelineSnapshot>,
    execution_id: String,
    failure: Option<String>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            approvals: sample_approvals(),
            pipelines: sample_pipelines(),
            execution_id: "exec-0001".to_string(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_approvals(mut self, approvals: Vec<ApprovalAction>) -> Self {
        self.approvals = approvals;
        self
    }

    /// Every call fails with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }
}

impl PipelineGateway for FakeGateway {
    fn list_pending_approvals(&self, config: &GatewayConfig) -> Result<Vec<ApprovalAction>> {
        self.record(GatewayCall::ListApprovals {
            profile: config.profile.clone(),
            region: config.region.clone(),
        })?;
        Ok(self.approvals.clone())
    }

    fn submit_approval_decision(
        &self,
        _config: &GatewayConfig,
        action: &ApprovalAction,
        approved: bool,
        comment: &str,
    ) -> Result<()> {
        self.record(GatewayCall::Decide {
            key: action.key(),
            token: action.token.clone(),
            approved,
            comment: comment.to_string(),
        })
    }

    fn list_pipeline_statuses(&self, config: &GatewayConfig) -> Result<Vec<PipelineSnapshot>> {
        self.record(GatewayCall::ListPipelines {
            profile: config.profile.clone(),
            region: config.region.clone(),
        })?;
        Ok(self.pipelines.clone())
    }

    fn start_pipeline_execution(
        &self,
        _config: &GatewayConfig,
        pipeline_name: &str,
        revision_id: Option<&str>,
    ) -> Result<String> {
        self.record(GatewayCall::Start {
            pipeline: pipeline_name.to_string(),
            revision: revision_id.map(str::to_string),
        })?;
        Ok(self.execution_id.clone())
    }
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        profile: "dev".to_string(),
        region: "eu-west-1".to_string(),
    }
}

pub fn approval(pipeline: &str, stage: &str, action: &str, token: &str) -> ApprovalAction {
    ApprovalAction {
        pipeline_name: pipeline.to_string(),
        stage_name: stage.to_string(),
        action_name: action.to_string(),
        token: token.to_string(),
    }
}

pub fn sample_approvals() -> Vec<ApprovalAction> {
    vec![
        approval("web", "Release", "ProdGate", "tok-web"),
        approval("api", "Deploy", "Review", "tok-api"),
    ]
}

pub fn sample_pipelines() -> Vec<PipelineSnapshot> {
    let stage = |name: &str, status: &str| StageStatus {
        name: name.to_string(),
        status: status.to_string(),
        last_updated: None,
    };
    vec![
        PipelineSnapshot {
            name: "web".to_string(),
            stages: vec![
                stage("Source", STATUS_SUCCEEDED),
                stage("Release", STATUS_IN_PROGRESS),
            ],
        },
        PipelineSnapshot {
            name: "api".to_string(),
            stages: vec![stage("Source", STATUS_SUCCEEDED), stage("Deploy", STATUS_SUCCEEDED)],
        },
    ]
}

pub fn key(code: KeyCode) -> KeyEvent {
    key_with(code, KeyModifiers::empty())
}

pub fn key_with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

pub fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

pub fn ctrl(c: char) -> KeyEvent {
    key_with(KeyCode::Char(c), KeyModifiers::CONTROL)
}
