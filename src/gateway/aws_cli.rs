//! `PipelineGateway` backed by the `aws codepipeline` command line.
//!
//! Every call spawns a fresh CLI process with the profile/region from the
//! supplied `GatewayConfig`; nothing is cached between calls.

use super::resolution::{
    ActionDeclaration, ActionState, StageDeclaration, StageState, resolve_pending_approvals,
};
use super::{ApprovalAction, PipelineGateway, PipelineSnapshot, STATUS_NOT_STARTED, StageStatus};
use crate::config::GatewayConfig;
use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ffi::OsString;
use std::io;
use std::process::{Command, Output};

pub const DEFAULT_AWS_CLI: &str = "aws";

const SOURCE_CATEGORY: &str = "Source";

pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<Output>;
}

#[derive(Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<Output> {
        Command::new(program).args(args).output()
    }
}

pub struct AwsCliGateway<R: CommandRunner = ProcessCommandRunner> {
    program: String,
    runner: R,
}

impl AwsCliGateway<ProcessCommandRunner> {
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(program, ProcessCommandRunner)
    }
}

impl<R: CommandRunner> AwsCliGateway<R> {
    pub fn with_runner(program: impl Into<String>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    fn invoke(&self, config: &GatewayConfig, subcommand: &str, args: &[String]) -> Result<String> {
        let mut argv: Vec<OsString> = vec!["codepipeline".into(), subcommand.into()];
        argv.extend(args.iter().map(OsString::from));
        argv.extend(
            [
                "--profile",
                config.profile.as_str(),
                "--region",
                config.region.as_str(),
                "--output",
                "json",
            ]
            .into_iter()
            .map(OsString::from),
        );

        tracing::debug!(
            program = %self.program,
            subcommand,
            profile = %config.profile,
            region = %config.region,
            "invoking aws cli"
        );

        let output = self
            .runner
            .run(&self.program, &argv)
            .with_context(|| {
                format!("Failed to run `{} codepipeline {subcommand}`", self.program)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            bail!(
                "`{} codepipeline {subcommand}` exited with {}{}",
                self.program,
                output.status,
                if detail.is_empty() {
                    String::new()
                } else {
                    format!(": {detail}")
                }
            );
        }

        String::from_utf8(output.stdout)
            .with_context(|| format!("`codepipeline {subcommand}` printed non UTF-8 output"))
    }

    fn invoke_json<T: DeserializeOwned>(
        &self,
        config: &GatewayConfig,
        subcommand: &str,
        args: &[String],
    ) -> Result<T> {
        let stdout = self.invoke(config, subcommand, args)?;
        serde_json::from_str(&stdout)
            .with_context(|| format!("Failed to decode `codepipeline {subcommand}` response"))
    }

    fn pipeline_names(&self, config: &GatewayConfig) -> Result<Vec<String>> {
        let listed: ListPipelinesOutput = self.invoke_json(config, "list-pipelines", &[])?;
        Ok(listed.pipelines.into_iter().map(|p| p.name).collect())
    }

    fn pipeline_declaration(&self, config: &GatewayConfig, name: &str) -> Result<WirePipeline> {
        let output: GetPipelineOutput =
            self.invoke_json(config, "get-pipeline", &["--name".to_string(), name.to_string()])?;
        Ok(output.pipeline)
    }

    fn pipeline_state(&self, config: &GatewayConfig, name: &str) -> Result<GetPipelineStateOutput> {
        self.invoke_json(
            config,
            "get-pipeline-state",
            &["--name".to_string(), name.to_string()],
        )
    }
}

impl<R: CommandRunner> PipelineGateway for AwsCliGateway<R> {
    fn list_pending_approvals(&self, config: &GatewayConfig) -> Result<Vec<ApprovalAction>> {
        let mut approvals = Vec::new();
        for name in self.pipeline_names(config)? {
            let declaration = self.pipeline_declaration(config, &name)?;
            let state = self.pipeline_state(config, &name)?;
            approvals.extend(resolve_pending_approvals(
                &name,
                &declaration.stage_declarations(),
                &state.stage_states(),
            ));
        }
        tracing::debug!(count = approvals.len(), "resolved pending approvals");
        Ok(approvals)
    }

    fn submit_approval_decision(
        &self,
        config: &GatewayConfig,
        action: &ApprovalAction,
        approved: bool,
        comment: &str,
    ) -> Result<()> {
        let result = serde_json::json!({
            "summary": comment,
            "status": if approved { "Approved" } else { "Rejected" },
        });
        let args = vec![
            "--pipeline-name".to_string(),
            action.pipeline_name.clone(),
            "--stage-name".to_string(),
            action.stage_name.clone(),
            "--action-name".to_string(),
            action.action_name.clone(),
            "--token".to_string(),
            action.token.clone(),
            "--result".to_string(),
            result.to_string(),
        ];
        self.invoke(config, "put-approval-result", &args)
            .with_context(|| format!("Approval decision for {} was not accepted", action.key()))?;
        Ok(())
    }

    fn list_pipeline_statuses(&self, config: &GatewayConfig) -> Result<Vec<PipelineSnapshot>> {
        self.pipeline_names(config)?
            .into_iter()
            .map(|name| {
                let state = self.pipeline_state(config, &name)?;
                Ok(state.into_snapshot(name))
            })
            .collect()
    }

    fn start_pipeline_execution(
        &self,
        config: &GatewayConfig,
        pipeline_name: &str,
        revision_id: Option<&str>,
    ) -> Result<String> {
        let mut args = vec!["--name".to_string(), pipeline_name.to_string()];

        if let Some(revision) = revision_id.map(str::trim).filter(|r| !r.is_empty()) {
            let declaration = self.pipeline_declaration(config, pipeline_name)?;
            let source_action = declaration.source_action_name().ok_or_else(|| {
                anyhow!("Pipeline {pipeline_name} has no Source action to pin a revision on")
            })?;
            args.push("--source-revisions".to_string());
            args.push(format!(
                "actionName={source_action},revisionType=COMMIT_ID,revisionValue={revision}"
            ));
        }

        let output: StartPipelineExecutionOutput =
            self.invoke_json(config, "start-pipeline-execution", &args)?;
        Ok(output.pipeline_execution_id)
    }
}

// Wire types for the CLI's JSON output.

#[derive(Deserialize)]
struct ListPipelinesOutput {
    #[serde(default)]
    pipelines: Vec<PipelineSummary>,
}

#[derive(Deserialize)]
struct PipelineSummary {
    name: String,
}

#[derive(Deserialize)]
struct GetPipelineOutput {
    pipeline: WirePipeline,
}

#[derive(Deserialize)]
struct WirePipeline {
    #[serde(default)]
    stages: Vec<WireStage>,
}

#[derive(Deserialize)]
struct WireStage {
    name: String,
    #[serde(default)]
    actions: Vec<WireAction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAction {
    name: String,
    action_type_id: ActionTypeId,
}

#[derive(Deserialize)]
struct ActionTypeId {
    category: String,
}

impl WirePipeline {
    fn stage_declarations(&self) -> Vec<StageDeclaration> {
        self.stages
            .iter()
            .map(|stage| StageDeclaration {
                name: stage.name.clone(),
                actions: stage
                    .actions
                    .iter()
                    .map(|action| ActionDeclaration {
                        name: action.name.clone(),
                        category: action.action_type_id.category.clone(),
                    })
                    .collect(),
            })
            .collect()
    }

    fn source_action_name(&self) -> Option<&str> {
        self.stages
            .iter()
            .flat_map(|stage| stage.actions.iter())
            .find(|action| action.action_type_id.category == SOURCE_CATEGORY)
            .map(|action| action.name.as_str())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetPipelineStateOutput {
    #[serde(default)]
    stage_states: Vec<WireStageState>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStageState {
    stage_name: String,
    latest_execution: Option<WireStageExecution>,
    #[serde(default)]
    action_states: Vec<WireActionState>,
}

#[derive(Deserialize)]
struct WireStageExecution {
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireActionState {
    action_name: String,
    latest_execution: Option<WireActionExecution>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireActionExecution {
    status: Option<String>,
    token: Option<String>,
    last_status_change: Option<Value>,
}

impl GetPipelineStateOutput {
    fn stage_states(&self) -> Vec<StageState> {
        self.stage_states
            .iter()
            .map(|stage| StageState {
                stage_name: stage.stage_name.clone(),
                action_states: stage
                    .action_states
                    .iter()
                    .map(|action| ActionState {
                        action_name: action.action_name.clone(),
                        latest_status: action
                            .latest_execution
                            .as_ref()
                            .and_then(|e| e.status.clone()),
                        token: action.latest_execution.as_ref().and_then(|e| e.token.clone()),
                    })
                    .collect(),
            })
            .collect()
    }

    fn into_snapshot(self, name: String) -> PipelineSnapshot {
        let stages = self
            .stage_states
            .into_iter()
            .map(|stage| {
                let last_updated = stage
                    .action_states
                    .iter()
                    .filter_map(|a| a.latest_execution.as_ref())
                    .filter_map(|e| e.last_status_change.as_ref())
                    .filter_map(parse_timestamp)
                    .max();
                StageStatus {
                    name: stage.stage_name,
                    status: stage
                        .latest_execution
                        .map(|e| e.status)
                        .unwrap_or_else(|| STATUS_NOT_STARTED.to_string()),
                    last_updated,
                }
            })
            .collect();
        PipelineSnapshot { name, stages }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartPipelineExecutionOutput {
    pipeline_execution_id: String,
}

/// CLI v2 prints ISO-8601 strings; v1 (and `cli_timestamp_format = none`)
/// prints epoch seconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let millis = (n.as_f64()? * 1000.0).round() as i64;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}
