use super::{OperationKind, UiOperation};
use crate::config::GatewayConfig;
use crate::error::{EngineError, EngineResult};
use crate::gateway::{ApprovalAction, PipelineGateway, PipelineSnapshot};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApproveRequest {
    pub action: ApprovalAction,
    pub approved: bool,
    pub comment: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartExecutionRequest {
    pub pipeline_name: String,
    /// `None` runs the latest source revision.
    pub revision_id: Option<String>,
}

/// Typed parameters for one gateway call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationRequest {
    ListApprovals,
    Decide(ApproveRequest),
    ListPipelines,
    StartExecution(StartExecutionRequest),
}

impl OperationRequest {
    pub fn name(&self) -> &'static str {
        match self {
            OperationRequest::ListApprovals => "list pending approvals",
            OperationRequest::Decide(_) => "submit approval decision",
            OperationRequest::ListPipelines => "list pipeline statuses",
            OperationRequest::StartExecution(_) => "start pipeline execution",
        }
    }

    pub fn loading_label(&self) -> &'static str {
        match self {
            OperationRequest::ListApprovals => "Fetching pending approvals...",
            OperationRequest::Decide(_) => "Submitting decision...",
            OperationRequest::ListPipelines => "Fetching pipeline status...",
            OperationRequest::StartExecution(_) => "Starting pipeline execution...",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationOutput {
    Approvals(Vec<ApprovalAction>),
    Pipelines(Vec<PipelineSnapshot>),
    DecisionSubmitted {
        action: ApprovalAction,
        approved: bool,
    },
    ExecutionStarted {
        pipeline_name: String,
        execution_id: String,
    },
}

fn unsupported(operation: &dyn UiOperation, request: &OperationRequest) -> EngineError {
    EngineError::Internal(format!(
        "{} cannot {}",
        operation.display_name(),
        request.name()
    ))
}

fn list_pipelines(
    gateway: &dyn PipelineGateway,
    config: &GatewayConfig,
    request: &OperationRequest,
) -> EngineResult<OperationOutput> {
    gateway
        .list_pipeline_statuses(config)
        .map(OperationOutput::Pipelines)
        .map_err(|e| EngineError::gateway(request.name(), e))
}

#[derive(Debug)]
pub struct ManualApprovalOperation;

impl UiOperation for ManualApprovalOperation {
    fn id(&self) -> &str {
        "manual-approval"
    }

    fn kind(&self) -> OperationKind {
        OperationKind::ManualApproval
    }

    fn display_name(&self) -> &str {
        "Manual Approval"
    }

    fn description(&self) -> &str {
        "Approve or reject pipeline actions waiting on a person"
    }

    fn execute(
        &self,
        gateway: &dyn PipelineGateway,
        config: &GatewayConfig,
        request: &OperationRequest,
    ) -> EngineResult<OperationOutput> {
        match request {
            OperationRequest::ListApprovals => gateway
                .list_pending_approvals(config)
                .map(OperationOutput::Approvals)
                .map_err(|e| EngineError::gateway(request.name(), e)),
            OperationRequest::Decide(decision) => {
                gateway
                    .submit_approval_decision(
                        config,
                        &decision.action,
                        decision.approved,
                        &decision.comment,
                    )
                    .map_err(|e| EngineError::gateway(request.name(), e))?;
                tracing::info!(
                    action = %decision.action.key(),
                    approved = decision.approved,
                    "approval decision submitted"
                );
                Ok(OperationOutput::DecisionSubmitted {
                    action: decision.action.clone(),
                    approved: decision.approved,
                })
            }
            _ => Err(unsupported(self, request)),
        }
    }
}

#[derive(Debug)]
pub struct PipelineStatusOperation;

impl UiOperation for PipelineStatusOperation {
    fn id(&self) -> &str {
        "pipeline-status"
    }

    fn kind(&self) -> OperationKind {
        OperationKind::PipelineStatus
    }

    fn display_name(&self) -> &str {
        "Pipeline Status"
    }

    fn description(&self) -> &str {
        "Current stage status of every pipeline"
    }

    fn execute(
        &self,
        gateway: &dyn PipelineGateway,
        config: &GatewayConfig,
        request: &OperationRequest,
    ) -> EngineResult<OperationOutput> {
        match request {
            OperationRequest::ListPipelines => list_pipelines(gateway, config, request),
            _ => Err(unsupported(self, request)),
        }
    }
}

#[derive(Debug)]
pub struct StartPipelineOperation;

impl UiOperation for StartPipelineOperation {
    fn id(&self) -> &str {
        "start-pipeline"
    }

    fn kind(&self) -> OperationKind {
        OperationKind::StartPipeline
    }

    fn display_name(&self) -> &str {
        "Start Pipeline"
    }

    fn description(&self) -> &str {
        "Trigger a new execution from the latest source revision"
    }

    fn execute(
        &self,
        gateway: &dyn PipelineGateway,
        config: &GatewayConfig,
        request: &OperationRequest,
    ) -> EngineResult<OperationOutput> {
        match request {
            OperationRequest::ListPipelines => list_pipelines(gateway, config, request),
            OperationRequest::StartExecution(start) => {
                let execution_id = gateway
                    .start_pipeline_execution(
                        config,
                        &start.pipeline_name,
                        start.revision_id.as_deref(),
                    )
                    .map_err(|e| EngineError::gateway(request.name(), e))?;
                tracing::info!(
                    pipeline = %start.pipeline_name,
                    execution_id = %execution_id,
                    "pipeline execution started"
                );
                Ok(OperationOutput::ExecutionStarted {
                    pipeline_name: start.pipeline_name.clone(),
                    execution_id,
                })
            }
            _ => Err(unsupported(self, request)),
        }
    }
}
