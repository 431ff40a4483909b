//! Static catalog of providers, services, categories and operations.
//!
//! Built once at startup and shared read-only with the navigator and the
//! dispatcher threads.

pub mod operations;


use crate::config::GatewayConfig;
use crate::error::EngineResult;
use crate::gateway::PipelineGateway;
use std::fmt;
use std::sync::Arc;

pub use operations::{
    ApproveRequest, ManualApprovalOperation, OperationOutput, OperationRequest,
    PipelineStatusOperation, StartExecutionRequest, StartPipelineOperation,
};

/// Descriptive metadata shared by every catalog level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub available: bool,
}

impl CatalogEntry {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            available: true,
        }
    }

    pub fn unavailable(id: &str, name: &str, description: &str) -> Self {
        Self {
            available: false,
            ..Self::new(id, name, description)
        }
    }
}

/// Which navigation flow an operation drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    ManualApproval,
    PipelineStatus,
    StartPipeline,
}

/// An operation the navigator can show and run.
pub trait UiOperation: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;
    fn kind(&self) -> OperationKind;
    fn display_name(&self) -> &str;
    fn description(&self) -> &str;

    fn is_visible(&self) -> bool {
        true
    }

    fn execute(
        &self,
        gateway: &dyn PipelineGateway,
        config: &GatewayConfig,
        request: &OperationRequest,
    ) -> EngineResult<OperationOutput>;
}

pub struct Category {
    pub entry: CatalogEntry,
    pub operations: Vec<Arc<dyn UiOperation>>,
}

impl Category {
    pub fn visible_operations(&self) -> impl Iterator<Item = &Arc<dyn UiOperation>> {
        self.operations.iter().filter(|op| op.is_visible())
    }

    pub fn operation(&self, id: &str) -> Option<&Arc<dyn UiOperation>> {
        self.operations.iter().find(|op| op.id() == id)
    }
}

pub struct Service {
    pub entry: CatalogEntry,
    pub categories: Vec<Category>,
}

impl Service {
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.entry.id == id)
    }
}

pub struct Provider {
    pub entry: CatalogEntry,
    pub services: Vec<Service>,
}

impl Provider {
    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.entry.id == id)
    }
}

pub struct Catalog {
    providers: Vec<Provider>,
}

impl Catalog {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// The catalog shipped with the binary: AWS CodePipeline is wired up,
    /// the other providers are listed as unavailable.
    pub fn builtin() -> Self {
        let codepipeline = Service {
            entry: CatalogEntry::new(
                "codepipeline",
                "CodePipeline",
                "Continuous delivery pipelines",
            ),
            categories: vec![
                Category {
                    entry: CatalogEntry::new(
                        "approvals",
                        "Approvals",
                        "Manual approval gates awaiting a decision",
                    ),
                    operations: vec![Arc::new(ManualApprovalOperation)],
                },
                Category {
                    entry: CatalogEntry::new(
                        "executions",
                        "Executions",
                        "Inspect and trigger pipeline runs",
                    ),
                    operations: vec![
                        Arc::new(PipelineStatusOperation),
                        Arc::new(StartPipelineOperation),
                    ],
                },
            ],
        };

        Self::new(vec![
            Provider {
                entry: CatalogEntry::new("aws", "AWS", "Amazon Web Services"),
                services: vec![
                    codepipeline,
                    Service {
                        entry: CatalogEntry::unavailable(
                            "codebuild",
                            "CodeBuild",
                            "Build projects (not available yet)",
                        ),
                        categories: Vec::new(),
                    },
                ],
            },
            Provider {
                entry: CatalogEntry::unavailable(
                    "azure",
                    "Azure",
                    "Azure DevOps pipelines (not available yet)",
                ),
                services: Vec::new(),
            },
            Provider {
                entry: CatalogEntry::unavailable(
                    "gcp",
                    "Google Cloud",
                    "Cloud Deploy (not available yet)",
                ),
                services: Vec::new(),
            },
        ])
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.entry.id == id)
    }

    pub fn service(&self, provider: &str, service: &str) -> Option<&Service> {
        self.provider(provider)?.service(service)
    }

    pub fn category(&self, provider: &str, service: &str, category: &str) -> Option<&Category> {
        self.service(provider, service)?.category(category)
    }

    pub fn operation(
        &self,
        provider: &str,
        service: &str,
        category: &str,
        operation: &str,
    ) -> Option<Arc<dyn UiOperation>> {
        self.category(provider, service, category)?
            .operation(operation)
            .cloned()
    }
}
