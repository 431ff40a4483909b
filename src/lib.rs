pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod interactive;
pub mod logging;
pub mod output;

#[cfg(test)]
mod test_support;

pub use catalog::{Catalog, OperationKind, OperationOutput, OperationRequest, UiOperation};
pub use config::{GatewayConfig, available_regions, list_available_profiles};
pub use error::{EngineError, EngineResult};
pub use gateway::{
    ApprovalAction, AwsCliGateway, PipelineGateway, PipelineSnapshot, StageStatus,
    resolve_pending_approvals,
};
pub use interactive::InteractiveSession;
pub use output::{OutputFormat, format_approval, format_pipeline};
