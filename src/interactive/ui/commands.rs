use crate::catalog::{OperationRequest, UiOperation};
use crate::config::GatewayConfig;
use std::sync::Arc;

/// Side effect requested by one `AppState::update`.
#[derive(Debug)]
pub enum Command {
    None,
    Quit,
    Execute(Dispatch),
}

/// A gateway call ready to run off the interaction loop.
#[derive(Debug)]
pub struct Dispatch {
    pub operation: Arc<dyn UiOperation>,
    pub config: GatewayConfig,
    pub request: OperationRequest,
}
