use crate::gateway::PipelineGateway;
use crate::interactive::ui::commands::Dispatch;
use crate::interactive::ui::events::Message;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

/// Runs gateway calls off the interaction loop, one thread per command.
///
/// Each thread posts exactly one `Message::Completed` back to the loop's
/// queue. Calls are never retried or timed out here.
pub struct CommandDispatcher {
    gateway: Arc<dyn PipelineGateway>,
    sender: Sender<Message>,
}

impl CommandDispatcher {
    pub fn new(gateway: Arc<dyn PipelineGateway>, sender: Sender<Message>) -> Self {
        Self { gateway, sender }
    }

    /// Errors only when the worker thread cannot be spawned.
    pub fn dispatch(&self, dispatch: Dispatch) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        let sender = self.sender.clone();
        let name = format!("dispatch-{}", dispatch.operation.id());

        thread::Builder::new()
            .name(name)
            .spawn(move || {
                let Dispatch {
                    operation,
                    config,
                    request,
                } = dispatch;
                tracing::debug!(
                    operation = operation.id(),
                    request = request.name(),
                    profile = %config.profile,
                    region = %config.region,
                    "running command"
                );
                let result = operation.execute(gateway.as_ref(), &config, &request);
                if sender.send(Message::Completed(result)).is_err() {
                    tracing::debug!("interaction loop is gone, dropping completion");
                }
            })
            .context("Failed to spawn dispatch thread")?;
        Ok(())
    }
}
