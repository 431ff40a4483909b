use thiserror::Error;

/// Failures surfaced to the operator by the workflow engine.
///
/// Every variant is advisory: the navigator renders it, waits for an
/// acknowledgment and keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Missing or malformed profile/region, detected before any remote call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Any failure reported by the remote operation gateway.
    #[error("{operation} failed: {message}")]
    Gateway {
        operation: &'static str,
        message: String,
    },

    /// An invariant the navigator itself should have upheld.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn gateway(operation: &'static str, err: anyhow::Error) -> Self {
        EngineError::Gateway {
            operation,
            message: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_gateway_error_keeps_full_context_chain() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("token expired"))
            .context("put-approval-result returned an error");
        let engine = EngineError::gateway("submit approval decision", err.unwrap_err());

        assert_eq!(
            engine.to_string(),
            "submit approval decision failed: put-approval-result returned an error: token expired"
        );
    }

    #[test]
    fn test_configuration_display() {
        let err = EngineError::Configuration("no region selected".to_string());
        assert_eq!(err.to_string(), "configuration error: no region selected");
    }
}
