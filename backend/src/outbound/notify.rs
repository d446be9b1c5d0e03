//! Notifier that writes each committed outcome as a structured log event.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{WorkspaceNotifier, WorkspaceNotifierError, WorkspaceOutcome};

/// Emits one `tracing` event per outcome, with the full payload as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWorkspaceNotifier;

#[async_trait]
impl WorkspaceNotifier for TracingWorkspaceNotifier {
    async fn notify(&self, outcome: &WorkspaceOutcome) -> Result<(), WorkspaceNotifierError> {
        let payload = serde_json::to_string(outcome)
            .map_err(|err| WorkspaceNotifierError::publish(err.to_string()))?;
        info!(
            target: "notebooks::workspace",
            notebook_id = %outcome.notebook_id,
            event = outcome.event.name(),
            %payload,
            "workspace outcome"
        );
        Ok(())
    }
}
