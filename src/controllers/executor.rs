use tracing::{error, info};

use super::convergence::ReconcileAction;
use super::platform::PlatformClient;
use super::state::{ComponentResource, ResourceKind};
use super::{ReconcileError, ReconcileResult};

/// Applies reconcile actions for one cluster, scoped to its namespace.
pub struct ActionExecutor<'a> {
    client: &'a dyn PlatformClient,
    namespace: &'a str,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(client: &'a dyn PlatformClient, namespace: &'a str) -> Self {
        Self { client, namespace }
    }

    /// Issues at most one platform call. Failures are returned without retrying.
    pub async fn execute(
        &self,
        action: ReconcileAction<ComponentResource>,
        kind: ResourceKind,
    ) -> ReconcileResult<()> {
        match action {
            ReconcileAction::NoAction => {
                info!(component = %kind, "{kind} needs no action");
                Ok(())
            }
            ReconcileAction::Unmanaged => {
                info!(component = %kind, "{kind} is no longer declared, leaving it to garbage collection");
                Ok(())
            }
            ReconcileAction::Create(resource) => {
                let name = resource.name();
                info!(component = %kind, name = %name, "Creating {kind}");
                match self.client.create(self.namespace, &resource).await {
                    Ok(()) => {
                        info!(component = %kind, name = %name, "{kind} created");
                        Ok(())
                    }
                    Err(cause) => {
                        error!(component = %kind, name = %name, error = %cause, "Failed to create {kind}");
                        Err(ReconcileError::CreateFailed { kind, cause })
                    }
                }
            }
            ReconcileAction::Update(resource) => {
                let name = resource.name();
                info!(component = %kind, name = %name, "Updating {kind}");
                match self.client.update(self.namespace, &resource).await {
                    Ok(()) => {
                        info!(component = %kind, name = %name, "{kind} updated");
                        Ok(())
                    }
                    Err(cause) => {
                        error!(component = %kind, name = %name, error = %cause, "Failed to update {kind}");
                        Err(ReconcileError::UpdateFailed { kind, cause })
                    }
                }
            }
        }
    }
}
