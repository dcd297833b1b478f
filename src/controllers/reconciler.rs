//! Drives the observed state of one session cluster towards its desired state.
//!
//! A pass is strictly sequential and holds no state between calls. Two passes for
//! the same cluster must never overlap: the caller serializes them per object key
//! (the kube-runtime scheduler does), otherwise both could race to create the same
//! child object.

use kube::ResourceExt;
use tracing::{debug, info};

use super::convergence::decide;
use super::executor::ActionExecutor;
use super::platform::PlatformClient;
use super::state::{DesiredState, ObservedState, ResourceKind};
use super::ReconcileResult;

pub struct ClusterReconciler<'a> {
    client: &'a dyn PlatformClient,
}

impl<'a> ClusterReconciler<'a> {
    pub fn new(client: &'a dyn PlatformClient) -> Self {
        Self { client }
    }

    /// Compares the desired and the observed state and, where they differ, acts to
    /// bring the observed state closer. Stops at the first failing kind; already
    /// created objects stay in place and are no-ops on the next pass.
    pub async fn reconcile(
        &self,
        observed: ObservedState,
        desired: DesiredState,
    ) -> ReconcileResult<()> {
        // Children of the cluster are reclaimed through their owner references
        let Some(cluster) = observed.cluster else {
            info!("The cluster has been deleted, no action to take");
            return Ok(());
        };

        let namespace = cluster.namespace().unwrap_or_default();
        let executor = ActionExecutor::new(self.client, &namespace);

        let mut observed = observed.components;
        let mut desired = desired.components;
        for kind in ResourceKind::RECONCILE_ORDER {
            let action = decide(desired.take(kind), observed.take(kind));
            debug!(component = %kind, ?action, "Decided");
            executor.execute(action, kind).await?;
        }

        Ok(())
    }
}
