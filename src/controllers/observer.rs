use async_trait::async_trait;
use k8s_openapi::api::{apps::v1::Deployment, batch::v1::Job, core::v1::Service};
use kube::{api::Api, client::Client, Resource, ResourceExt};
use tracing::{debug, instrument};

#[cfg(test)]
use mockall::automock;

use crate::api::flink_session_cluster::FlinkSessionCluster;

use super::state::{Components, ObservedState, ResourceKind};

/// Point reads of a cluster and its children. Not found is `Ok(None)`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterReader: Send + Sync {
    async fn cluster(&self, namespace: &str, name: &str)
        -> Result<Option<FlinkSessionCluster>, kube::Error>;

    async fn deployment(&self, namespace: &str, name: &str)
        -> Result<Option<Deployment>, kube::Error>;

    async fn service(&self, namespace: &str, name: &str) -> Result<Option<Service>, kube::Error>;

    async fn job(&self, namespace: &str, name: &str) -> Result<Option<Job>, kube::Error>;
}

/// [`ClusterReader`] backed by the Kubernetes API.
pub struct KubeClusterReader {
    client: Client,
}

impl KubeClusterReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterReader for KubeClusterReader {
    async fn cluster(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<FlinkSessionCluster>, kube::Error> {
        Api::<FlinkSessionCluster>::namespaced(self.client.clone(), namespace).get_opt(name).await
    }

    async fn deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, kube::Error> {
        Api::<Deployment>::namespaced(self.client.clone(), namespace).get_opt(name).await
    }

    async fn service(&self, namespace: &str, name: &str) -> Result<Option<Service>, kube::Error> {
        Api::<Service>::namespaced(self.client.clone(), namespace).get_opt(name).await
    }

    async fn job(&self, namespace: &str, name: &str) -> Result<Option<Job>, kube::Error> {
        Api::<Job>::namespaced(self.client.clone(), namespace).get_opt(name).await
    }
}

/// Drops a cluster that is being deleted: its children are reclaimed through
/// owner references, so it has nothing left to converge.
fn live(cluster: Option<FlinkSessionCluster>) -> Option<FlinkSessionCluster> {
    cluster.filter(|c| c.meta().deletion_timestamp.is_none())
}

/// Reads the live state of a cluster and its children.
///
/// A cluster that is gone or being deleted is reported as absent, and its
/// children are not read.
#[instrument(skip_all, fields(name = cluster.name_any(), namespace = cluster.namespace()))]
pub async fn observe(
    reader: &dyn ClusterReader,
    cluster: &FlinkSessionCluster,
) -> Result<ObservedState, kube::Error> {
    let name = cluster.name_any();
    let ns = cluster.namespace().unwrap_or_default();

    let Some(cluster) = live(reader.cluster(&ns, &name).await?) else {
        debug!("Cluster not found or being deleted");
        return Ok(ObservedState::default());
    };

    let components = Components {
        jm_deployment: reader
            .deployment(&ns, &ResourceKind::JobManagerDeployment.object_name(&name))
            .await?,
        jm_service: reader
            .service(&ns, &ResourceKind::JobManagerService.object_name(&name))
            .await?,
        tm_deployment: reader
            .deployment(&ns, &ResourceKind::TaskManagerDeployment.object_name(&name))
            .await?,
        job: reader
            .job(&ns, &ResourceKind::Job.object_name(&name))
            .await?,
    };

    debug!(
        jobmanager_deployment = components.jm_deployment.is_some(),
        jobmanager_service = components.jm_service.is_some(),
        taskmanager_deployment = components.tm_deployment.is_some(),
        job = components.job.is_some(),
        "Observed cluster state"
    );

    Ok(ObservedState {
        cluster: Some(cluster),
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::flink_session_cluster::FlinkSessionClusterSpec;
    use kube::api::ObjectMeta;
    use kube::core::ErrorResponse;

    fn cluster() -> FlinkSessionCluster {
        let mut cluster = FlinkSessionCluster::new("wordcount", FlinkSessionClusterSpec::default());
        cluster.metadata.namespace = Some("flink".to_string());
        cluster
    }

    fn deleting() -> FlinkSessionCluster {
        let mut cluster = cluster();
        cluster.metadata = serde_json::from_value(serde_json::json!({
            "name": "wordcount",
            "namespace": "flink",
            "deletionTimestamp": "2026-10-19T00:00:00Z",
        }))
        .unwrap();
        cluster
    }

    fn deployment(name: &str) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("flink".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn forbidden() -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".into(),
            message: "services is forbidden".into(),
            reason: "Forbidden".into(),
            code: 403,
        })
    }

    #[test]
    fn live_keeps_existing_cluster() {
        assert!(live(Some(cluster())).is_some());
    }

    #[test]
    fn live_drops_cluster_being_deleted() {
        assert!(live(Some(deleting())).is_none());
    }

    #[test]
    fn live_keeps_missing_cluster_missing() {
        assert!(live(None).is_none());
    }

    #[tokio::test]
    async fn deleting_cluster_skips_children() {
        // Only the cluster read is expected: child reads panic
        let mut reader = MockClusterReader::new();
        reader
            .expect_cluster()
            .times(1)
            .returning(|_, _| Ok(Some(deleting())));

        let observed = observe(&reader, &cluster()).await.unwrap();
        assert!(observed.cluster.is_none());
        assert_eq!(observed.components, Components::default());
    }

    #[tokio::test]
    async fn missing_cluster_skips_children() {
        let mut reader = MockClusterReader::new();
        reader.expect_cluster().times(1).returning(|_, _| Ok(None));

        let observed = observe(&reader, &cluster()).await.unwrap();
        assert!(observed.cluster.is_none());
    }

    #[tokio::test]
    async fn missing_children_are_absent() {
        let mut reader = MockClusterReader::new();
        reader
            .expect_cluster()
            .withf(|ns, name| ns == "flink" && name == "wordcount")
            .returning(|_, _| Ok(Some(cluster())));
        reader.expect_deployment().returning(|_, name| match name {
            "wordcount-jobmanager" => Ok(Some(deployment(name))),
            _ => Ok(None),
        });
        reader.expect_service().returning(|_, _| Ok(None));
        reader.expect_job().returning(|_, _| Ok(None));

        let observed = observe(&reader, &cluster()).await.unwrap();
        assert!(observed.cluster.is_some());
        assert_eq!(
            observed.components,
            Components {
                jm_deployment: Some(deployment("wordcount-jobmanager")),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn read_errors_are_returned() {
        let mut reader = MockClusterReader::new();
        reader
            .expect_cluster()
            .returning(|_, _| Ok(Some(cluster())));
        reader.expect_deployment().returning(|_, _| Ok(None));
        reader.expect_service().returning(|_, _| Err(forbidden()));
        reader.expect_job().never();

        let err = observe(&reader, &cluster()).await.unwrap_err();
        assert!(matches!(
            err,
            kube::Error::Api(ErrorResponse { code: 403, .. })
        ));
    }
}
