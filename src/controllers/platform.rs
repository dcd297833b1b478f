use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, PostParams};
use kube::client::Client;
use kube::runtime::events::{Event, EventType, Recorder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

#[cfg(test)]
use mockall::automock;

use super::state::ComponentResource;

/// Write operations the reconciler performs against the platform.
///
/// Timeouts and cancellation belong to the implementation; callers only see the
/// outcome.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn create(&self, namespace: &str, resource: &ComponentResource)
        -> Result<(), kube::Error>;

    async fn update(&self, namespace: &str, resource: &ComponentResource)
        -> Result<(), kube::Error>;
}

/// Sink for Kubernetes Events about the owning cluster.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &Event, reference: &ObjectReference) -> Result<(), kube::Error>;
}

#[async_trait]
impl EventPublisher for Recorder {
    async fn publish(&self, event: &Event, reference: &ObjectReference) -> Result<(), kube::Error> {
        Recorder::publish(self, event, reference).await
    }
}

/// [`PlatformClient`] backed by the Kubernetes API.
pub struct KubePlatformClient {
    client: Client,
    field_manager: String,
}

impl KubePlatformClient {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        }
    }

    async fn create_in<R>(&self, namespace: &str, res: &R) -> Result<(), kube::Error>
    where
        R: Clone + Serialize + DeserializeOwned + Debug,
        R: kube::Resource<DynamicType = (), Scope = NamespaceResourceScope>,
    {
        let api: Api<R> = Api::namespaced(self.client.clone(), namespace);
        api.create(&self.post_params(), res).await?;
        Ok(())
    }

    async fn replace_in<R>(&self, namespace: &str, res: &R) -> Result<(), kube::Error>
    where
        R: Clone + Serialize + DeserializeOwned + Debug,
        R: kube::Resource<DynamicType = (), Scope = NamespaceResourceScope>,
        R: kube::ResourceExt,
    {
        let api: Api<R> = Api::namespaced(self.client.clone(), namespace);
        api.replace(&res.name_any(), &self.post_params(), res).await?;
        Ok(())
    }
}

#[async_trait]
impl PlatformClient for KubePlatformClient {
    async fn create(
        &self,
        namespace: &str,
        resource: &ComponentResource,
    ) -> Result<(), kube::Error> {
        match resource {
            ComponentResource::Deployment(d) => self.create_in(namespace, d).await,
            ComponentResource::Service(s) => self.create_in(namespace, s).await,
            ComponentResource::Job(j) => self.create_in(namespace, j).await,
        }
    }

    async fn update(
        &self,
        namespace: &str,
        resource: &ComponentResource,
    ) -> Result<(), kube::Error> {
        match resource {
            ComponentResource::Deployment(d) => self.replace_in(namespace, d).await,
            ComponentResource::Service(s) => self.replace_in(namespace, s).await,
            ComponentResource::Job(j) => self.replace_in(namespace, j).await,
        }
    }
}

/// Wraps a [`PlatformClient`] and publishes an Event on the owning cluster after
/// every successful write. Publishing never changes the outcome of the write.
pub struct RecordingClient<C, E> {
    inner: C,
    events: E,
    owner: ObjectReference,
}

impl<C, E> RecordingClient<C, E>
where
    C: PlatformClient,
    E: EventPublisher,
{
    pub fn new(inner: C, events: E, owner: ObjectReference) -> Self {
        Self {
            inner,
            events,
            owner,
        }
    }

    async fn record(&self, reason: &str, action: &str, resource: &ComponentResource) {
        let event = Event {
            type_: EventType::Normal,
            reason: reason.into(),
            note: Some(format!(
                "{reason} `{}` in `{}`",
                resource.name(),
                self.owner.namespace.clone().unwrap_or_default()
            )),
            action: action.into(),
            secondary: None,
        };

        if let Err(e) = self.events.publish(&event, &self.owner).await {
            warn!(error = %e, name = %resource.name(), "Failed to publish event");
        }
    }
}

#[async_trait]
impl<C, E> PlatformClient for RecordingClient<C, E>
where
    C: PlatformClient,
    E: EventPublisher,
{
    async fn create(
        &self,
        namespace: &str,
        resource: &ComponentResource,
    ) -> Result<(), kube::Error> {
        self.inner.create(namespace, resource).await?;
        self.record("Created", "Creating", resource).await;
        Ok(())
    }

    async fn update(
        &self,
        namespace: &str,
        resource: &ComponentResource,
    ) -> Result<(), kube::Error> {
        self.inner.update(namespace, resource).await?;
        self.record("Updated", "Updating", resource).await;
        Ok(())
    }
}
