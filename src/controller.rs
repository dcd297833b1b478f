use crate::api::flink_session_cluster::FlinkSessionCluster;
use crate::config::Config;
use crate::controllers::observer::{observe, KubeClusterReader};
use crate::controllers::platform::{KubePlatformClient, RecordingClient};
use crate::controllers::reconciler::ClusterReconciler;
use crate::controllers::state::DesiredState;
use crate::{telemetry, Error, Metrics, Result};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use k8s_openapi::api::{apps::v1::Deployment, batch::v1::Job, core::v1::Service};
use kube::{
    api::{Api, ListParams, ResourceExt},
    client::Client,
    runtime::controller::{Action, Controller},
    runtime::events::{Recorder, Reporter},
    runtime::watcher::Config as WatcherConfig,
    Resource,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::*;

// Context for the reconciler
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// Diagnostics read by the web server
    pub diagnostics: Arc<RwLock<Diagnostics>>,
    /// Prom metrics
    pub metrics: Metrics,
    /// Controller settings
    pub config: Config,
}

/// One reconcile pass for a cluster key.
///
/// The kube-runtime scheduler never runs two of these for the same object at once,
/// which is what keeps concurrent passes from racing on the same child object.
#[instrument(skip(ctx, cluster), fields(trace_id, name = cluster.name_any(), namespace = cluster.namespace()))]
async fn reconcile(cluster: Arc<FlinkSessionCluster>, ctx: Arc<Context>) -> Result<Action> {
    let trace_id = telemetry::get_trace_id();
    if trace_id != opentelemetry::trace::TraceId::INVALID {
        Span::current().record("trace_id", field::display(&trace_id));
    }
    let _timer = ctx.metrics.count_and_measure();
    ctx.diagnostics.write().await.last_event = Utc::now();

    let observed = observe(&KubeClusterReader::new(ctx.client.clone()), &cluster).await?;
    // Build from the fresh read, not from the possibly stale event payload
    let desired = observed
        .cluster
        .as_ref()
        .map(DesiredState::from)
        .unwrap_or_default();

    let platform = RecordingClient::new(
        KubePlatformClient::new(ctx.client.clone(), ctx.config.field_manager.clone()),
        ctx.diagnostics.read().await.recorder(ctx.client.clone()),
        cluster.object_ref(&()),
    );

    ClusterReconciler::new(&platform)
        .reconcile(observed, desired)
        .await?;

    Ok(Action::requeue(ctx.config.resync_interval()))
}

fn error_policy(cluster: Arc<FlinkSessionCluster>, error: &Error, ctx: Arc<Context>) -> Action {
    warn!("reconcile failed: {:?}", error);
    ctx.metrics.reconcile_failure(&cluster, error);
    Action::requeue(ctx.config.error_requeue_interval())
}

/// Diagnostics to be exposed by the web server
#[derive(Clone, Serialize)]
pub struct Diagnostics {
    pub last_event: DateTime<Utc>,
    #[serde(skip)]
    pub reporter: Reporter,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            last_event: Utc::now(),
            reporter: "flink-session-operator".into(),
        }
    }
}

impl Diagnostics {
    pub fn recorder(&self, client: Client) -> Recorder {
        Recorder::new(client, self.reporter.clone())
    }
}

/// State shared between the controller and the web server
#[derive(Clone, Default)]
pub struct State {
    /// Diagnostics populated by the reconciler
    diagnostics: Arc<RwLock<Diagnostics>>,
    /// Metrics registry
    registry: prometheus::Registry,
}

/// State wrapper around the controller outputs for the web server
impl State {
    /// Metrics getter
    pub fn metrics(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// State getter
    pub async fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.read().await.clone()
    }

    // Create a Controller Context that can update State
    pub fn to_context(&self, client: Client, config: Config) -> Result<Arc<Context>> {
        Ok(Arc::new(Context {
            client,
            metrics: Metrics::default().register(&self.registry)?,
            diagnostics: self.diagnostics.clone(),
            config,
        }))
    }
}

/// Initialize the controller and shared state (given the crd is installed)
pub async fn run(state: State, config: Config) -> Result<()> {
    let client = Client::try_default().await?;
    let clusters = Api::<FlinkSessionCluster>::all(client.clone());
    if let Err(e) = clusters.list(&ListParams::default().limit(1)).await {
        error!("FlinkSessionClusters are not queryable; {e:?}. Is the CRD installed?");
        info!("Installation: cargo run -- --crd | kubectl apply -f -");
        return Err(Error::CrdNotQueryable(e));
    }

    let ctx = state.to_context(client.clone(), config)?;
    Controller::new(clusters, WatcherConfig::default().any_semantic())
        .owns(Api::<Deployment>::all(client.clone()), WatcherConfig::default())
        .owns(Api::<Service>::all(client.clone()), WatcherConfig::default())
        .owns(Api::<Job>::all(client), WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!(name = %obj.name, "reconciled"),
                Err(e) => debug!("reconcile loop error: {e}"),
            }
        })
        .await;

    Ok(())
}
