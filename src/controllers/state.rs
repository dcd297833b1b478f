use std::fmt::{self, Display};

use k8s_openapi::api::{apps::v1::Deployment, batch::v1::Job, core::v1::Service};
use kube::ResourceExt;

use crate::api::flink_session_cluster::FlinkSessionCluster;

/// Sub-resource kinds managed for every session cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    JobManagerDeployment,
    JobManagerService,
    TaskManagerDeployment,
    Job,
}

impl ResourceKind {
    /// Order in which kinds are converged within a pass. The JobManager must exist
    /// before its service, TaskManagers register against it and the job is
    /// submitted last.
    pub const RECONCILE_ORDER: [ResourceKind; 4] = [
        ResourceKind::JobManagerDeployment,
        ResourceKind::JobManagerService,
        ResourceKind::TaskManagerDeployment,
        ResourceKind::Job,
    ];

    /// Value of the `component` label and log field.
    pub fn component(&self) -> &'static str {
        match self {
            ResourceKind::JobManagerDeployment | ResourceKind::JobManagerService => "jobmanager",
            ResourceKind::TaskManagerDeployment => "taskmanager",
            ResourceKind::Job => "job",
        }
    }

    /// Name of the child object of this kind for the given cluster.
    pub fn object_name(&self, cluster: &str) -> String {
        format!("{cluster}-{}", self.component())
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::JobManagerDeployment => "JobManager deployment",
            ResourceKind::JobManagerService => "JobManager service",
            ResourceKind::TaskManagerDeployment => "TaskManager deployment",
            ResourceKind::Job => "Job",
        })
    }
}

/// A child object of one of the managed kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentResource {
    Deployment(Deployment),
    Service(Service),
    Job(Job),
}

impl ComponentResource {
    pub fn name(&self) -> String {
        match self {
            ComponentResource::Deployment(d) => d.name_any(),
            ComponentResource::Service(s) => s.name_any(),
            ComponentResource::Job(j) => j.name_any(),
        }
    }
}

/// One optional slot per managed kind. Shared by desired and observed state so
/// that both are aligned by construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Components {
    pub jm_deployment: Option<Deployment>,
    pub jm_service: Option<Service>,
    pub tm_deployment: Option<Deployment>,
    pub job: Option<Job>,
}

impl Components {
    /// Moves the slot for `kind` out, leaving it empty.
    pub fn take(&mut self, kind: ResourceKind) -> Option<ComponentResource> {
        match kind {
            ResourceKind::JobManagerDeployment => {
                self.jm_deployment.take().map(ComponentResource::Deployment)
            }
            ResourceKind::JobManagerService => self.jm_service.take().map(ComponentResource::Service),
            ResourceKind::TaskManagerDeployment => {
                self.tm_deployment.take().map(ComponentResource::Deployment)
            }
            ResourceKind::Job => self.job.take().map(ComponentResource::Job),
        }
    }
}

/// Target configuration of a cluster, built fresh for every pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesiredState {
    pub components: Components,
}

/// Live configuration of a cluster as read at the start of a pass.
#[derive(Clone, Debug, Default)]
pub struct ObservedState {
    /// Absent when the cluster itself has been deleted.
    pub cluster: Option<FlinkSessionCluster>,
    pub components: Components,
}
