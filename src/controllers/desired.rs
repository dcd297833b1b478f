use std::collections::BTreeMap;

use k8s_openapi::api::{
    apps::v1::{Deployment, DeploymentSpec},
    batch::v1::{Job, JobSpec},
    core::v1::{
        Container, ContainerPort, EnvVar, PodSpec, PodTemplateSpec, Service, ServicePort,
        ServiceSpec,
    },
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::{Resource, ResourceExt};

use crate::api::flink_session_cluster::FlinkSessionCluster;

use super::state::{Components, DesiredState, ResourceKind};

pub const DEFAULT_JM_RPC_PORT: i32 = 6123;
pub const DEFAULT_JM_BLOB_PORT: i32 = 6124;
pub const DEFAULT_QUERY_PORT: i32 = 6125;
pub const DEFAULT_JM_UI_PORT: i32 = 8081;
pub const DEFAULT_TM_DATA_PORT: i32 = 6121;
pub const DEFAULT_TM_RPC_PORT: i32 = 6122;

const FLINK_BIN: &str = "/opt/flink/bin/flink";

impl From<&FlinkSessionCluster> for DesiredState {
    fn from(cluster: &FlinkSessionCluster) -> Self {
        Self {
            components: Components {
                jm_deployment: Some(jobmanager_deployment(cluster)),
                jm_service: Some(jobmanager_service(cluster)),
                tm_deployment: Some(taskmanager_deployment(cluster)),
                job: job(cluster),
            },
        }
    }
}

fn labels(cluster: &FlinkSessionCluster, kind: ResourceKind) -> BTreeMap<String, String> {
    [
        ("app".to_string(), "flink".to_string()),
        ("cluster".to_string(), cluster.name_any()),
        ("component".to_string(), kind.component().to_string()),
    ]
    .into()
}

fn object_meta(cluster: &FlinkSessionCluster, kind: ResourceKind) -> ObjectMeta {
    ObjectMeta {
        name: Some(kind.object_name(&cluster.name_any())),
        namespace: cluster.namespace(),
        labels: Some(labels(cluster, kind)),
        owner_references: cluster.controller_owner_ref(&()).map(|r| vec![r]),
        ..Default::default()
    }
}

fn port(name: &str, port: i32) -> ContainerPort {
    ContainerPort {
        name: Some(name.to_string()),
        container_port: port,
        ..Default::default()
    }
}

fn jobmanager_address(cluster: &FlinkSessionCluster) -> EnvVar {
    EnvVar {
        name: "JOB_MANAGER_RPC_ADDRESS".to_string(),
        value: Some(ResourceKind::JobManagerService.object_name(&cluster.name_any())),
        ..Default::default()
    }
}

fn jobmanager_ports(cluster: &FlinkSessionCluster) -> Vec<ContainerPort> {
    let ports = &cluster.spec.job_manager.ports;
    vec![
        port("rpc", ports.rpc.unwrap_or(DEFAULT_JM_RPC_PORT)),
        port("blob", ports.blob.unwrap_or(DEFAULT_JM_BLOB_PORT)),
        port("query", ports.query.unwrap_or(DEFAULT_QUERY_PORT)),
        port("ui", ports.ui.unwrap_or(DEFAULT_JM_UI_PORT)),
    ]
}

/// Deployment running a single Flink container with the given role argument.
fn flink_deployment(
    cluster: &FlinkSessionCluster,
    kind: ResourceKind,
    replicas: i32,
    ports: Vec<ContainerPort>,
) -> Deployment {
    let labels = labels(cluster, kind);
    Deployment {
        metadata: object_meta(cluster, kind),
        spec: Some(DeploymentSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: kind.component().to_string(),
                        image: Some(cluster.spec.image.name.clone()),
                        image_pull_policy: cluster.spec.image.pull_policy.clone(),
                        args: Some(vec![kind.component().to_string()]),
                        ports: Some(ports),
                        env: Some(vec![jobmanager_address(cluster)]),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn jobmanager_deployment(cluster: &FlinkSessionCluster) -> Deployment {
    flink_deployment(
        cluster,
        ResourceKind::JobManagerDeployment,
        cluster.spec.job_manager.replicas.unwrap_or(1),
        jobmanager_ports(cluster),
    )
}

pub fn taskmanager_deployment(cluster: &FlinkSessionCluster) -> Deployment {
    let ports = &cluster.spec.task_manager.ports;
    flink_deployment(
        cluster,
        ResourceKind::TaskManagerDeployment,
        cluster.spec.task_manager.replicas,
        vec![
            port("data", ports.data.unwrap_or(DEFAULT_TM_DATA_PORT)),
            port("rpc", ports.rpc.unwrap_or(DEFAULT_TM_RPC_PORT)),
            port("query", ports.query.unwrap_or(DEFAULT_QUERY_PORT)),
        ],
    )
}

pub fn jobmanager_service(cluster: &FlinkSessionCluster) -> Service {
    let ports = jobmanager_ports(cluster)
        .into_iter()
        .map(|p| ServicePort {
            name: p.name,
            port: p.container_port,
            target_port: Some(IntOrString::Int(p.container_port)),
            ..Default::default()
        })
        .collect();

    Service {
        metadata: object_meta(cluster, ResourceKind::JobManagerService),
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(labels(cluster, ResourceKind::JobManagerDeployment)),
            ports: Some(ports),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Submitter job, only when the spec declares one.
pub fn job(cluster: &FlinkSessionCluster) -> Option<Job> {
    let spec = cluster.spec.job.as_ref()?;
    let ui_port = cluster.spec.job_manager.ports.ui.unwrap_or(DEFAULT_JM_UI_PORT);
    let jobmanager = ResourceKind::JobManagerService.object_name(&cluster.name_any());

    let mut args = vec!["run".to_string(), "-m".to_string(), format!("{jobmanager}:{ui_port}")];
    if let Some(class_name) = &spec.class_name {
        args.extend(["-c".to_string(), class_name.clone()]);
    }
    if let Some(parallelism) = spec.parallelism {
        args.extend(["-p".to_string(), parallelism.to_string()]);
    }
    args.push(spec.jar_file.clone());
    args.extend(spec.args.iter().cloned());

    let kind = ResourceKind::Job;
    Some(Job {
        metadata: object_meta(cluster, kind),
        spec: Some(JobSpec {
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels(cluster, kind)),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    restart_policy: Some(
                        spec.restart_policy
                            .clone()
                            .unwrap_or_else(|| "OnFailure".to_string()),
                    ),
                    containers: vec![Container {
                        name: "main".to_string(),
                        image: Some(cluster.spec.image.name.clone()),
                        image_pull_policy: cluster.spec.image.pull_policy.clone(),
                        command: Some(vec![FLINK_BIN.to_string()]),
                        args: Some(args),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}
