use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A long-running Flink session cluster with an optional job submitted into it.
#[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[kube(
    kind = "FlinkSessionCluster",
    group = "flinkoperator.k8s.io",
    version = "v1alpha1",
    namespaced,
    shortname = "fsc"
)]
#[serde(rename_all = "camelCase")]
pub struct FlinkSessionClusterSpec {
    /// Flink image used by every component of the cluster.
    pub image: ImageSpec,
    /// JobManager settings.
    #[serde(default)]
    pub job_manager: JobManagerSpec,
    /// TaskManager settings.
    pub task_manager: TaskManagerSpec,
    /// Job to submit once the cluster is up. Without it the cluster stays idle.
    pub job: Option<JobSpec>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    pub name: String,
    pub pull_policy: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobManagerSpec {
    pub replicas: Option<i32>,
    #[serde(default)]
    pub ports: JobManagerPorts,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobManagerPorts {
    pub rpc: Option<i32>,
    pub blob: Option<i32>,
    pub query: Option<i32>,
    pub ui: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskManagerSpec {
    pub replicas: i32,
    #[serde(default)]
    pub ports: TaskManagerPorts,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskManagerPorts {
    pub data: Option<i32>,
    pub rpc: Option<i32>,
    pub query: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// Path of the job jar inside the image.
    pub jar_file: String,
    pub class_name: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    pub parallelism: Option<i32>,
    /// Pod restart policy of the submitter, `OnFailure` when unset.
    pub restart_policy: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_parses_from_manifest() {
        let data = r#"{
            "image": { "name": "flink:1.8.1" },
            "jobManager": { "ports": { "ui": 8081 } },
            "taskManager": { "replicas": 2 },
            "job": {
                "jarFile": "./examples/streaming/WordCount.jar",
                "className": "org.apache.flink.streaming.examples.wordcount.WordCount",
                "args": ["--input", "./README.txt"],
                "parallelism": 2
            }
        }"#;

        let spec: FlinkSessionClusterSpec = serde_json::from_str(data).unwrap();
        assert_eq!(spec.task_manager.replicas, 2);
        assert_eq!(spec.job_manager.ports.ui, Some(8081));
        assert!(spec.job_manager.replicas.is_none());
        assert_eq!(spec.job.unwrap().args.len(), 2);
    }

    #[test]
    fn job_manager_section_is_optional() {
        let data = r#"{
            "image": { "name": "flink:1.8.1", "pullPolicy": "IfNotPresent" },
            "taskManager": { "replicas": 1 }
        }"#;

        let spec: FlinkSessionClusterSpec = serde_json::from_str(data).unwrap();
        assert!(spec.job.is_none());
        assert_eq!(spec.image.pull_policy.as_deref(), Some("IfNotPresent"));
    }
}
