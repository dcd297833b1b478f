use controllers::ReconcileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kube Error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("CRD is not queryable: {0}")]
    CrdNotQueryable(#[source] kube::Error),

    #[error("Reconcile error: {0}")]
    ReconcileError(#[from] ReconcileError),

    #[error("Metrics registration error: {0}")]
    MetricsError(#[from] prometheus::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn metric_label(&self) -> String {
        match self {
            Error::ReconcileError(ReconcileError::CreateFailed { kind, .. }) => {
                format!("create_failed_{}", kind.component())
            }
            Error::ReconcileError(ReconcileError::UpdateFailed { kind, .. }) => {
                format!("update_failed_{}", kind.component())
            }
            Error::KubeError(_) => "kube_error".to_string(),
            Error::CrdNotQueryable(_) => "crd_not_queryable".to_string(),
            Error::MetricsError(_) => "metrics_error".to_string(),
        }
    }
}

/// Expose all controller components used by main
pub mod controller;
pub use crate::controller::*;
pub mod api;
pub mod config;
pub mod controllers;

/// Log and trace integrations
pub mod telemetry;

/// Metrics
mod metrics;
pub use metrics::Metrics;
