use thiserror::Error;

use state::ResourceKind;

pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;

/// Failure of a single pass. The pass stops at the first one.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("{kind} create error: {cause}")]
    CreateFailed {
        kind: ResourceKind,
        #[source]
        cause: kube::Error,
    },

    #[error("{kind} update error: {cause}")]
    UpdateFailed {
        kind: ResourceKind,
        #[source]
        cause: kube::Error,
    },
}

impl ReconcileError {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ReconcileError::CreateFailed { kind, .. } | ReconcileError::UpdateFailed { kind, .. } => {
                *kind
            }
        }
    }
}

pub mod convergence;
pub mod desired;
pub mod executor;
pub mod observer;
pub mod platform;
pub mod reconciler;
pub mod state;
