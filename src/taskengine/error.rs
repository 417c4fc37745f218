use super::types::{WorkerId, MAX_INSTANCES};

/// Reasons an engine refuses to start.
///
/// Construction is all-or-nothing: on error no task has been spawned.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("duplicate worker: WorkerID={0:?}")]
    DuplicateWorker(String),

    #[error("instances must be in 1..{max} range: WorkerID={worker:?}", max = MAX_INSTANCES)]
    InstancesOutOfRange { worker: String, instances: usize },

    #[error("work function cannot be nil: WorkerID={0:?}")]
    MissingWork(String),

    #[error("tasks for undefined worker: WorkerID={0:?}")]
    UndefinedWorker(String),
}

impl EngineError {
    pub(crate) fn duplicate(id: &WorkerId) -> Self {
        Self::DuplicateWorker(id.0.clone())
    }

    pub(crate) fn undefined(id: &WorkerId) -> Self {
        Self::UndefinedWorker(id.0.clone())
    }
}
