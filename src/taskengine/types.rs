use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Upper bound for the number of concurrent instances of a single worker.
pub const MAX_INSTANCES: usize = 100;

/// Identifier shared by every assignment of the same logical task.
///
/// Two task objects given to different workers are the same task
/// if and only if their `TaskId`s are equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub String);

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a worker pool (e.g. a source name).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub String);

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unit of work. The engine only ever reads its `TaskId`.
pub trait Task: Send + Sync + 'static {
    fn task_id(&self) -> TaskId;
}

/// Outcome of a single `Work` invocation.
pub trait TaskResult: Send + 'static {
    fn success(&self) -> bool;
}

/// Type-erased async work function of a worker.
///
/// Receives the task's cancellation token, the index of the instance running
/// it and the task itself. Implementations are expected to return promptly
/// with a failure result once the token is cancelled.
pub type WorkFn<T, R> =
    Arc<dyn Fn(CancellationToken, usize, Arc<T>) -> Pin<Box<dyn Future<Output = R> + Send>> + Send + Sync>;

/// A pool of `instances` concurrent executors sharing the same work function.
pub struct Worker<T, R> {
    pub worker_id: WorkerId,
    pub instances: usize,
    pub work: Option<WorkFn<T, R>>,
}

impl<T, R> Worker<T, R>
where
    T: Task,
    R: TaskResult,
{
    /// Builds a worker from an async closure.
    pub fn new<F, Fut>(worker_id: impl Into<WorkerId>, instances: usize, work: F) -> Self
    where
        F: Fn(CancellationToken, usize, Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let work_fn: WorkFn<T, R> = Arc::new(move |token, inst, task| {
            Box::pin(work(token, inst, task)) as Pin<Box<dyn Future<Output = R> + Send>>
        });

        Self {
            worker_id: worker_id.into(),
            instances,
            work: Some(work_fn),
        }
    }
}

impl<T, R> Clone for Worker<T, R> {
    fn clone(&self) -> Self {
        Self {
            worker_id: self.worker_id.clone(),
            instances: self.instances,
            work: self.work.clone(),
        }
    }
}

impl<T, R> fmt::Debug for Worker<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("worker_id", &self.worker_id)
            .field("instances", &self.instances)
            .field("work", &self.work.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl From<String> for WorkerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Ordered task list of every worker.
///
/// The same `TaskId` may appear under several workers: that is how several
/// sources race to satisfy one task.
#[derive(Debug)]
pub struct WorkerTasks<T>(pub HashMap<WorkerId, Vec<Arc<T>>>);

impl<T> WorkerTasks<T> {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, worker_id: impl Into<WorkerId>, tasks: Vec<Arc<T>>) {
        self.0.insert(worker_id.into(), tasks);
    }

    pub fn get(&self, worker_id: &WorkerId) -> Option<&Vec<Arc<T>>> {
        self.0.get(worker_id)
    }

    /// Total number of (worker, task) assignments.
    pub fn assignments(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WorkerId, &Vec<Arc<T>>)> {
        self.0.iter()
    }
}

impl<T> Default for WorkerTasks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for WorkerTasks<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Which results of a task reach the output stream, and when the remaining
/// attempts of the task get cancelled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Mode {
    /// One result per task: the first success, or the last error received.
    #[default]
    FirstSuccessOrLastError,
    /// Every result, but the task is cancelled as soon as one attempt succeeds.
    FirstSuccessThenCancel,
    /// Every result of every attempt.
    All,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::FirstSuccessOrLastError => "first-success-or-last-error",
            Mode::FirstSuccessThenCancel => "first-success-then-cancel",
            Mode::All => "all",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "first-success-or-last-error" => Ok(Mode::FirstSuccessOrLastError),
            "u" | "first-success-then-cancel" => Ok(Mode::FirstSuccessThenCancel),
            "a" | "all" => Ok(Mode::All),
            other => Err(format!("invalid mode {:?}: expected one of 1, U, A", other)),
        }
    }
}
