//! Dispatch Engine
//!
//! Fans the tasks of every worker out to the worker's instances and fans the
//! results back in through one coordinator per distinct `TaskId`.
//!
//! ## Channel ownership
//! - **Request channels**: one per worker, written and closed only by the
//!   worker's request generator, shared by the worker's instances.
//! - **Result channels**: one per `TaskId`, buffered to exactly the number of
//!   assignments of the task, so an instance never waits to hand in a result.
//! - **Output channel**: closed only once the supervisor has seen every
//!   coordinator finish.

use super::error::EngineError;
use super::policy;
use super::types::{Mode, Task, TaskId, TaskResult, WorkFn, Worker, WorkerId, WorkerTasks, MAX_INSTANCES};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// State shared by every assignment of one `TaskId`, consumed by its coordinator.
pub(crate) struct TaskIdContext<R> {
    pub(crate) task_id: TaskId,
    /// Number of (worker, position) pairs referencing the task.
    pub(crate) workers: usize,
    pub(crate) token: CancellationToken,
    pub(crate) results: mpsc::Receiver<R>,
}

/// Producer half of a `TaskIdContext`, handed to every request of the task.
struct TaskSlot<R> {
    token: CancellationToken,
    results: mpsc::Sender<R>,
}

/// Everything an instance needs to execute one task.
struct WorkerRequest<T, R> {
    token: CancellationToken,
    task: Arc<T>,
    results: mpsc::Sender<R>,
}

/// A validated worker.
struct Pool<T, R> {
    worker_id: WorkerId,
    instances: usize,
    work: WorkFn<T, R>,
}

/// A validated set of workers and tasks, ready to be executed once.
pub struct Engine<T, R> {
    pools: Vec<Pool<T, R>>,
    tasks: HashMap<WorkerId, Vec<Arc<T>>>,
    contexts: Vec<TaskIdContext<R>>,
    slots: HashMap<TaskId, TaskSlot<R>>,
}

impl<T, R> Engine<T, R>
where
    T: Task,
    R: TaskResult,
{
    /// Validates the workers and their tasks and prepares one context per
    /// distinct `TaskId`, each derived from `parent`.
    pub fn new(
        parent: &CancellationToken,
        workers: Vec<Worker<T, R>>,
        worker_tasks: WorkerTasks<T>,
    ) -> Result<Self, EngineError> {
        let mut pools: Vec<Pool<T, R>> = Vec::with_capacity(workers.len());
        let mut known: HashSet<WorkerId> = HashSet::new();

        for worker in workers {
            if !known.insert(worker.worker_id.clone()) {
                return Err(EngineError::duplicate(&worker.worker_id));
            }
            if worker.instances == 0 || worker.instances > MAX_INSTANCES {
                return Err(EngineError::InstancesOutOfRange {
                    worker: worker.worker_id.0,
                    instances: worker.instances,
                });
            }
            let Some(work) = worker.work else {
                return Err(EngineError::MissingWork(worker.worker_id.0));
            };
            pools.push(Pool {
                worker_id: worker.worker_id,
                instances: worker.instances,
                work,
            });
        }

        let mut tasks: HashMap<WorkerId, Vec<Arc<T>>> = HashMap::new();
        let mut counts: HashMap<TaskId, usize> = HashMap::new();

        for (wid, ts) in worker_tasks.0 {
            if ts.is_empty() {
                continue;
            }
            if !known.contains(&wid) {
                return Err(EngineError::undefined(&wid));
            }
            // A worker listing the same task twice counts twice.
            for task in &ts {
                *counts.entry(task.task_id()).or_insert(0) += 1;
            }
            tasks.insert(wid, ts);
        }

        let mut contexts = Vec::with_capacity(counts.len());
        let mut slots = HashMap::with_capacity(counts.len());

        for (task_id, workers) in counts {
            let token = parent.child_token();
            let (tx, rx) = mpsc::channel(workers.max(1));

            slots.insert(
                task_id.clone(),
                TaskSlot {
                    token: token.clone(),
                    results: tx,
                },
            );
            contexts.push(TaskIdContext {
                task_id,
                workers,
                token,
                results: rx,
            });
        }

        tracing::debug!(
            "Engine ready: {} workers, {} distinct tasks, {} assignments",
            pools.len(),
            contexts.len(),
            tasks.values().map(Vec::len).sum::<usize>()
        );

        Ok(Self {
            pools,
            tasks,
            contexts,
            slots,
        })
    }

    /// Number of distinct tasks the engine will resolve.
    pub fn task_count(&self) -> usize {
        self.contexts.len()
    }

    /// Starts every coordinator, request generator and worker instance and
    /// returns the stream of admitted results.
    ///
    /// The stream ends once every task has been resolved according to `mode`.
    /// Must be called from within a Tokio runtime.
    pub fn execute(self, mode: Mode) -> mpsc::Receiver<R> {
        let Engine {
            pools,
            mut tasks,
            contexts,
            slots,
        } = self;

        tracing::info!(
            "Executing {} tasks on {} workers (mode: {})",
            contexts.len(),
            pools.len(),
            mode
        );

        let (out_tx, out_rx) = mpsc::channel(1);

        let mut coordinators = JoinSet::new();
        for tidctx in contexts {
            coordinators.spawn(policy::coordinate(mode, tidctx, out_tx.clone()));
        }

        // Supervisor: sole owner of the last output sender.
        tokio::spawn(async move {
            while let Some(joined) = coordinators.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("Task coordinator failed: {}", e);
                }
            }
            drop(out_tx);
            tracing::info!("All tasks resolved, closing result stream");
        });

        let slots = Arc::new(slots);

        for pool in pools {
            let Some(worker_tasks) = tasks.remove(&pool.worker_id) else {
                continue;
            };

            let requests = spawn_request_generator(pool.worker_id.clone(), worker_tasks, slots.clone());
            let requests = Arc::new(Mutex::new(requests));

            for instance in 0..pool.instances {
                spawn_instance(pool.worker_id.clone(), instance, pool.work.clone(), requests.clone());
            }
        }

        out_rx
    }
}

/// Walks the worker's ordered task list and queues one request per task.
/// The request channel closes when the generator returns.
fn spawn_request_generator<T, R>(
    worker_id: WorkerId,
    tasks: Vec<Arc<T>>,
    slots: Arc<HashMap<TaskId, TaskSlot<R>>>,
) -> mpsc::Receiver<WorkerRequest<T, R>>
where
    T: Task,
    R: TaskResult,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        for task in tasks {
            let Some(slot) = slots.get(&task.task_id()) else {
                tracing::error!("No context for task {} of worker {}", task.task_id(), worker_id);
                continue;
            };
            let req = WorkerRequest {
                token: slot.token.clone(),
                results: slot.results.clone(),
                task,
            };
            if tx.send(req).await.is_err() {
                tracing::warn!("Worker {} stopped accepting requests", worker_id);
                break;
            }
        }
        tracing::trace!("Request generator of worker {} done", worker_id);
    });

    rx
}

/// One executor of a worker pool: pulls requests until the channel closes.
fn spawn_instance<T, R>(
    worker_id: WorkerId,
    instance: usize,
    work: WorkFn<T, R>,
    requests: Arc<Mutex<mpsc::Receiver<WorkerRequest<T, R>>>>,
) where
    T: Task,
    R: TaskResult,
{
    tokio::spawn(async move {
        loop {
            let next = requests.lock().await.recv().await;
            let Some(req) = next else {
                break;
            };

            let task_id = req.task.task_id();
            tracing::trace!("Worker {}#{} working on task {}", worker_id, instance, task_id);

            let res = work(req.token, instance, req.task).await;

            // Capacity equals the task's assignment count: never waits.
            if req.results.send(res).await.is_err() {
                tracing::trace!("Task {} already resolved, result of {} discarded", task_id, worker_id);
            }
        }
        tracing::trace!("Worker {}#{} exiting", worker_id, instance);
    });
}

/// Convenience wrapper: builds an engine and executes it.
pub fn execute<T, R>(
    parent: &CancellationToken,
    workers: Vec<Worker<T, R>>,
    worker_tasks: WorkerTasks<T>,
    mode: Mode,
) -> Result<mpsc::Receiver<R>, EngineError>
where
    T: Task,
    R: TaskResult,
{
    Ok(Engine::new(parent, workers, worker_tasks)?.execute(mode))
}
