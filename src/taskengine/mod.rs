//! Concurrent Task Engine
//!
//! Executes a set of tasks assigned to several workers, where the same task
//! may be assigned to more than one worker and the workers race to satisfy it.
//!
//! ## Architecture Overview
//! 1. **Ordering**: `WorkerTasks::sort_tasks` reorders each worker's list so
//!    every task is attempted by some worker as early as possible.
//! 2. **Validation**: `Engine::new` checks the workers and builds one
//!    cancellable context per distinct `TaskId`.
//! 3. **Dispatch**: `Engine::execute` runs `instances` executors per worker,
//!    each pulling the worker's tasks in order.
//! 4. **Completion**: one coordinator per `TaskId` applies the selected `Mode`
//!    and forwards the admitted results to a single output stream.
//!
//! Cancellation is cooperative: a task's token is cancelled when its mode
//! says no more attempts are needed, and work functions observe it.
//!
//! ## Submodules
//! - **`types`**: Task/worker data model and the `Mode` selector.
//! - **`sort`**: Deterministic and random task ordering.
//! - **`engine`**: Validation, fan-out and fan-in.
//! - **`policy`**: The three per-task completion policies.
//! - **`error`**: Construction errors.

pub mod engine;
pub mod error;
mod policy;
pub mod sort;
pub mod types;

pub use engine::{execute, Engine};
pub use error::EngineError;
pub use types::{Mode, Task, TaskId, TaskResult, WorkFn, Worker, WorkerId, WorkerTasks, MAX_INSTANCES};
