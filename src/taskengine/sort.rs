//! Task Ordering
//!
//! Every instance of a worker pulls its tasks sequentially, so the order of a
//! worker's list decides when each task is first attempted. A poor order can
//! leave a task that several workers share at the bottom of every list.
//!
//! `sort_tasks` is a deterministic greedy pass: workers take turns (in
//! ascending `WorkerId` order) picking their next task, preferring the task
//! the fewest later workers could still pick, then the task the fewest workers
//! already picked, then the smallest `TaskId`.
//!
//! Precondition: a worker's list does not contain the same `TaskId` twice.

use super::types::{Task, TaskId, WorkerId, WorkerTasks};

use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;

impl<T: Task> WorkerTasks<T> {
    /// Reorders each worker's list so every task is handled globally as soon
    /// as possible. The set of tasks of each worker is left unchanged.
    pub fn sort_tasks(&mut self) {
        // Work on private copies: several workers may share the same list.
        let mut remaining: HashMap<WorkerId, Vec<Arc<T>>> = self.0.clone();

        let mut wids: Vec<WorkerId> = remaining.keys().cloned().collect();
        wids.sort();

        let mut sorted: HashMap<WorkerId, Vec<Arc<T>>> = wids
            .iter()
            .map(|wid| (wid.clone(), Vec::with_capacity(remaining[wid].len())))
            .collect();

        let mut done: HashMap<TaskId, usize> = HashMap::new();
        let mut count_tasks: usize = remaining.values().map(Vec::len).sum();

        while count_tasks > 0 {
            for (jw, wid) in wids.iter().enumerate() {
                let ts = &remaining[wid];
                if ts.is_empty() {
                    continue;
                }

                let mut best: Option<(usize, usize, usize, TaskId)> = None;

                for (idx, task) in ts.iter().enumerate() {
                    let tid = task.task_id();

                    let count = wids[jw + 1..]
                        .iter()
                        .flat_map(|later| remaining[later].iter())
                        .filter(|t| t.task_id() == tid)
                        .count();
                    let already = done.get(&tid).copied().unwrap_or(0);

                    let better = match &best {
                        None => true,
                        Some((_, min_count, min_done, min_tid)) => {
                            (count, already, &tid) < (*min_count, *min_done, min_tid)
                        }
                    };
                    if better {
                        best = Some((idx, count, already, tid));
                    }
                }

                let Some((idx, _, already, tid)) = best else {
                    continue;
                };

                done.insert(tid, already + 1);
                count_tasks -= 1;

                let Some(ts) = remaining.get_mut(wid) else {
                    continue;
                };
                let task = ts.swap_remove(idx);
                if let Some(out) = sorted.get_mut(wid) {
                    out.push(task);
                }
            }
        }

        for (wid, ts) in self.0.iter_mut() {
            if let Some(out) = sorted.remove(wid) {
                *ts = out;
            }
        }

        tracing::debug!("Sorted tasks of {} workers", wids.len());
    }

    /// Independently shuffles each worker's list. No cross-worker coordination.
    pub fn sort_random(&mut self) {
        let mut rng = rand::thread_rng();
        for ts in self.0.values_mut() {
            ts.shuffle(&mut rng);
        }
    }
}
