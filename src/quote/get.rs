//! Quote Retrieval
//!
//! Turns a list of (source, isins) assignments into task engine workers:
//! one worker per source, one task per ISIN, every source racing on the
//! ISINs it was given.

use super::getter::QuoteGetter;
use super::http::{build_client, DEFAULT_TIMEOUT};
use super::registry::SourceRegistry;
use super::types::{ErrorKind, QuoteError, QuoteResult, SourceIsins};
use crate::taskengine::{self, Mode, Task, TaskId, TaskResult, Worker, WorkerTasks};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One ISIN to price. Every source asked about the same ISIN shares its `TaskId`.
#[derive(Debug, Clone)]
pub struct IsinTask {
    pub isin: String,
    /// Known instrument page, skips the search step when set.
    pub url: Option<String>,
}

impl IsinTask {
    pub fn new(isin: &str) -> Self {
        Self {
            isin: isin.to_string(),
            url: None,
        }
    }
}

impl Task for IsinTask {
    fn task_id(&self) -> TaskId {
        TaskId::from(self.isin.as_str())
    }
}

/// The outcome of one attempt of a source on an ISIN.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteOutcome {
    pub source: String,
    pub isin: String,
    /// Instance of the source's pool that made the attempt.
    pub instance: usize,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteResult>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_error")]
    pub error: Option<QuoteError>,
}

fn serialize_error<S: Serializer>(error: &Option<QuoteError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_str(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl QuoteOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.error.as_ref().is_some_and(QuoteError::is_cancelled)
    }
}

impl TaskResult for QuoteOutcome {
    fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Parameters of a retrieval run.
#[derive(Debug, Clone, Default)]
pub struct GetRequest {
    pub sources: Vec<SourceIsins>,
    pub mode: Mode,
    /// Deadline of the whole run. Attempts still running when it expires,
    /// and attempts not started yet, are reported as `ErrorKind::Timeout`.
    pub timeout: Option<Duration>,
}

/// Runs one attempt, reporting `Cancelled` as soon as the task's token fires
/// and `Timeout` once the run's deadline has passed.
///
/// The deadline never touches the engine's tokens: the attempt ends through
/// the normal result path, so every mode still resolves the task.
async fn fetch_one(
    getter: Arc<dyn QuoteGetter>,
    token: CancellationToken,
    deadline: Option<Instant>,
    instance: usize,
    task: Arc<IsinTask>,
) -> QuoteOutcome {
    let time_start = Utc::now();

    let expired = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    };

    let failed = |kind: ErrorKind| -> Result<QuoteResult, QuoteError> {
        Err(QuoteError::new(getter.name(), &task.isin, task.url.as_deref(), kind))
    };

    let res = tokio::select! {
        biased;
        _ = token.cancelled() => failed(ErrorKind::Cancelled),
        _ = expired => failed(ErrorKind::Timeout),
        res = getter.get_quote(&task.isin, task.url.as_deref()) => res,
    };

    let time_end = Utc::now();

    let (quote, error) = match res {
        Ok(q) => (Some(q), None),
        Err(e) => {
            if !e.is_cancelled() {
                tracing::debug!("{}", e);
            }
            (None, Some(e))
        }
    };

    QuoteOutcome {
        source: getter.name().to_string(),
        isin: task.isin.clone(),
        instance,
        time_start,
        time_end,
        quote,
        error,
    }
}

/// Builds the workers and tasks of `request` and collects every outcome the
/// selected mode lets through.
pub async fn get_quotes(
    registry: &SourceRegistry,
    request: &GetRequest,
    parent: &CancellationToken,
) -> Result<Vec<QuoteOutcome>> {
    let started = Instant::now();
    let deadline = request.timeout.map(|timeout| started + timeout);

    let mut workers = Vec::with_capacity(request.sources.len());
    let mut worker_tasks: WorkerTasks<IsinTask> = WorkerTasks::new();

    for si in &request.sources {
        let client = build_client(si.proxy.as_deref(), DEFAULT_TIMEOUT)?;
        let getter = registry
            .build(&si.source, client)
            .ok_or_else(|| anyhow!("source not available: {:?}", si.source))?;

        if let Some(proxy) = &si.proxy {
            tracing::info!("Source {} uses proxy {}", si.source, proxy);
        }

        workers.push(Worker::new(
            si.source.as_str(),
            si.workers,
            move |token, instance, task: Arc<IsinTask>| fetch_one(getter.clone(), token, deadline, instance, task),
        ));

        let tasks = si.isins.iter().map(|isin| Arc::new(IsinTask::new(isin))).collect();
        worker_tasks.insert(si.source.as_str(), tasks);
    }

    worker_tasks.sort_tasks();

    let mut results = taskengine::execute(parent, workers, worker_tasks, request.mode)?;

    let mut outcomes = Vec::new();
    while let Some(outcome) = results.recv().await {
        outcomes.push(outcome);
    }

    let timed_out = outcomes
        .iter()
        .filter(|o| o.error.as_ref().is_some_and(|e| e.kind == ErrorKind::Timeout))
        .count();
    if timed_out > 0 {
        tracing::warn!("{} attempts hit the timeout of {:?}", timed_out, request.timeout);
    }

    tracing::info!(
        "Collected {} outcomes ({} successful) in {:?}",
        outcomes.len(),
        outcomes.iter().filter(|o| o.success()).count(),
        started.elapsed()
    );

    Ok(outcomes)
}
