use super::types::QuoteRecord;
use crate::quote::QuoteOutcome;

use anyhow::Result;
use uuid::Uuid;

/// Destination of the records of a retrieval run.
pub trait QuoteSink: Send + Sync {
    fn insert(&self, records: &[QuoteRecord]) -> Result<()>;
}

/// Records the outcomes of run `run_id` into `sink` and returns the number of
/// records written.
///
/// Persistence is best effort: a failing sink is logged and the run's
/// outcomes are still reported to the caller.
pub fn persist(sink: &dyn QuoteSink, run_id: Uuid, outcomes: &[QuoteOutcome]) -> usize {
    let records: Vec<QuoteRecord> = outcomes
        .iter()
        .filter_map(|o| QuoteRecord::from_outcome(o, run_id))
        .collect();

    if records.is_empty() {
        tracing::debug!("Run {}: nothing to persist", run_id);
        return 0;
    }

    match sink.insert(&records) {
        Ok(()) => {
            tracing::info!("Run {}: persisted {} records", run_id, records.len());
            records.len()
        }
        Err(e) => {
            tracing::error!("Run {}: failed to persist {} records: {:#}", run_id, records.len(), e);
            0
        }
    }
}
