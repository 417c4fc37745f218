use super::sink::QuoteSink;
use super::types::QuoteRecord;

use anyhow::Result;
use dashmap::DashMap;

type RecordKey = (String, String);

/// In-memory record store, keyed by (isin, source).
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<RecordKey, Vec<QuoteRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(isin: &str, source: &str) -> RecordKey {
        (isin.to_string(), source.to_string())
    }

    /// Every record of the pair, in insertion order.
    pub fn history(&self, isin: &str, source: &str) -> Vec<QuoteRecord> {
        self.records
            .get(&Self::key(isin, source))
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Most recent successful record of the pair.
    pub fn latest(&self, isin: &str, source: &str) -> Option<QuoteRecord> {
        let entry = self.records.get(&Self::key(isin, source))?;
        entry
            .value()
            .iter()
            .filter(|r| r.is_success())
            .max_by_key(|r| r.timestamp)
            .cloned()
    }

    /// Most recent successful record of every pair, sorted by (isin, source).
    pub fn last_quotes(&self) -> Vec<QuoteRecord> {
        let mut keys: Vec<RecordKey> = self.records.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys.iter()
            .filter_map(|(isin, source)| self.latest(isin, source))
            .collect()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuoteSink for MemoryStore {
    fn insert(&self, records: &[QuoteRecord]) -> Result<()> {
        for record in records {
            self.records
                .entry(Self::key(&record.isin, &record.source))
                .or_default()
                .push(record.clone());
        }
        Ok(())
    }
}
