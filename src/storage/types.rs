use crate::quote::QuoteOutcome;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted attempt of a source on an ISIN: either a price or the
/// error the source failed with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteRecord {
    pub isin: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the attempt completed.
    pub timestamp: DateTime<Utc>,
    /// Retrieval run the attempt belongs to.
    pub run_id: Uuid,
}

impl QuoteRecord {
    /// Converts an outcome to a record. Cancelled attempts say nothing about
    /// the source and are not recorded, nor are outcomes missing the isin or
    /// the source.
    pub fn from_outcome(outcome: &QuoteOutcome, run_id: Uuid) -> Option<Self> {
        let record = match (&outcome.quote, &outcome.error) {
            (Some(q), _) => QuoteRecord {
                isin: q.isin.clone(),
                source: q.source.clone(),
                price: Some(q.price),
                currency: Some(q.currency.clone()),
                date: Some(q.date),
                url: Some(q.url.clone()),
                error: None,
                timestamp: outcome.time_end,
                run_id,
            },
            (None, Some(e)) if !e.is_cancelled() => QuoteRecord {
                isin: e.isin.clone(),
                source: e.source_name.clone(),
                price: None,
                currency: None,
                date: None,
                url: e.url.clone(),
                error: Some(e.to_string()),
                timestamp: outcome.time_end,
                run_id,
            },
            _ => return None,
        };

        if record.isin.is_empty() || record.source.is_empty() {
            return None;
        }
        Some(record)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.price.is_some()
    }
}
