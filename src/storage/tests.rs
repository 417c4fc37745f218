//! Storage Module Tests
//!
//! Validates the conversion of outcomes into records and both stores.
//!
//! ## Test Scopes
//! - **Records**: Which outcomes are recorded and with which fields.
//! - **MemoryStore**: History and last successful quote per (isin, source).
//! - **JsonLinesStore**: Appending across runs and reading back.
//! - **persist**: Best-effort behaviour with a failing sink.

#[cfg(test)]
mod tests {
    use crate::quote::{ErrorKind, QuoteError, QuoteOutcome, QuoteResult};
    use crate::storage::{persist, JsonLinesStore, MemoryStore, QuoteRecord, QuoteSink};

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, day, hour, 0, 0).unwrap()
    }

    fn ok_outcome(isin: &str, source: &str, price: f64, day: u32) -> QuoteOutcome {
        QuoteOutcome {
            source: source.to_string(),
            isin: isin.to_string(),
            instance: 0,
            time_start: at(day, 10),
            time_end: at(day, 11),
            quote: Some(QuoteResult {
                source: source.to_string(),
                isin: isin.to_string(),
                url: format!("http://127.0.0.1/{}/{}/", source, isin),
                price,
                currency: "USD".to_string(),
                date: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            }),
            error: None,
        }
    }

    fn ko_outcome(isin: &str, source: &str, kind: ErrorKind, day: u32) -> QuoteOutcome {
        QuoteOutcome {
            source: source.to_string(),
            isin: isin.to_string(),
            instance: 1,
            time_start: at(day, 10),
            time_end: at(day, 11),
            quote: None,
            error: Some(QuoteError::new(source, isin, None, kind)),
        }
    }

    /// Sink that always fails.
    struct BrokenSink;

    impl QuoteSink for BrokenSink {
        fn insert(&self, _records: &[QuoteRecord]) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    // ============================================================
    // RECORD TESTS
    // ============================================================

    #[test]
    fn test_record_from_success() {
        let run_id = Uuid::new_v4();
        let record = QuoteRecord::from_outcome(&ok_outcome("ISIN00001111", "s1", 10.1, 1), run_id).unwrap();

        assert_eq!(record.isin, "ISIN00001111");
        assert_eq!(record.source, "s1");
        assert_eq!(record.price, Some(10.1));
        assert_eq!(record.currency.as_deref(), Some("USD"));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(record.timestamp, at(1, 11));
        assert_eq!(record.run_id, run_id);
        assert!(record.is_success());
    }

    #[test]
    fn test_record_from_error() {
        let record =
            QuoteRecord::from_outcome(&ko_outcome("ISIN00001111", "s1", ErrorKind::NoResultFound, 2), Uuid::nil())
                .unwrap();

        assert_eq!(record.price, None);
        assert_eq!(
            record.error.as_deref(),
            Some("no result found for isin \"ISIN00001111\" from s1")
        );
        assert!(!record.is_success());
    }

    #[test]
    fn test_cancelled_and_anonymous_outcomes_are_skipped() {
        let cancelled = ko_outcome("ISIN00001111", "s1", ErrorKind::Cancelled, 1);
        assert!(QuoteRecord::from_outcome(&cancelled, Uuid::nil()).is_none());

        let no_isin = ko_outcome("", "s1", ErrorKind::NoResultFound, 1);
        assert!(QuoteRecord::from_outcome(&no_isin, Uuid::nil()).is_none());

        let no_source = ok_outcome("ISIN00001111", "", 1.0, 1);
        assert!(QuoteRecord::from_outcome(&no_source, Uuid::nil()).is_none());
    }

    // ============================================================
    // MEMORY STORE TESTS
    // ============================================================

    #[test]
    fn test_memory_store_history_and_latest() {
        // ARRANGE
        let store = MemoryStore::new();
        let outcomes = vec![
            ok_outcome("ISIN00001111", "s1", 10.1, 1),
            ko_outcome("ISIN00001111", "s1", ErrorKind::NoResultFound, 2),
            ok_outcome("ISIN00001111", "s1", 10.3, 3),
            ok_outcome("ISIN00001111", "s2", 10.22, 4),
            ko_outcome("ISIN00001111", "s2", ErrorKind::NoResultFound, 5),
            ko_outcome("ISIN99992222", "s1", ErrorKind::NoResultFound, 3),
            ko_outcome("ISIN99992222", "s2", ErrorKind::Cancelled, 3),
        ];

        // ACT
        let written = persist(&store, Uuid::new_v4(), &outcomes);

        // ASSERT
        assert_eq!(written, 6);
        assert_eq!(store.len(), 6);
        assert_eq!(store.history("ISIN00001111", "s1").len(), 3);
        assert_eq!(store.latest("ISIN00001111", "s1").unwrap().price, Some(10.3));
        // The last attempt failed: the latest quote is still the previous success
        assert_eq!(store.latest("ISIN00001111", "s2").unwrap().price, Some(10.22));
        assert!(store.latest("ISIN99992222", "s1").is_none());
        assert!(store.history("ISIN99992222", "s2").is_empty());

        let last: Vec<(String, String)> = store
            .last_quotes()
            .into_iter()
            .map(|r| (r.isin, r.source))
            .collect();
        assert_eq!(
            last,
            vec![
                ("ISIN00001111".to_string(), "s1".to_string()),
                ("ISIN00001111".to_string(), "s2".to_string()),
            ]
        );
    }

    // ============================================================
    // JSON LINES STORE TESTS
    // ============================================================

    #[test]
    fn test_json_lines_store_appends_runs() {
        let dir = std::env::temp_dir().join(format!("quote-scraper-{}", Uuid::new_v4()));
        let store = JsonLinesStore::new(dir.join("quotes.jsonl"));

        // Missing file: no records yet
        assert!(store.read_all().unwrap().is_empty());

        let run1 = Uuid::new_v4();
        let run2 = Uuid::new_v4();
        assert_eq!(persist(&store, run1, &[ok_outcome("A", "s1", 1.5, 1)]), 1);
        assert_eq!(
            persist(
                &store,
                run2,
                &[
                    ok_outcome("A", "s1", 1.6, 2),
                    ko_outcome("B", "s2", ErrorKind::PriceNotFound, 2)
                ]
            ),
            2
        );

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].run_id, run1);
        assert_eq!(records[0].price, Some(1.5));
        assert_eq!(records[1].run_id, run2);
        assert_eq!(records[2].error.as_deref(), Some("price not found for isin \"B\" from s2"));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.lines().count(), 3);
        assert!(!raw.lines().nth(2).unwrap().contains("\"price\""));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_persist_survives_failing_sink() {
        let written = persist(&BrokenSink, Uuid::nil(), &[ok_outcome("A", "s1", 1.0, 1)]);
        assert_eq!(written, 0);
    }

    #[test]
    fn test_persist_with_nothing_to_record() {
        let store = MemoryStore::new();
        let written = persist(&store, Uuid::nil(), &[ko_outcome("A", "s1", ErrorKind::Cancelled, 1)]);
        assert_eq!(written, 0);
        assert!(store.is_empty());
    }
}
