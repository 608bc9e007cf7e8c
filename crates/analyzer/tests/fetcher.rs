use analyzer::Analysis;
use analyzer::error::AnalyzerError;
use api_client::error::ApiError;
use api_client::{ApiClient, BatchPayload, MAX_SYMBOLS_PER_BATCH};
use async_trait::async_trait;
use core_types::{Sector, Symbol};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An in-memory service that answers every batch call with synthetic data and
/// records the chunks it was asked for.
#[derive(Default)]
struct MockApi {
    calls: AtomicUsize,
    chunks: Mutex<Vec<Vec<Symbol>>>,
    fail_on_call: Option<usize>,
}

impl MockApi {
    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    fn record(&self, symbols: &[Symbol]) -> Result<(), ApiError> {
        if symbols.len() > MAX_SYMBOLS_PER_BATCH {
            return Err(ApiError::TooManySymbols {
                count: symbols.len(),
                limit: MAX_SYMBOLS_PER_BATCH,
            });
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.chunks.lock().unwrap().push(symbols.to_vec());
        if self.fail_on_call == Some(call) {
            return Err(ApiError::Deserialization("boom".to_string()));
        }
        Ok(())
    }

    fn payload(symbols: &[Symbol], entry: impl Fn(usize, &str) -> Value) -> BatchPayload {
        symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), entry(i, s)))
            .collect()
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn get_stats(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError> {
        self.record(symbols)?;
        Ok(Self::payload(symbols, |i, s| {
            json!({
                "stats": {
                    "companyName": format!("{s} Inc."),
                    "month1ChangePercent": i as f64 / 100.0,
                    "month3ChangePercent": 0.1,
                    "month6ChangePercent": -(i as f64),
                    "year1ChangePercent": null
                },
                "price": 10.0 + i as f64
            })
        }))
    }

    async fn get_advanced_stats(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError> {
        self.record(symbols)?;
        Ok(Self::payload(symbols, |_, _| {
            json!({ "advanced-stats": { "debtToEquity": 1.5 } })
        }))
    }

    async fn get_symbol_info(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError> {
        self.record(symbols)?;
        // The last symbol comes back without company data.
        Ok(Self::payload(symbols, |i, _| {
            if i + 1 == symbols.len() {
                json!({})
            } else {
                json!({ "company": { "exchange": "NASDAQ" } })
            }
        }))
    }

    async fn get_peers(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError> {
        self.record(symbols)?;
        Ok(Self::payload(symbols, |_, _| json!({ "peers": ["AMD", "INTC"] })))
    }

    async fn get_sector_list(&self) -> Result<Vec<Sector>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Sector {
            name: "Electronic Technology".to_string(),
        }])
    }
}

fn symbols(n: usize) -> Vec<Symbol> {
    (0..n).map(|i| format!("S{i:03}")).collect()
}

#[tokio::test]
async fn one_hundred_fifty_symbols_take_two_batches() {
    let api = Arc::new(MockApi::default());
    let analysis = Analysis::new(api.clone(), 4);

    let table = analysis.get_symbol_stats(&symbols(150)).await.unwrap();

    assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    assert_eq!(table.len(), 150);

    let mut sizes: Vec<usize> = api.chunks.lock().unwrap().iter().map(Vec::len).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![50, 100]);

    let requested: HashSet<Symbol> = api.chunks.lock().unwrap().iter().flatten().cloned().collect();
    assert_eq!(requested.len(), 150);

    assert_eq!(table.value("S149", "companyName"), Some(&json!("S149 Inc.")));
    assert_eq!(table.value("S149", "symbol"), Some(&json!("S149")));
    assert!(table.value("S000", "price").is_some());
}

#[tokio::test]
async fn small_lists_take_a_single_batch() {
    let api = Arc::new(MockApi::default());
    let analysis = Analysis::new(api.clone(), 1);

    let table = analysis.get_advanced_symbol_stats(&symbols(100)).await.unwrap();

    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    assert_eq!(table.len(), 100);
    assert_eq!(table.number("S042", "debtToEquity"), Some(1.5));
}

#[tokio::test]
async fn duplicate_symbols_are_requested_once() {
    let api = Arc::new(MockApi::default());
    let analysis = Analysis::new(api.clone(), 2);

    let mut list = symbols(120);
    list.extend(symbols(30));
    let table = analysis.get_peers(&list).await.unwrap();

    assert_eq!(table.len(), 120);
    let requested: usize = api.chunks.lock().unwrap().iter().map(Vec::len).sum();
    assert_eq!(requested, 120);
    assert_eq!(table.value("S007", "peers"), Some(&json!(["AMD", "INTC"])));
}

#[tokio::test]
async fn missing_nested_data_leaves_fields_unset() {
    let api = Arc::new(MockApi::default());
    let analysis = Analysis::new(api, 4);

    let table = analysis.get_symbol_info(&symbols(3)).await.unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.value("S000", "exchange"), Some(&json!("NASDAQ")));
    assert_eq!(table.value("S002", "exchange"), None);
}

#[tokio::test]
async fn a_failing_chunk_fails_the_call() {
    let api = Arc::new(MockApi::failing_on(2));
    let analysis = Analysis::new(api, 1);

    let err = analysis.get_symbol_stats(&symbols(250)).await.unwrap_err();
    assert!(matches!(err, AnalyzerError::Api(ApiError::Deserialization(_))));
}

#[tokio::test]
async fn momentum_for_ranks_fetched_stats() {
    let api = Arc::new(MockApi::default());
    let analysis = Analysis::new(api, 4);

    let records = analysis.momentum_for(&symbols(4)).await.unwrap();

    assert_eq!(records.len(), 4);
    // month1 rises with the index, month3 is tied everywhere, month6 falls.
    assert_eq!(records[3].month1_percentile, Some(1.0));
    assert_eq!(records[0].month3_percentile, Some(0.625));
    assert_eq!(records[0].month6_percentile, Some(1.0));
    assert_eq!(records[0].year1_percentile, None);
    for record in &records {
        let avg = record.avg_percentile.unwrap();
        assert!((0.0..=1.0).contains(&avg));
    }
}

#[tokio::test]
async fn sectors_pass_through() {
    let api = Arc::new(MockApi::default());
    let analysis = Analysis::new(api, 4);

    let sectors = analysis.get_sectors().await.unwrap();
    assert_eq!(sectors[0].name, "Electronic Technology");
}

#[tokio::test]
async fn momentum_analysis_ranks_a_fetched_table() {
    let api = Arc::new(MockApi::default());
    let analysis = Analysis::new(api.clone(), 4);

    let stats = analysis.get_symbol_stats(&symbols(3)).await.unwrap();
    let records = analysis.momentum_analysis(&stats);

    assert_eq!(records.len(), 3);
    assert_eq!(records[2].month1_percentile, Some(1.0));
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
}
