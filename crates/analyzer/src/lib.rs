use crate::error::AnalyzerError;
use api_client::{ApiClient, BatchPayload, DataSet, MAX_SYMBOLS_PER_BATCH, chunk_symbols};
use core_types::{MomentumRecord, Sector, StatTable, Symbol};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;

pub mod error;
pub mod flatten;
pub mod momentum;

pub use flatten::{SYMBOL_FIELD, flatten_nested, tabulate};
pub use momentum::{leaderboard, mean_present, momentum_analysis, percentile_ranks};

/// The batch datasets the analysis layer knows how to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchKind {
    Stats,
    AdvancedStats,
    Info,
    Peers,
}

/// Retrieves data through an [`ApiClient`] and reshapes it into tables.
///
/// Symbol lists of any length are accepted: they are de-duplicated, split into
/// chunks of at most [`MAX_SYMBOLS_PER_BATCH`], fetched with a bounded number
/// of requests in flight, and merged into one table keyed by symbol. If any
/// chunk fails the whole call fails.
pub struct Analysis {
    api: Arc<dyn ApiClient>,
    max_concurrent_requests: usize,
}

impl Analysis {
    pub fn new(api: Arc<dyn ApiClient>, max_concurrent_requests: usize) -> Self {
        Self {
            api,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Key statistics and latest price, one row per symbol with the `stats`
    /// object flattened into it.
    pub async fn get_symbol_stats(&self, symbols: &[Symbol]) -> Result<StatTable, AnalyzerError> {
        let payload = self.fetch_chunked(BatchKind::Stats, symbols).await?;
        Ok(flatten_nested(payload, DataSet::Stats.as_str()))
    }

    /// Advanced statistics, one row per symbol with `advanced-stats` flattened into it.
    pub async fn get_advanced_symbol_stats(
        &self,
        symbols: &[Symbol],
    ) -> Result<StatTable, AnalyzerError> {
        let payload = self.fetch_chunked(BatchKind::AdvancedStats, symbols).await?;
        Ok(flatten_nested(payload, DataSet::AdvancedStats.as_str()))
    }

    /// Company information, one row per symbol with `company` flattened into it.
    pub async fn get_symbol_info(&self, symbols: &[Symbol]) -> Result<StatTable, AnalyzerError> {
        let payload = self.fetch_chunked(BatchKind::Info, symbols).await?;
        Ok(flatten_nested(payload, DataSet::Company.as_str()))
    }

    /// Peer tickers, one row per symbol holding the `peers` list as-is.
    pub async fn get_peers(&self, symbols: &[Symbol]) -> Result<StatTable, AnalyzerError> {
        let payload = self.fetch_chunked(BatchKind::Peers, symbols).await?;
        Ok(tabulate(payload))
    }

    /// The sectors supported by the service.
    pub async fn get_sectors(&self) -> Result<Vec<Sector>, AnalyzerError> {
        Ok(self.api.get_sector_list().await?)
    }

    /// Ranks already fetched statistics; see [`momentum::momentum_analysis`].
    pub fn momentum_analysis(&self, stats: &StatTable) -> Vec<MomentumRecord> {
        momentum_analysis(stats)
    }

    /// Fetches statistics for `symbols` and ranks their momentum.
    pub async fn momentum_for(
        &self,
        symbols: &[Symbol],
    ) -> Result<Vec<MomentumRecord>, AnalyzerError> {
        let stats = self.get_symbol_stats(symbols).await?;
        Ok(self.momentum_analysis(&stats))
    }

    async fn fetch_chunked(
        &self,
        kind: BatchKind,
        symbols: &[Symbol],
    ) -> Result<BatchPayload, AnalyzerError> {
        let unique = dedup_symbols(symbols);
        if unique.is_empty() {
            // Let the request builder report the empty list.
            return Ok(self.fetch_one(kind, &unique).await?);
        }

        let chunks: Vec<&[Symbol]> = chunk_symbols(&unique, MAX_SYMBOLS_PER_BATCH)?.collect();
        tracing::info!(
            ?kind,
            symbols = unique.len(),
            chunks = chunks.len(),
            "Fetching batched data"
        );

        let payloads: Vec<BatchPayload> = stream::iter(chunks)
            .map(|chunk| self.fetch_one(kind, chunk))
            .buffer_unordered(self.max_concurrent_requests)
            .try_collect()
            .await?;

        let mut merged = BatchPayload::new();
        for payload in payloads {
            merged.extend(payload);
        }
        Ok(merged)
    }

    async fn fetch_one(
        &self,
        kind: BatchKind,
        chunk: &[Symbol],
    ) -> Result<BatchPayload, api_client::error::ApiError> {
        tracing::debug!(?kind, size = chunk.len(), "Requesting chunk");
        match kind {
            BatchKind::Stats => self.api.get_stats(chunk).await,
            BatchKind::AdvancedStats => self.api.get_advanced_stats(chunk).await,
            BatchKind::Info => self.api.get_symbol_info(chunk).await,
            BatchKind::Peers => self.api.get_peers(chunk).await,
        }
    }
}

/// Drops repeated symbols, keeping the first occurrence of each.
fn dedup_symbols(symbols: &[Symbol]) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let symbols: Vec<Symbol> = ["AAPL", "MSFT", "AAPL", "NVDA", "MSFT"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedup_symbols(&symbols), vec!["AAPL", "MSFT", "NVDA"]);
    }
}
