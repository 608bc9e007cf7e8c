use crate::error::ApiError;
use async_trait::async_trait;
use configuration::ApiTarget;
use core_types::{Sector, Symbol};

pub mod builder;
pub mod error;
pub mod responses;
// --- Public API ---
pub use builder::{
    DataSet, MAX_SYMBOLS_PER_BATCH, RequestKind, build_request, chunk_symbols, encode_query_value,
};
pub use responses::{ApiResponse, BatchPayload};

/// The abstract interface to the market-data service.
///
/// The analysis layer only talks to this trait, so the HTTP implementation can
/// be swapped for an in-memory one in tests. Batch methods accept at most
/// [`MAX_SYMBOLS_PER_BATCH`] symbols; callers with longer lists must chunk them.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Key statistics plus the latest price for each symbol (`stats,price`).
    async fn get_stats(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError>;

    /// Advanced statistics (`advanced-stats`): valuation ratios, debt, revenue and so on.
    async fn get_advanced_stats(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError>;

    /// Company reference data (`company`).
    async fn get_symbol_info(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError>;

    /// Peer tickers (`peers`).
    async fn get_peers(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError>;

    /// The sectors the service supports.
    async fn get_sector_list(&self) -> Result<Vec<Sector>, ApiError>;
}

/// The HTTP implementation of [`ApiClient`].
#[derive(Clone)]
pub struct IexClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl IexClient {
    pub fn new(target: &ApiTarget) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().build()?;
        tracing::info!(base_url = %target.base_url, "Loaded API client");

        Ok(Self {
            client,
            base_url: target.base_url.trim_end_matches('/').to_string(),
            token: target.token.clone(),
        })
    }

    /// Builds the query URL for a request against this client's host, without the token.
    pub fn create_request(
        &self,
        kind: RequestKind,
        symbols: Option<&[Symbol]>,
        data_set: Option<&[DataSet]>,
    ) -> Result<String, ApiError> {
        build_request(&self.base_url, kind, symbols, data_set)
    }

    /// Appends the access token to `request` and sends it as a GET.
    ///
    /// Any status code is returned as a response; only transport failures are errors.
    pub async fn send_request(&self, request: &str) -> Result<ApiResponse, ApiError> {
        tracing::info!(request = %format!("{request}token=<redacted>"), "Sending request");

        let url = format!("{request}token={}", encode_query_value(&self.token));
        // `without_url` keeps the token out of error messages.
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.without_url()))?;

        let status = response.status();
        tracing::info!(status = status.as_u16(), "Request status code");

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.without_url()))?;

        Ok(ApiResponse { status, body })
    }

    async fn get_batch(
        &self,
        kind: RequestKind,
        symbols: &[Symbol],
        data_set: &[DataSet],
    ) -> Result<BatchPayload, ApiError> {
        if symbols.len() > MAX_SYMBOLS_PER_BATCH {
            tracing::error!(
                count = symbols.len(),
                limit = MAX_SYMBOLS_PER_BATCH,
                "Too many symbols for one batch request"
            );
            return Err(ApiError::TooManySymbols {
                count: symbols.len(),
                limit: MAX_SYMBOLS_PER_BATCH,
            });
        }

        let request = self.create_request(kind, Some(symbols), Some(data_set))?;
        self.send_request(&request).await?.json()
    }
}

#[async_trait]
impl ApiClient for IexClient {
    async fn get_stats(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError> {
        self.get_batch(RequestKind::Stat, symbols, &[DataSet::Stats, DataSet::Price])
            .await
    }

    async fn get_advanced_stats(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError> {
        self.get_batch(RequestKind::Stat, symbols, &[DataSet::AdvancedStats])
            .await
    }

    async fn get_symbol_info(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError> {
        self.get_batch(RequestKind::Info, symbols, &[DataSet::Company])
            .await
    }

    async fn get_peers(&self, symbols: &[Symbol]) -> Result<BatchPayload, ApiError> {
        self.get_batch(RequestKind::Stat, symbols, &[DataSet::Peers])
            .await
    }

    async fn get_sector_list(&self) -> Result<Vec<Sector>, ApiError> {
        let request = self.create_request(RequestKind::SectorList, None, None)?;
        self.send_request(&request).await?.json()
    }
}
