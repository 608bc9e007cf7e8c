use crate::error::ApiError;
use core_types::Symbol;
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

/// The service rejects batch requests covering more symbols than this.
pub const MAX_SYMBOLS_PER_BATCH: usize = 100;

/// The kinds of query the builder can turn into a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Batch statistics for a list of symbols.
    Stat,
    /// Batch reference information for a list of symbols.
    Info,
    /// The list of sectors the service supports.
    SectorList,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Stat => "stat",
            RequestKind::Info => "info",
            RequestKind::SectorList => "sector_list",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stat" => Ok(RequestKind::Stat),
            "info" => Ok(RequestKind::Info),
            "sector_list" => Ok(RequestKind::SectorList),
            other => Err(ApiError::Unsupported(other.to_string())),
        }
    }
}

/// Datasets that can be requested in a batch call (the `types` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSet {
    Stats,
    Price,
    AdvancedStats,
    Company,
    Peers,
}

impl DataSet {
    /// The name used on the wire and as the key of the nested object in the response.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSet::Stats => "stats",
            DataSet::Price => "price",
            DataSet::AdvancedStats => "advanced-stats",
            DataSet::Company => "company",
            DataSet::Peers => "peers",
        }
    }
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the query URL for a request, without the access token.
///
/// The returned string ends in `?` or `&` so the token parameter can be
/// appended directly.
///
/// # Errors
///
/// `ApiError::InvalidArgument` if `kind` is `Stat` or `Info` and either list
/// is absent or empty. `SectorList` ignores both lists.
pub fn build_request(
    base_url: &str,
    kind: RequestKind,
    symbols: Option<&[Symbol]>,
    data_set: Option<&[DataSet]>,
) -> Result<String, ApiError> {
    let base_url = base_url.trim_end_matches('/');

    match kind {
        RequestKind::Stat | RequestKind::Info => {
            let symbols = symbols.filter(|s| !s.is_empty()).ok_or_else(|| {
                ApiError::InvalidArgument(format!("'{kind}' request needs at least one symbol"))
            })?;
            let data_set = data_set.filter(|d| !d.is_empty()).ok_or_else(|| {
                ApiError::InvalidArgument(format!("'{kind}' request needs at least one data set"))
            })?;

            let joined_symbols = symbols
                .iter()
                .map(|s| encode_query_value(s))
                .collect::<Vec<_>>()
                .join(",");
            let joined_data_set = data_set
                .iter()
                .map(DataSet::as_str)
                .collect::<Vec<_>>()
                .join(",");

            Ok(format!(
                "{base_url}/stable/stock/market/batch?symbols={joined_symbols}&types={joined_data_set}&"
            ))
        }
        RequestKind::SectorList => Ok(format!("{base_url}/stable/ref-data/sectors?")),
    }
}

/// Percent-encodes a single query value. Plain tickers such as `BRK.B` pass
/// through unchanged.
pub fn encode_query_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Splits `symbols` into consecutive chunks of at most `size` items.
///
/// The chunks are produced lazily, keep the input order, and cover every
/// item exactly once.
pub fn chunk_symbols<T>(
    symbols: &[T],
    size: usize,
) -> Result<impl Iterator<Item = &[T]>, ApiError> {
    if size == 0 {
        return Err(ApiError::InvalidArgument(
            "chunk size must be at least 1".to_string(),
        ));
    }
    Ok(symbols.chunks(size))
}
