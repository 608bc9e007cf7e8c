use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request inputs, e.g. an empty symbol list for a batch request.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A request kind the builder does not know how to express.
    #[error("Unsupported request kind: {0}")]
    Unsupported(String),

    #[error("Too many symbols for one batch request: {count} > {limit}")]
    TooManySymbols { count: usize, limit: usize },

    /// Network or HTTP-level failure before a response was received.
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("The API request returned status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),
}
