use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("API client error: {0}")]
    Api(#[from] api_client::error::ApiError),
}
