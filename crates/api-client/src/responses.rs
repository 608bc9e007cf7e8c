use crate::error::ApiError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// The body of a batch request: one entry per symbol, each holding one
/// member per requested dataset, e.g. `{"AAPL": {"stats": {...}, "price": 189.3}}`.
pub type BatchPayload = Map<String, Value>;

/// A raw response as received from the service.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decodes the body. Non-2xx responses are turned into `ApiError::HttpStatus`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(ApiError::HttpStatus {
                status: self.status,
                body: self.body.clone(),
            });
        }
        serde_json::from_str::<T>(&self.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Sector;

    #[test]
    fn json_decodes_successful_body() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: r#"[{"name":"Electronic Technology"},{"name":"Finance"}]"#.to_string(),
        };

        let sectors: Vec<Sector> = response.json().unwrap();
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[1].name, "Finance");
    }

    #[test]
    fn json_reports_status_before_parsing() {
        let response = ApiResponse {
            status: StatusCode::FORBIDDEN,
            body: "The API key provided is not valid.".to_string(),
        };

        let err = response.json::<BatchPayload>().unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status, .. } if status == StatusCode::FORBIDDEN));
    }

    #[test]
    fn json_reports_malformed_body() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: "not json".to_string(),
        };

        let err = response.json::<BatchPayload>().unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
