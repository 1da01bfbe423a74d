//! HTTP client for the receipt extraction service.
//!
//! Configuration comes from environment variables:
//! `BILLSPLIT_EXTRACTION_URL` (endpoint) and
//! `BILLSPLIT_EXTRACTION_API_KEY` (required secret key).

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use billsplit_core::error::{BillsplitError, Result};
use billsplit_core::receipt::Receipt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable naming the extraction service endpoint.
pub const URL_ENV: &str = "BILLSPLIT_EXTRACTION_URL";
/// Environment variable holding the extraction service secret key.
pub const API_KEY_ENV: &str = "BILLSPLIT_EXTRACTION_API_KEY";

/// Turns photographed-receipt bytes into a structured receipt.
///
/// Behind a trait so the application layer can run against a mock in
/// tests. The real implementation is [`ExtractionClient`].
#[async_trait]
pub trait ReceiptExtractor: Send + Sync {
    /// Extracts a structured receipt from JPEG image bytes.
    ///
    /// # Errors
    ///
    /// Returns an `Extraction` error for request, service, or parse
    /// failures, and a `Validation` error when the service's payload is
    /// not a usable receipt. Failures are retried only by explicit user
    /// action, never automatically.
    async fn extract(&self, jpeg_bytes: &[u8]) -> Result<Receipt>;
}

/// Client for the receipt extraction HTTP service.
///
/// Request: `{"receipt": "<base64 JPEG>"}` with the secret key header.
/// Success: 2xx with `{"receipt": {...}}`. Failure: non-2xx with
/// `{"error": "..."}`.
#[derive(Clone)]
pub struct ExtractionClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ExtractionClient {
    /// Creates a client for the given endpoint and secret key.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Builds a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when either variable is missing.
    pub fn try_from_env() -> Result<Self> {
        let endpoint = env::var(URL_ENV)
            .map_err(|_| BillsplitError::config(format!("{URL_ENV} not set")))?;
        let api_key = env::var(API_KEY_ENV)
            .map_err(|_| BillsplitError::config(format!("{API_KEY_ENV} not set")))?;
        Ok(Self::new(endpoint, api_key))
    }

    async fn send_request(&self, body: &ExtractRequest) -> Result<Receipt> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                BillsplitError::extraction(format!("Extraction request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<ErrorResponse>().await {
                Ok(parsed) => parsed.error,
                Err(_) => format!("service returned status {status}"),
            };
            return Err(BillsplitError::extraction(format!(
                "Extraction service error: {message}"
            )));
        }

        let parsed: ExtractResponse = response.json().await.map_err(|err| {
            BillsplitError::extraction(format!("Extraction response parse failed: {err}"))
        })?;

        parsed.receipt.validate()?;
        Ok(parsed.receipt)
    }
}

#[async_trait]
impl ReceiptExtractor for ExtractionClient {
    async fn extract(&self, jpeg_bytes: &[u8]) -> Result<Receipt> {
        if jpeg_bytes.is_empty() {
            return Err(BillsplitError::validation("No receipt image provided"));
        }

        let request = ExtractRequest {
            receipt: BASE64_STANDARD.encode(jpeg_bytes),
        };

        tracing::debug!(bytes = jpeg_bytes.len(), "sending extraction request");
        let receipt = self.send_request(&request).await?;
        tracing::info!(
            restaurant = %receipt.restaurant,
            items = receipt.items.len(),
            "extracted receipt"
        );

        Ok(receipt)
    }
}

#[derive(Serialize)]
struct ExtractRequest {
    receipt: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    receipt: Receipt,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_encodes_image_as_base64() {
        let request = ExtractRequest {
            receipt: BASE64_STANDARD.encode(b"jpeg-bytes"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["receipt"], BASE64_STANDARD.encode(b"jpeg-bytes"));
    }

    #[test]
    fn test_success_response_shape() {
        let json = r#"{
            "receipt": {
                "restaurant": "Cafe",
                "subtotal": 10.0,
                "tax": 1.0,
                "tip": 0.0,
                "total": 11.0,
                "items": [{"id": 1, "name": "Coffee", "price": 10.0}]
            }
        }"#;
        let parsed: ExtractResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.receipt.restaurant, "Cafe");
        assert!(parsed.receipt.validate().is_ok());
    }

    #[test]
    fn test_error_response_shape() {
        let parsed: ErrorResponse =
            serde_json::from_str(r#"{"error": "No receipt provided"}"#).unwrap();
        assert_eq!(parsed.error, "No receipt provided");
    }

    #[test]
    fn test_response_without_items_fails_validation() {
        let json = r#"{
            "receipt": {
                "restaurant": "Cafe",
                "subtotal": 0.0,
                "tax": 0.0,
                "tip": 0.0,
                "total": 0.0,
                "items": []
            }
        }"#;
        let parsed: ExtractResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.receipt.validate().is_err());
    }

    #[tokio::test]
    async fn test_empty_image_rejected_before_request() {
        let client = ExtractionClient::new("http://localhost:0", "test-key");
        let err = client.extract(&[]).await.unwrap_err();
        assert!(err.is_validation());
    }
}
