//! # Payments Client SDK
//!
//! A typed Rust client for the consumer payments API.

use payments_types::{PaymentLookupReport, PaymentRequest};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Payments API client.
pub struct PaymentsClient {
    base_url: String,
    http: Client,
}

impl PaymentsClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is up.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self.http.get(format!("{}/", self.base_url)).send().await?;
        Ok(resp.status().is_success())
    }

    /// Credits an account. The server answers with an empty body.
    pub async fn credit(&self, request: &PaymentRequest) -> Result<(), ClientError> {
        self.post_empty("/payments/credit", request).await
    }

    /// Debits an account. The server answers with an empty body.
    pub async fn debit(&self, request: &PaymentRequest) -> Result<(), ClientError> {
        self.post_empty("/payments/debit", request).await
    }

    /// Compares the server's ledger with the provider for a reference.
    pub async fn lookup(&self, reference: &str) -> Result<PaymentLookupReport, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("payments")
            .push(reference);
        self.get(url).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let resp = self.http.get(url).send().await?;
        let body = Self::check_status(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_empty<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    /// Returns the body of a 2xx response. Error responses carry no body,
    /// so the message falls back to the status reason.
    async fn check_status(resp: reqwest::Response) -> Result<String, ClientError> {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if status.is_success() {
            return Ok(body);
        }
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            body
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
