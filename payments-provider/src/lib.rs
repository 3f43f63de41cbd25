//! # Payments Provider
//!
//! HTTP adapter for the third-party payment API. Implements the
//! `PaymentGateway` and `PaymentLookup` ports.
//!
//! The provider accepts and echoes the same JSON shape for every call:
//!
//! ```json
//! { "account_id": "acc_001", "reference": "ref-001", "amount": 10.0 }
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use rust_decimal::Decimal;

use payments_types::{AccountId, PaymentGateway, PaymentLookup, ProviderError, ProviderPayment};

/// reqwest-backed client for the payment provider.
///
/// No timeout and no retries: a hung provider call holds the request open.
#[derive(Clone)]
pub struct HttpPaymentProvider {
    base_url: String,
    http: Client,
}

impl HttpPaymentProvider {
    /// Creates a new provider client for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn submit(
        &self,
        operation: &'static str,
        payment_type: &str,
        payment: ProviderPayment,
    ) -> Result<ProviderPayment, ProviderError> {
        let url = format!("{}/payments?type={}", self.base_url, payment_type);
        let resp = self
            .http
            .post(url)
            .json(&payment)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        self.handle_response(operation, resp).await
    }

    async fn handle_response(
        &self,
        operation: &'static str,
        resp: reqwest::Response,
    ) -> Result<ProviderPayment, ProviderError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            let body = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("errorMessage")
                        .and_then(|e| e.as_str())
                        .map(String::from)
                })
                .unwrap_or(body);
            return Err(ProviderError::Rejected {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    fn lookup_url(&self, reference: &str) -> Result<Url, ProviderError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ProviderError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Transport(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .push("payments")
            .push(reference);
        Ok(url)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentProvider {
    #[tracing::instrument(skip(self, account_id), fields(account_id = %account_id))]
    async fn deposit(
        &self,
        account_id: &AccountId,
        reference: &str,
        amount: Decimal,
    ) -> Result<ProviderPayment, ProviderError> {
        let payment = ProviderPayment {
            account_id: account_id.clone(),
            reference: reference.to_string(),
            amount,
        };
        let echo = self.submit("deposit", "credit", payment).await?;
        tracing::debug!(echo_amount = %echo.amount, "Provider confirmed deposit");
        Ok(echo)
    }

    #[tracing::instrument(skip(self, account_id), fields(account_id = %account_id))]
    async fn withdraw(
        &self,
        account_id: &AccountId,
        reference: &str,
        amount: Decimal,
    ) -> Result<ProviderPayment, ProviderError> {
        let payment = ProviderPayment {
            account_id: account_id.clone(),
            reference: reference.to_string(),
            amount,
        };
        let echo = self.submit("withdrawal", "debit", payment).await?;
        tracing::debug!(echo_amount = %echo.amount, "Provider confirmed withdrawal");
        Ok(echo)
    }
}

#[async_trait]
impl PaymentLookup for HttpPaymentProvider {
    #[tracing::instrument(skip(self))]
    async fn retrieve(&self, reference: &str) -> Result<Option<ProviderPayment>, ProviderError> {
        let url = self.lookup_url(reference)?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Provider does not know the reference");
            return Ok(None);
        }
        self.handle_response("retrieval", resp).await.map(Some)
    }
}
