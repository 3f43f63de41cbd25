//! Data Transfer Objects (DTOs) for requests and responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccountId, Transaction, UserId};
use crate::error::PaymentError;

// ─────────────────────────────────────────────────────────────────────────────
// Inbound payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /payments/credit` and `POST /payments/debit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentRequest {
    #[schema(value_type = String, example = "usr-001")]
    pub user_id: UserId,
    #[schema(value_type = String, example = "acc_001")]
    pub account_id: AccountId,
    /// External payment reference forwarded to the provider
    #[schema(example = "ref-001")]
    pub reference: String,
    #[schema(value_type = f64, example = 10.0)]
    pub amount: Decimal,
}

impl PaymentRequest {
    /// Decodes a raw request body. Any decoding failure is a bad request.
    pub fn from_json(body: &[u8]) -> Result<Self, PaymentError> {
        serde_json::from_slice(body)
            .map_err(|e| PaymentError::BadRequest(format!("Malformed payment payload: {e}")))
    }

    /// Checks the fields a well-formed payload still needs to be usable.
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.user_id.is_blank() {
            return Err(PaymentError::BadRequest("user_id cannot be empty".into()));
        }
        if self.account_id.is_blank() {
            return Err(PaymentError::BadRequest("account_id cannot be empty".into()));
        }
        if self.reference.trim().is_empty() {
            return Err(PaymentError::BadRequest("reference cannot be empty".into()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(PaymentError::BadRequest("Amount must be positive".into()));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// A payment as the provider reports it.
///
/// Same shape for the deposit/withdrawal request body and for the
/// confirmation the provider echoes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProviderPayment {
    #[schema(value_type = String, example = "acc_001")]
    pub account_id: AccountId,
    #[schema(example = "ref-001")]
    pub reference: String,
    #[schema(value_type = f64, example = 10.0)]
    pub amount: Decimal,
}

// ─────────────────────────────────────────────────────────────────────────────
// Reconciliation DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// How the local ledger and the provider agree on a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationState {
    /// One local record matching the provider's account and amount
    Consistent,
    /// One local record whose account or amount differs from the provider's
    Mismatched,
    /// More than one local record carries this reference
    Duplicated,
    /// The provider moved money but nothing was recorded locally
    MissingLocally,
    /// Recorded locally but unknown to the provider
    MissingAtProvider,
    /// Neither side knows the reference
    Unknown,
}

impl ReconciliationState {
    pub fn classify(local: &[Transaction], provider: Option<&ProviderPayment>) -> Self {
        match (local, provider) {
            ([], None) => ReconciliationState::Unknown,
            ([], Some(_)) => ReconciliationState::MissingLocally,
            (_, None) => ReconciliationState::MissingAtProvider,
            ([record], Some(remote)) => {
                if record.account_id == remote.account_id && record.amount == remote.amount {
                    ReconciliationState::Consistent
                } else {
                    ReconciliationState::Mismatched
                }
            }
            (_, Some(_)) => ReconciliationState::Duplicated,
        }
    }
}

/// Response of `GET /payments/{reference}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentLookupReport {
    #[schema(example = "ref-001")]
    pub reference: String,
    pub state: ReconciliationState,
    /// Local transaction records carrying the reference
    pub local: Vec<Transaction>,
    /// The provider's record, if it has one
    pub provider: Option<ProviderPayment>,
}
