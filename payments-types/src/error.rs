//! Error types for the payment service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, TransactionType, UserId};

/// Store-level errors (data access failures).
///
/// Opaque to the workflows: every variant is handled the same way at
/// the step where it occurs.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Errors raised by the payment provider adapter.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Transport(String),

    #[error("Provider rejected {operation} with httpCode: {status}, message: {body}")]
    Rejected {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid provider response: {0}")]
    Decode(String),
}

/// Coarse classification of workflow failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or invalid inbound payload
    BadRequest,
    /// User/account lookup or provider call failed
    UpstreamFailure,
    /// Debit larger than the cached balance
    InsufficientFunds,
    /// Transaction write or balance update failed after the provider confirmed
    PersistenceFailure,
}

/// Workflow errors, one variant per failing gate.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("User lookup failed for {user_id}: {source}")]
    UserLookup { user_id: UserId, source: StoreError },

    #[error("Account lookup failed for {account_id}: {source}")]
    AccountLookup {
        account_id: AccountId,
        source: StoreError,
    },

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Payment provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to record {direction} transaction {reference}: {source}")]
    RecordTransaction {
        direction: TransactionType,
        reference: String,
        source: StoreError,
    },

    #[error("Failed to update balance of {account_id} after {direction}: {source}")]
    UpdateBalance {
        direction: TransactionType,
        account_id: AccountId,
        source: StoreError,
    },

    #[error("Balance of {account_id} overflows after {direction} of {amount}")]
    BalanceOverflow {
        direction: TransactionType,
        account_id: AccountId,
        amount: Decimal,
    },

    #[error("Transaction ledger lookup failed: {0}")]
    Ledger(StoreError),
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::BadRequest(_) => ErrorKind::BadRequest,
            PaymentError::UserLookup { .. }
            | PaymentError::AccountLookup { .. }
            | PaymentError::Provider(_)
            | PaymentError::Ledger(_) => ErrorKind::UpstreamFailure,
            PaymentError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            PaymentError::RecordTransaction { .. }
            | PaymentError::UpdateBalance { .. }
            | PaymentError::BalanceOverflow { .. } => ErrorKind::PersistenceFailure,
        }
    }

    /// Direction of the workflow that failed while persisting, if any.
    pub fn direction(&self) -> Option<TransactionType> {
        match self {
            PaymentError::RecordTransaction { direction, .. }
            | PaymentError::UpdateBalance { direction, .. }
            | PaymentError::BalanceOverflow { direction, .. } => Some(*direction),
            _ => None,
        }
    }
}

/// How workflow errors are translated into HTTP status codes.
///
/// `Legacy` keeps the status codes existing callers already rely on:
/// a failed write after a credit answers 404 while the same failure after
/// a debit answers 500, and insufficient funds answers 500.
/// `Unified` answers 500 for every persistence failure and 400 for
/// insufficient funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    #[default]
    Legacy,
    Unified,
}

impl StatusPolicy {
    pub fn status_code(&self, err: &PaymentError) -> u16 {
        match (err.kind(), self) {
            (ErrorKind::BadRequest, _) => 400,
            (ErrorKind::UpstreamFailure, _) => 500,
            (ErrorKind::InsufficientFunds, StatusPolicy::Legacy) => 500,
            (ErrorKind::InsufficientFunds, StatusPolicy::Unified) => 400,
            (ErrorKind::PersistenceFailure, StatusPolicy::Legacy) => match err.direction() {
                Some(TransactionType::Credit) => 404,
                _ => 500,
            },
            (ErrorKind::PersistenceFailure, StatusPolicy::Unified) => 500,
        }
    }
}

impl std::fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusPolicy::Legacy => f.write_str("legacy"),
            StatusPolicy::Unified => f.write_str("unified"),
        }
    }
}

impl std::str::FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(StatusPolicy::Legacy),
            "unified" => Ok(StatusPolicy::Unified),
            other => Err(format!(
                "unknown status policy '{other}' (expected 'legacy' or 'unified')"
            )),
        }
    }
}
