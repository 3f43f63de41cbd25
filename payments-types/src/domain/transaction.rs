//! Transaction domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::AccountId;
use super::user::UserId;
use crate::dto::ProviderPayment;

/// Surrogate identifier for a Transaction.
///
/// References are not deduplicated, so the same reference may appear on
/// several records; this id is what tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Creates a new random TransactionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TransactionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money coming into the account through a provider deposit
    Credit,
    /// Money leaving the account through a provider withdrawal
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(TransactionType::Credit),
            "DEBIT" => Ok(TransactionType::Debit),
            other => Err(format!("unknown transaction type '{other}'")),
        }
    }
}

/// Outcome recorded on a transaction.
///
/// The workflows only ever write `Success`: a failure aborts before any
/// record exists. `Failed` is kept for records written by other tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(TransactionStatus::Success),
            "FAILED" => Ok(TransactionStatus::Failed),
            other => Err(format!("unknown transaction status '{other}'")),
        }
    }
}

/// A recorded money movement.
///
/// Transactions are immutable once created - they represent
/// a historical record of what the provider confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: TransactionId,
    /// External payment reference as echoed by the provider
    #[schema(example = "ref-001")]
    pub reference: String,
    #[schema(value_type = String, example = "usr-001")]
    pub user_id: UserId,
    #[schema(value_type = String, example = "acc_001")]
    pub account_id: AccountId,
    /// Positive magnitude; direction is carried by `transaction_type`
    #[schema(value_type = f64, example = 10.0)]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds the SUCCESS record for a payment the provider confirmed.
    ///
    /// Account, reference and amount come from the provider's echo, not from
    /// the inbound request.
    pub fn confirmed(
        transaction_type: TransactionType,
        user_id: UserId,
        confirmation: ProviderPayment,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            reference: confirmation.reference,
            user_id,
            account_id: confirmation.account_id,
            amount: confirmation.amount,
            transaction_type,
            status: TransactionStatus::Success,
            created_at: Utc::now(),
        }
    }

    /// Reconstructs a transaction from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: TransactionId,
        reference: String,
        user_id: UserId,
        account_id: AccountId,
        amount: Decimal,
        transaction_type: TransactionType,
        status: TransactionStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            reference,
            user_id,
            account_id,
            amount,
            transaction_type,
            status,
            created_at,
        }
    }
}
