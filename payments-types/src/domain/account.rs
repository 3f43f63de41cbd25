//! Account domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique key of an Account (e.g. `acc_001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An account holding a cached balance.
///
/// The balance is a projection of the account's transactions, maintained by
/// direct overwrite after each successful provider call. There is no version
/// field: the last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    /// Signed, may be fractional
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates an account with the given opening balance.
    pub fn new(account_id: impl Into<AccountId>, balance: Decimal) -> Self {
        Self {
            account_id: account_id.into(),
            balance,
            created_at: Utc::now(),
        }
    }

    /// Creates an account with all fields specified (for database reconstruction).
    pub fn from_parts(account_id: AccountId, balance: Decimal, created_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            balance,
            created_at,
        }
    }

    /// Checks if the account can cover a debit of `amount`.
    pub fn has_sufficient_funds(&self, amount: Decimal) -> bool {
        amount <= self.balance
    }

    /// Balance after crediting `amount`, or `None` if it overflows `Decimal`.
    pub fn balance_after_credit(&self, amount: Decimal) -> Option<Decimal> {
        self.balance.checked_add(amount)
    }

    /// Balance after debiting `amount`, or `None` on overflow. Does not check
    /// for sufficient funds.
    pub fn balance_after_debit(&self, amount: Decimal) -> Option<Decimal> {
        self.balance.checked_sub(amount)
    }
}
