//! Database row types for the SQLite adapter.
//!
//! Identifiers, amounts and timestamps are stored as TEXT; conversion back
//! into domain types happens in `into_domain`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use payments_types::{
    Account, AccountId, StoreError, Transaction, TransactionId, TransactionStatus,
    TransactionType, User, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs
// ─────────────────────────────────────────────────────────────────────────────

/// User row from database.
#[derive(FromRow)]
pub struct DbUser {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// Account row from database.
#[derive(FromRow)]
pub struct DbAccount {
    pub account_id: String,
    pub balance: String,
    pub created_at: String,
}

/// Transaction row from database.
#[derive(FromRow)]
pub struct DbTransaction {
    pub id: String,
    pub reference: String,
    pub user_id: String,
    pub account_id: String,
    pub amount: String,
    #[sqlx(rename = "type")]
    pub transaction_type: String,
    pub status: String,
    pub created_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_decimal(column: &str, s: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(s).map_err(|e| StoreError::Corrupt(format!("{column} '{s}': {e}")))
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("created_at '{s}': {e}")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

impl DbUser {
    pub fn into_domain(self) -> Result<User, StoreError> {
        let created_at = parse_timestamp(&self.created_at)?;
        Ok(User::from_parts(UserId::new(self.id), self.name, created_at))
    }
}

impl DbAccount {
    pub fn into_domain(self) -> Result<Account, StoreError> {
        let balance = parse_decimal("balance", &self.balance)?;
        let created_at = parse_timestamp(&self.created_at)?;
        Ok(Account::from_parts(
            AccountId::new(self.account_id),
            balance,
            created_at,
        ))
    }
}

impl DbTransaction {
    /// Convert database row to domain Transaction.
    pub fn into_domain(self) -> Result<Transaction, StoreError> {
        let id = TransactionId::from_str(&self.id)
            .map_err(|e| StoreError::Corrupt(format!("transaction id '{}': {e}", self.id)))?;
        let amount = parse_decimal("amount", &self.amount)?;
        let transaction_type =
            TransactionType::from_str(&self.transaction_type).map_err(StoreError::Corrupt)?;
        let status = TransactionStatus::from_str(&self.status).map_err(StoreError::Corrupt)?;
        let created_at = parse_timestamp(&self.created_at)?;

        Ok(Transaction::from_parts(
            id,
            self.reference,
            UserId::new(self.user_id),
            AccountId::new(self.account_id),
            amount,
            transaction_type,
            status,
            created_at,
        ))
    }
}
