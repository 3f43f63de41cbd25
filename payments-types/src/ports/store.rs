//! Store port traits.
//!
//! Adapters (SQLite, in-memory) implement these over a key-by-id store of
//! users, accounts and transactions.

use rust_decimal::Decimal;

use crate::domain::{Account, AccountId, Transaction, User, UserId};
use crate::error::StoreError;

/// The store operations the credit and debit workflows depend on.
///
/// Nothing here is atomic across calls: a transaction write followed by a
/// balance update are two independent operations.
#[async_trait::async_trait]
pub trait StoreGateway: Send + Sync + 'static {
    /// Gets a user by ID. A missing user is an error.
    async fn get_user_by_id(&self, id: &UserId) -> Result<User, StoreError>;

    /// Gets an account by ID. A missing account is an error.
    async fn get_account_by_id(&self, id: &AccountId) -> Result<Account, StoreError>;

    /// Appends a transaction record. References are not checked for uniqueness.
    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError>;

    /// Overwrites the cached balance of an account.
    async fn update_account_balance(
        &self,
        id: &AccountId,
        new_balance: Decimal,
    ) -> Result<(), StoreError>;
}

/// Read access to recorded transactions, used for reconciliation.
#[async_trait::async_trait]
pub trait TransactionLedger: Send + Sync + 'static {
    /// All transactions carrying `reference`, oldest first.
    async fn find_transactions_by_reference(
        &self,
        reference: &str,
    ) -> Result<Vec<Transaction>, StoreError>;
}
