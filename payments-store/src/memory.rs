//! In-memory store adapter.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use payments_types::{
    Account, AccountId, StoreError, StoreGateway, Transaction, TransactionLedger, User, UserId,
};

/// A thread-safe in-memory store of users, accounts and transactions.
///
/// Clones share the same data, so a clone handed to a service and one kept
/// by a test observe the same state. Balances follow the same
/// last-write-wins rule as the persistent adapters.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    users: Arc<DashMap<UserId, User>>,
    accounts: Arc<DashMap<AccountId, Account>>,
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    /// Inserts or replaces an account.
    pub fn insert_account(&self, account: Account) {
        self.accounts.insert(account.account_id.clone(), account);
    }

    /// Current state of an account, if present.
    pub fn account(&self, id: &AccountId) -> Option<Account> {
        self.accounts.get(id).map(|entry| entry.value().clone())
    }

    /// Every recorded transaction, in insertion order.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.transactions.read().await.clone()
    }
}

#[async_trait]
impl StoreGateway for InMemoryStore {
    async fn get_user_by_id(&self, id: &UserId) -> Result<User, StoreError> {
        self.users
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound {
                entity: "user",
                id: id.to_string(),
            })
    }

    async fn get_account_by_id(&self, id: &AccountId) -> Result<Account, StoreError> {
        self.account(id).ok_or_else(|| StoreError::NotFound {
            entity: "account",
            id: id.to_string(),
        })
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        self.transactions.write().await.push(transaction.clone());
        Ok(())
    }

    async fn update_account_balance(
        &self,
        id: &AccountId,
        new_balance: Decimal,
    ) -> Result<(), StoreError> {
        let mut account = self.accounts.get_mut(id).ok_or_else(|| StoreError::NotFound {
            entity: "account",
            id: id.to_string(),
        })?;
        account.balance = new_balance;
        Ok(())
    }
}

#[async_trait]
impl TransactionLedger for InMemoryStore {
    async fn find_transactions_by_reference(
        &self,
        reference: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .filter(|tx| tx.reference == reference)
            .cloned()
            .collect())
    }
}
