//! # Payments Store
//!
//! Concrete store implementations (adapters) for the payments service.
//! Every adapter implements the `StoreGateway` and `TransactionLedger` ports.

use async_trait::async_trait;
use rust_decimal::Decimal;

use payments_types::{
    Account, AccountId, StoreError, StoreGateway, Transaction, TransactionLedger, User, UserId,
};

pub mod memory;
pub mod seed;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
mod types;


pub use memory::InMemoryStore;
pub use seed::Seed;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Store selected at startup from the configured URI.
#[derive(Clone)]
pub enum Store {
    Memory(InMemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
}

/// Build and initialize a store from a URI.
///
/// `memory://` selects the in-memory adapter; `sqlite:` URLs connect and
/// migrate a SQLite database (requires the `sqlite` feature).
///
/// ```ignore
/// let store = build_store("memory://").await?;
/// let store = build_store("sqlite://payments.db?mode=rwc").await?;
/// ```
pub async fn build_store(uri: &str) -> anyhow::Result<Store> {
    if uri.starts_with("memory://") {
        return Ok(Store::Memory(InMemoryStore::new()));
    }

    if uri.starts_with("sqlite:") {
        #[cfg(feature = "sqlite")]
        return Ok(Store::Sqlite(SqliteStore::new(uri).await?));

        #[cfg(not(feature = "sqlite"))]
        anyhow::bail!("SQLite support not compiled in; enable the `sqlite` feature");
    }

    anyhow::bail!("Unsupported store URI: {uri}")
}

impl Store {
    pub fn backend(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Store::Sqlite(_) => "sqlite",
        }
    }

    /// Inserts every user and account of the seed, replacing existing ones.
    pub async fn seed(&self, seed: &Seed) -> Result<(), StoreError> {
        for user in seed.users() {
            self.insert_user(user).await?;
        }
        for account in seed.accounts() {
            self.insert_account(account).await?;
        }
        tracing::info!(
            users = seed.users.len(),
            accounts = seed.accounts.len(),
            backend = self.backend(),
            "Seeded store"
        );
        Ok(())
    }

    pub async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        match self {
            Store::Memory(inner) => {
                inner.insert_user(user);
                Ok(())
            }
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.insert_user(&user).await,
        }
    }

    pub async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        match self {
            Store::Memory(inner) => {
                inner.insert_account(account);
                Ok(())
            }
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.insert_account(&account).await,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementations for Store (delegation)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl StoreGateway for Store {
    async fn get_user_by_id(&self, id: &UserId) -> Result<User, StoreError> {
        match self {
            Store::Memory(inner) => inner.get_user_by_id(id).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.get_user_by_id(id).await,
        }
    }

    async fn get_account_by_id(&self, id: &AccountId) -> Result<Account, StoreError> {
        match self {
            Store::Memory(inner) => inner.get_account_by_id(id).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.get_account_by_id(id).await,
        }
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        match self {
            Store::Memory(inner) => inner.create_transaction(transaction).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.create_transaction(transaction).await,
        }
    }

    async fn update_account_balance(
        &self,
        id: &AccountId,
        new_balance: Decimal,
    ) -> Result<(), StoreError> {
        match self {
            Store::Memory(inner) => inner.update_account_balance(id, new_balance).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.update_account_balance(id, new_balance).await,
        }
    }
}

#[async_trait]
impl TransactionLedger for Store {
    async fn find_transactions_by_reference(
        &self,
        reference: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        match self {
            Store::Memory(inner) => inner.find_transactions_by_reference(reference).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.find_transactions_by_reference(reference).await,
        }
    }
}
