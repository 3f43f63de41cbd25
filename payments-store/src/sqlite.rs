//! SQLite store adapter.
#![allow(clippy::collapsible_if)]

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use payments_types::{
    Account, AccountId, StoreError, StoreGateway, Transaction, TransactionLedger, User, UserId,
};

use crate::types::{DbAccount, DbTransaction, DbUser};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Store
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite store implementation.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

impl SqliteStore {
    /// Creates a new SQLite store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        // Ensure on-disk SQLite target directory exists.
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `:memory:` opens its own database, so in-memory
        // pools are pinned to a single long-lived connection.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.create_schema().await?;
        tracing::debug!(url = %database_url, "SQLite store ready");
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema. Safe to run repeatedly.
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::raw_sql(ddl)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Inserts or replaces a user.
    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(r#"INSERT OR REPLACE INTO users (id, name, created_at) VALUES (?, ?, ?)"#)
            .bind(user.id.as_str())
            .bind(&user.name)
            .bind(user.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Inserts or replaces an account.
    pub async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO accounts (account_id, balance, created_at) VALUES (?, ?, ?)"#,
        )
        .bind(account.account_id.as_str())
        .bind(account.balance.to_string())
        .bind(account.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl StoreGateway for SqliteStore {
    async fn get_user_by_id(&self, id: &UserId) -> Result<User, StoreError> {
        let row: Option<DbUser> =
            sqlx::query_as(r#"SELECT id, name, created_at FROM users WHERE id = ?"#)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.ok_or_else(|| StoreError::NotFound {
            entity: "user",
            id: id.to_string(),
        })?
        .into_domain()
    }

    async fn get_account_by_id(&self, id: &AccountId) -> Result<Account, StoreError> {
        let row: Option<DbAccount> = sqlx::query_as(
            r#"SELECT account_id, balance, created_at FROM accounts WHERE account_id = ?"#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| StoreError::NotFound {
            entity: "account",
            id: id.to_string(),
        })?
        .into_domain()
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO transactions (id, reference, user_id, account_id, amount, type, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(transaction.id.to_string())
        .bind(&transaction.reference)
        .bind(transaction.user_id.as_str())
        .bind(transaction.account_id.as_str())
        .bind(transaction.amount.to_string())
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.status.as_str())
        .bind(transaction.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn update_account_balance(
        &self,
        id: &AccountId,
        new_balance: Decimal,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(r#"UPDATE accounts SET balance = ? WHERE account_id = ?"#)
            .bind(new_balance.to_string())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "account",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionLedger for SqliteStore {
    async fn find_transactions_by_reference(
        &self,
        reference: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows: Vec<DbTransaction> = sqlx::query_as(
            r#"SELECT id, reference, user_id, account_id, amount, type, status, created_at
               FROM transactions WHERE reference = ? ORDER BY created_at ASC, rowid ASC"#,
        )
        .bind(reference)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbTransaction::into_domain).collect()
    }
}
