//! Startup fixtures: users and accounts loaded from a JSON file.
//!
//! ```json
//! {
//!   "users": [{ "id": "usr-001", "name": "Ada" }],
//!   "accounts": [{ "account_id": "acc_001", "balance": 19.33 }]
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;

use payments_types::{Account, User};

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedAccount {
    pub account_id: String,
    pub balance: Decimal,
}

/// Users and accounts to insert before serving traffic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
}

impl Seed {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid seed document")
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn users(&self) -> impl Iterator<Item = User> + '_ {
        self.users.iter().map(|u| User::new(u.id.as_str(), u.name.as_str()))
    }

    pub fn accounts(&self) -> impl Iterator<Item = Account> + '_ {
        self.accounts
            .iter()
            .map(|a| Account::new(a.account_id.as_str(), a.balance))
    }
}
