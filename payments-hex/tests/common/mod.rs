//! Shared fixtures for the HTTP route tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use payments_hex::{PaymentService, ReconciliationService, ServiceSettings, inbound::HttpServer};
use payments_store::InMemoryStore;
use payments_types::{
    Account, AccountId, PaymentGateway, PaymentLookup, ProviderError, ProviderPayment,
    StatusPolicy, StoreError, StoreGateway, Transaction, TransactionLedger, User, UserId,
};

/// In-memory store whose transaction writes or balance updates can be made
/// to fail.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    pub fail_writes: bool,
    pub fail_balance_updates: bool,
}

#[async_trait]
impl StoreGateway for FlakyStore {
    async fn get_user_by_id(&self, id: &UserId) -> Result<User, StoreError> {
        self.inner.get_user_by_id(id).await
    }

    async fn get_account_by_id(&self, id: &AccountId) -> Result<Account, StoreError> {
        self.inner.get_account_by_id(id).await
    }

    async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Database("write timed out".into()));
        }
        self.inner.create_transaction(transaction).await
    }

    async fn update_account_balance(
        &self,
        id: &AccountId,
        new_balance: Decimal,
    ) -> Result<(), StoreError> {
        if self.fail_balance_updates {
            return Err(StoreError::NotFound {
                entity: "account",
                id: id.to_string(),
            });
        }
        self.inner.update_account_balance(id, new_balance).await
    }
}

#[async_trait]
impl TransactionLedger for FlakyStore {
    async fn find_transactions_by_reference(
        &self,
        reference: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        self.inner.find_transactions_by_reference(reference).await
    }
}

/// Provider fake that echoes requests and counts calls.
#[derive(Clone, Default)]
pub struct FakeProvider {
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
    pub performed: Arc<Mutex<HashMap<String, ProviderPayment>>>,
}

impl FakeProvider {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn perform(
        &self,
        account_id: &AccountId,
        reference: &str,
        amount: Decimal,
    ) -> Result<ProviderPayment, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Transport("connection refused".into()));
        }
        let echo = ProviderPayment {
            account_id: account_id.clone(),
            reference: reference.to_string(),
            amount,
        };
        self.performed
            .lock()
            .unwrap()
            .insert(reference.to_string(), echo.clone());
        Ok(echo)
    }
}

#[async_trait]
impl PaymentGateway for FakeProvider {
    async fn deposit(
        &self,
        account_id: &AccountId,
        reference: &str,
        amount: Decimal,
    ) -> Result<ProviderPayment, ProviderError> {
        self.perform(account_id, reference, amount)
    }

    async fn withdraw(
        &self,
        account_id: &AccountId,
        reference: &str,
        amount: Decimal,
    ) -> Result<ProviderPayment, ProviderError> {
        self.perform(account_id, reference, amount)
    }
}

#[async_trait]
impl PaymentLookup for FakeProvider {
    async fn retrieve(&self, reference: &str) -> Result<Option<ProviderPayment>, ProviderError> {
        Ok(self.performed.lock().unwrap().get(reference).cloned())
    }
}

/// Test server seeded with `usr-001` and `acc_001` (balance 1).
pub struct TestApp {
    pub server: HttpServer<FlakyStore, FakeProvider>,
    pub store: InMemoryStore,
    pub provider: FakeProvider,
}

impl TestApp {
    pub fn balance(&self) -> Decimal {
        self.store
            .account(&AccountId::new("acc_001"))
            .map(|a| a.balance)
            .unwrap_or_default()
    }
}

pub fn test_app(policy: StatusPolicy, fail_writes: bool, provider: FakeProvider) -> TestApp {
    let store = FlakyStore {
        fail_writes,
        ..FlakyStore::default()
    };
    test_app_with_store(policy, store, provider)
}

pub fn test_app_with_store(
    policy: StatusPolicy,
    store: FlakyStore,
    provider: FakeProvider,
) -> TestApp {
    let inner = store.inner.clone();
    inner.insert_user(User::new("usr-001", "Ada"));
    inner.insert_account(Account::new("acc_001", dec!(1)));

    let settings = ServiceSettings {
        status_policy: policy,
    };
    let payments = PaymentService::new(store.clone(), provider.clone(), settings);
    let reconciliation = ReconciliationService::new(store, provider.clone());

    TestApp {
        server: HttpServer::new(payments, reconciliation),
        store: inner,
        provider,
    }
}

pub fn default_app() -> TestApp {
    test_app(StatusPolicy::Legacy, false, FakeProvider::default())
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub const CREDIT_BODY: &str =
    r#"{"user_id":"usr-001","account_id":"acc_001","reference":"ref-001","amount":10}"#;
