//! PaymentService and ReconciliationService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tokio::sync::Barrier;

    use payments_store::InMemoryStore;
    use payments_types::{
        Account, AccountId, ErrorKind, PaymentError, PaymentGateway, PaymentLookup,
        PaymentRequest, ProviderError, ProviderPayment, ReconciliationState, StatusPolicy,
        StoreError, StoreGateway, Transaction, TransactionLedger, TransactionType, User, UserId,
    };

    use crate::{PaymentService, ReconciliationService, ServiceSettings};

    /// Port calls in the order they happened.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Step {
        GetUser,
        GetAccount,
        CreateTransaction,
        UpdateBalance,
        Deposit,
        Withdraw,
    }

    #[derive(Clone, Default)]
    pub struct CallLog(Arc<Mutex<Vec<Step>>>);

    impl CallLog {
        fn push(&self, step: Step) {
            self.0.lock().unwrap().push(step);
        }

        pub fn steps(&self) -> Vec<Step> {
            self.0.lock().unwrap().clone()
        }
    }

    /// Store wrapper that records calls and can fail a chosen step.
    #[derive(Clone)]
    pub struct RecordingStore {
        inner: InMemoryStore,
        log: CallLog,
        fail_on: Option<Step>,
        account_barrier: Option<Arc<Barrier>>,
    }

    impl RecordingStore {
        pub fn new(inner: InMemoryStore, log: CallLog) -> Self {
            Self {
                inner,
                log,
                fail_on: None,
                account_barrier: None,
            }
        }

        pub fn failing(mut self, step: Step) -> Self {
            self.fail_on = Some(step);
            self
        }

        /// Holds every account read until `barrier` is released.
        pub fn pausing_after_account_read(mut self, barrier: Arc<Barrier>) -> Self {
            self.account_barrier = Some(barrier);
            self
        }

        fn record(&self, step: Step) -> Result<(), StoreError> {
            self.log.push(step);
            if self.fail_on == Some(step) {
                return Err(StoreError::Database("connection reset".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl StoreGateway for RecordingStore {
        async fn get_user_by_id(&self, id: &UserId) -> Result<User, StoreError> {
            self.record(Step::GetUser)?;
            self.inner.get_user_by_id(id).await
        }

        async fn get_account_by_id(&self, id: &AccountId) -> Result<Account, StoreError> {
            self.record(Step::GetAccount)?;
            let account = self.inner.get_account_by_id(id).await;
            if let Some(barrier) = &self.account_barrier {
                barrier.wait().await;
            }
            account
        }

        async fn create_transaction(&self, transaction: &Transaction) -> Result<(), StoreError> {
            self.record(Step::CreateTransaction)?;
            self.inner.create_transaction(transaction).await
        }

        async fn update_account_balance(
            &self,
            id: &AccountId,
            new_balance: Decimal,
        ) -> Result<(), StoreError> {
            self.record(Step::UpdateBalance)?;
            self.inner.update_account_balance(id, new_balance).await
        }
    }

    #[async_trait]
    impl TransactionLedger for RecordingStore {
        async fn find_transactions_by_reference(
            &self,
            reference: &str,
        ) -> Result<Vec<Transaction>, StoreError> {
            self.inner.find_transactions_by_reference(reference).await
        }
    }

    /// Provider fake: echoes the request unless told otherwise and
    /// remembers every payment it performed.
    #[derive(Clone)]
    pub struct RecordingProvider {
        log: CallLog,
        fail: bool,
        echo_amount: Option<Decimal>,
        echo_reference: Option<String>,
        performed: Arc<Mutex<HashMap<String, ProviderPayment>>>,
    }

    impl RecordingProvider {
        pub fn new(log: CallLog) -> Self {
            Self {
                log,
                fail: false,
                echo_amount: None,
                echo_reference: None,
                performed: Arc::default(),
            }
        }

        pub fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        pub fn echoing_amount(mut self, amount: Decimal) -> Self {
            self.echo_amount = Some(amount);
            self
        }

        pub fn echoing_reference(mut self, reference: &str) -> Self {
            self.echo_reference = Some(reference.to_string());
            self
        }

        pub fn remember(&self, payment: ProviderPayment) {
            self.performed
                .lock()
                .unwrap()
                .insert(payment.reference.clone(), payment);
        }

        fn perform(
            &self,
            step: Step,
            account_id: &AccountId,
            reference: &str,
            amount: Decimal,
        ) -> Result<ProviderPayment, ProviderError> {
            self.log.push(step);
            if self.fail {
                return Err(ProviderError::Rejected {
                    operation: "deposit",
                    status: 500,
                    body: "transaction failed".into(),
                });
            }
            let echo = ProviderPayment {
                account_id: account_id.clone(),
                reference: self
                    .echo_reference
                    .clone()
                    .unwrap_or_else(|| reference.to_string()),
                amount: self.echo_amount.unwrap_or(amount),
            };
            self.remember(echo.clone());
            Ok(echo)
        }
    }

    #[async_trait]
    impl PaymentGateway for RecordingProvider {
        async fn deposit(
            &self,
            account_id: &AccountId,
            reference: &str,
            amount: Decimal,
        ) -> Result<ProviderPayment, ProviderError> {
            self.perform(Step::Deposit, account_id, reference, amount)
        }

        async fn withdraw(
            &self,
            account_id: &AccountId,
            reference: &str,
            amount: Decimal,
        ) -> Result<ProviderPayment, ProviderError> {
            self.perform(Step::Withdraw, account_id, reference, amount)
        }
    }

    #[async_trait]
    impl PaymentLookup for RecordingProvider {
        async fn retrieve(
            &self,
            reference: &str,
        ) -> Result<Option<ProviderPayment>, ProviderError> {
            Ok(self.performed.lock().unwrap().get(reference).cloned())
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fixtures
    // ─────────────────────────────────────────────────────────────────────

    struct Harness {
        service: PaymentService<RecordingStore, RecordingProvider>,
        reconciliation: ReconciliationService<RecordingStore, RecordingProvider>,
        data: InMemoryStore,
        provider: RecordingProvider,
        log: CallLog,
    }

    impl Harness {
        fn balance(&self) -> Decimal {
            self.data
                .account(&AccountId::new("acc_001"))
                .map(|a| a.balance)
                .unwrap_or_default()
        }
    }

    fn seeded_store(balance: Decimal) -> InMemoryStore {
        let data = InMemoryStore::new();
        data.insert_user(User::new("usr-001", "Ada"));
        data.insert_account(Account::new("acc_001", balance));
        data
    }

    fn harness_with(
        balance: Decimal,
        store: impl FnOnce(RecordingStore) -> RecordingStore,
        provider: impl FnOnce(RecordingProvider) -> RecordingProvider,
    ) -> Harness {
        let data = seeded_store(balance);
        let log = CallLog::default();
        let store = store(RecordingStore::new(data.clone(), log.clone()));
        let provider = provider(RecordingProvider::new(log.clone()));
        Harness {
            service: PaymentService::new(
                store.clone(),
                provider.clone(),
                ServiceSettings::default(),
            ),
            reconciliation: ReconciliationService::new(store, provider.clone()),
            data,
            provider,
            log,
        }
    }

    fn harness(balance: Decimal) -> Harness {
        harness_with(balance, |s| s, |p| p)
    }

    fn request(reference: &str, amount: Decimal) -> PaymentRequest {
        PaymentRequest {
            user_id: UserId::new("usr-001"),
            account_id: AccountId::new("acc_001"),
            reference: reference.to_string(),
            amount,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Credit
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_credit_settles_and_updates_balance() {
        let h = harness(dec!(1));

        let tx = h.service.credit(request("ref-001", dec!(10))).await.unwrap();

        assert_eq!(tx.transaction_type, TransactionType::Credit);
        assert_eq!(tx.reference, "ref-001");
        assert_eq!(tx.amount, dec!(10));
        assert_eq!(h.balance(), dec!(11));
        assert_eq!(
            h.log.steps(),
            vec![
                Step::GetUser,
                Step::GetAccount,
                Step::Deposit,
                Step::CreateTransaction,
                Step::UpdateBalance,
            ]
        );
        assert_eq!(h.data.transactions().await, vec![tx]);
    }

    #[tokio::test]
    async fn test_invalid_request_touches_nothing() {
        let h = harness(dec!(1));

        let err = h.service.credit(request("ref-001", dec!(0))).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(h.log.steps().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_stops_before_account_lookup() {
        let h = harness(dec!(1));
        let mut req = request("ref-001", dec!(10));
        req.user_id = UserId::new("usr-404");

        let err = h.service.credit(req).await.unwrap_err();

        assert!(matches!(err, PaymentError::UserLookup { .. }));
        assert_eq!(h.log.steps(), vec![Step::GetUser]);
        assert_eq!(h.balance(), dec!(1));
    }

    #[tokio::test]
    async fn test_unknown_account_stops_before_provider() {
        let h = harness(dec!(1));
        let mut req = request("ref-001", dec!(10));
        req.account_id = AccountId::new("acc_404");

        let err = h.service.credit(req).await.unwrap_err();

        assert!(matches!(err, PaymentError::AccountLookup { .. }));
        assert_eq!(h.log.steps(), vec![Step::GetUser, Step::GetAccount]);
    }

    #[tokio::test]
    async fn test_user_store_failure_is_upstream_failure() {
        let h = harness_with(dec!(1), |s| s.failing(Step::GetUser), |p| p);

        let err = h.service.credit(request("ref-001", dec!(10))).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert_eq!(h.log.steps(), vec![Step::GetUser]);
    }

    #[tokio::test]
    async fn test_provider_failure_records_nothing() {
        let h = harness_with(dec!(1), |s| s, |p| p.failing());

        let err = h.service.credit(request("ref-001", dec!(10))).await.unwrap_err();

        assert!(matches!(err, PaymentError::Provider(_)));
        assert_eq!(
            h.log.steps(),
            vec![Step::GetUser, Step::GetAccount, Step::Deposit]
        );
        assert!(h.data.transactions().await.is_empty());
        assert_eq!(h.balance(), dec!(1));
    }

    #[tokio::test]
    async fn test_credit_record_failure_skips_balance_update() {
        let h = harness_with(dec!(1), |s| s.failing(Step::CreateTransaction), |p| p);

        let err = h.service.credit(request("ref-001", dec!(10))).await.unwrap_err();

        assert!(matches!(err, PaymentError::RecordTransaction { .. }));
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(StatusPolicy::Legacy.status_code(&err), 404);
        assert!(!h.log.steps().contains(&Step::UpdateBalance));
        assert_eq!(h.balance(), dec!(1));
    }

    #[tokio::test]
    async fn test_replayed_credit_is_applied_twice() {
        let h = harness(dec!(1));

        h.service.credit(request("ref-001", dec!(10))).await.unwrap();
        h.service.credit(request("ref-001", dec!(10))).await.unwrap();

        assert_eq!(h.balance(), dec!(21));
        let recorded = h.data.transactions().await;
        assert_eq!(recorded.len(), 2);
        assert_ne!(recorded[0].id, recorded[1].id);
    }

    #[tokio::test]
    async fn test_record_uses_echo_but_balance_uses_request() {
        let h = harness_with(dec!(1), |s| s, |p| p.echoing_amount(dec!(9)));

        let tx = h.service.credit(request("ref-001", dec!(10))).await.unwrap();

        assert_eq!(tx.amount, dec!(9));
        assert_eq!(h.balance(), dec!(11));
    }

    #[tokio::test]
    async fn test_record_uses_echoed_reference() {
        let h = harness_with(dec!(1), |s| s, |p| p.echoing_reference("ref-echo"));

        let tx = h.service.credit(request("ref-001", dec!(10))).await.unwrap();

        assert_eq!(tx.reference, "ref-echo");
        assert_eq!(h.balance(), dec!(11));
    }

    #[tokio::test]
    async fn test_credit_overflow_records_nothing() {
        let h = harness(Decimal::MAX);

        let err = h.service.credit(request("ref-001", dec!(1))).await.unwrap_err();

        assert!(matches!(
            err,
            PaymentError::BalanceOverflow {
                direction: TransactionType::Credit,
                ..
            }
        ));
        assert_eq!(StatusPolicy::Legacy.status_code(&err), 404);
        assert!(h.log.steps().contains(&Step::Deposit));
        assert!(!h.log.steps().contains(&Step::CreateTransaction));
        assert!(!h.log.steps().contains(&Step::UpdateBalance));
        assert!(h.data.transactions().await.is_empty());
        assert_eq!(h.balance(), Decimal::MAX);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Debit
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_debit_settles_and_updates_balance() {
        let h = harness(dec!(19.33));

        let tx = h.service.debit(request("ref-002", dec!(0.33))).await.unwrap();

        assert_eq!(tx.transaction_type, TransactionType::Debit);
        assert_eq!(h.balance(), dec!(19.00));
        assert!(h.log.steps().contains(&Step::Withdraw));
    }

    #[tokio::test]
    async fn test_debit_of_whole_balance_is_allowed() {
        let h = harness(dec!(5));

        h.service.debit(request("ref-002", dec!(5))).await.unwrap();

        assert_eq!(h.balance(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_insufficient_funds_never_reaches_provider() {
        let h = harness(dec!(0.50));

        let err = h.service.debit(request("ref-002", dec!(1.50))).await.unwrap_err();

        match err {
            PaymentError::InsufficientFunds {
                available,
                requested,
            } => {
                assert_eq!(available, dec!(0.50));
                assert_eq!(requested, dec!(1.50));
            }
            other => panic!("expected InsufficientFunds, got {:?}", other),
        }
        assert_eq!(h.log.steps(), vec![Step::GetUser, Step::GetAccount]);
        assert_eq!(h.balance(), dec!(0.50));
    }

    #[tokio::test]
    async fn test_debit_balance_failure_leaves_orphaned_record() {
        let h = harness_with(dec!(10), |s| s.failing(Step::UpdateBalance), |p| p);

        let err = h.service.debit(request("ref-002", dec!(4))).await.unwrap_err();

        assert!(matches!(err, PaymentError::UpdateBalance { .. }));
        assert_eq!(StatusPolicy::Legacy.status_code(&err), 500);
        assert_eq!(h.data.transactions().await.len(), 1);
        assert_eq!(h.balance(), dec!(10));
    }

    #[tokio::test]
    async fn test_concurrent_debits_lose_an_update() {
        let barrier = Arc::new(Barrier::new(2));
        let h = harness_with(
            dec!(10),
            |s| s.pausing_after_account_read(barrier.clone()),
            |p| p,
        );

        let (first, second) = tokio::join!(
            h.service.debit(request("ref-a", dec!(6))),
            h.service.debit(request("ref-b", dec!(6))),
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        // Both checks saw 10; each wrote 10 - 6.
        assert_eq!(h.balance(), dec!(4));
        assert_eq!(h.data.transactions().await.len(), 2);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_lookup_after_settlement_is_consistent() {
        let h = harness(dec!(1));
        h.service.credit(request("ref-001", dec!(10))).await.unwrap();

        let report = h.reconciliation.lookup("ref-001").await.unwrap();

        assert_eq!(report.state, ReconciliationState::Consistent);
        assert_eq!(report.local.len(), 1);
        assert!(report.provider.is_some());
    }

    #[tokio::test]
    async fn test_lookup_reports_unrecorded_provider_payment() {
        let h = harness_with(dec!(1), |s| s.failing(Step::CreateTransaction), |p| p);
        let _ = h.service.credit(request("ref-001", dec!(10))).await;

        let report = h.reconciliation.lookup("ref-001").await.unwrap();

        assert_eq!(report.state, ReconciliationState::MissingLocally);
        assert!(report.local.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_reports_replays_as_duplicated() {
        let h = harness(dec!(1));
        h.service.credit(request("ref-001", dec!(10))).await.unwrap();
        h.service.credit(request("ref-001", dec!(10))).await.unwrap();

        let report = h.reconciliation.lookup("ref-001").await.unwrap();

        assert_eq!(report.state, ReconciliationState::Duplicated);
    }

    #[tokio::test]
    async fn test_lookup_reports_record_unknown_to_provider() {
        let h = harness(dec!(1));
        let orphan = Transaction::confirmed(
            TransactionType::Credit,
            UserId::new("usr-001"),
            ProviderPayment {
                account_id: AccountId::new("acc_001"),
                reference: "ref-local".into(),
                amount: dec!(3),
            },
        );
        h.data.create_transaction(&orphan).await.unwrap();

        let report = h.reconciliation.lookup("ref-local").await.unwrap();

        assert_eq!(report.state, ReconciliationState::MissingAtProvider);
    }

    #[tokio::test]
    async fn test_lookup_reports_amount_mismatch() {
        let h = harness(dec!(1));
        h.service.credit(request("ref-001", dec!(10))).await.unwrap();
        h.provider.remember(ProviderPayment {
            account_id: AccountId::new("acc_001"),
            reference: "ref-001".into(),
            amount: dec!(12),
        });

        let report = h.reconciliation.lookup("ref-001").await.unwrap();

        assert_eq!(report.state, ReconciliationState::Mismatched);
    }

    #[tokio::test]
    async fn test_lookup_of_unknown_reference() {
        let h = harness(dec!(1));

        let report = h.reconciliation.lookup("ref-none").await.unwrap();

        assert_eq!(report.state, ReconciliationState::Unknown);
    }

    #[tokio::test]
    async fn test_lookup_rejects_blank_reference() {
        let h = harness(dec!(1));

        let err = h.reconciliation.lookup("  ").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }
}
