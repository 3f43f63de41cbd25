//! Payment Application Service
//!
//! Orchestrates the credit and debit workflows through the store and
//! provider ports. Contains NO infrastructure logic - pure orchestration.
//!
//! Each workflow is a fixed sequence of gates. The first failing gate
//! aborts the request and nothing after it runs:
//!
//! 1. validate the payload
//! 2. look up the user
//! 3. look up the account
//! 4. (debit only) check the cached balance covers the amount
//! 5. move the money at the provider
//! 6. record the transaction from the provider's echo
//! 7. overwrite the cached balance
//!
//! There is no compensation. Once step 5 succeeds the money has moved,
//! whatever happens to steps 6 and 7. Requests are not serialized per
//! account either, so two concurrent debits can both pass step 4 and the
//! later balance write wins.

use payments_types::{
    Account, PaymentError, PaymentGateway, PaymentRequest, ProviderPayment, StatusPolicy,
    StoreGateway, Transaction, TransactionType,
};

/// Immutable settings handed to the service at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceSettings {
    /// How workflow errors are reported to HTTP callers
    pub status_policy: StatusPolicy,
}

/// Application service for credit and debit payments.
///
/// Generic over the store and provider ports - adapters are injected at
/// compile time, so tests can substitute in-memory fakes.
pub struct PaymentService<S: StoreGateway, P: PaymentGateway> {
    store: S,
    provider: P,
    settings: ServiceSettings,
}

impl<S: StoreGateway, P: PaymentGateway> PaymentService<S, P> {
    /// Creates a new payment service over the given adapters.
    pub fn new(store: S, provider: P, settings: ServiceSettings) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Deposits money at the provider and records it locally.
    #[tracing::instrument(
        skip(self, request),
        fields(
            user_id = %request.user_id,
            account_id = %request.account_id,
            reference = %request.reference,
            amount = %request.amount,
        )
    )]
    pub async fn credit(&self, request: PaymentRequest) -> Result<Transaction, PaymentError> {
        request.validate()?;
        let account = self.load_account(&request).await?;

        let confirmation = self
            .provider
            .deposit(&request.account_id, &request.reference, request.amount)
            .await?;

        self.settle(TransactionType::Credit, &request, &account, confirmation)
            .await
    }

    /// Withdraws money at the provider and records it locally.
    ///
    /// The balance check reads the cached balance once; it is not held
    /// across the provider call.
    #[tracing::instrument(
        skip(self, request),
        fields(
            user_id = %request.user_id,
            account_id = %request.account_id,
            reference = %request.reference,
            amount = %request.amount,
        )
    )]
    pub async fn debit(&self, request: PaymentRequest) -> Result<Transaction, PaymentError> {
        request.validate()?;
        let account = self.load_account(&request).await?;

        if !account.has_sufficient_funds(request.amount) {
            return Err(PaymentError::InsufficientFunds {
                available: account.balance,
                requested: request.amount,
            });
        }

        let confirmation = self
            .provider
            .withdraw(&request.account_id, &request.reference, request.amount)
            .await?;

        self.settle(TransactionType::Debit, &request, &account, confirmation)
            .await
    }

    /// Gates 2 and 3: the user must exist, then the account.
    async fn load_account(&self, request: &PaymentRequest) -> Result<Account, PaymentError> {
        self.store
            .get_user_by_id(&request.user_id)
            .await
            .map_err(|source| PaymentError::UserLookup {
                user_id: request.user_id.clone(),
                source,
            })?;

        self.store
            .get_account_by_id(&request.account_id)
            .await
            .map_err(|source| PaymentError::AccountLookup {
                account_id: request.account_id.clone(),
                source,
            })
    }

    /// Records a confirmed payment and overwrites the cached balance.
    ///
    /// The record carries the provider's echo while the new balance is
    /// derived from the requested amount.
    async fn settle(
        &self,
        direction: TransactionType,
        request: &PaymentRequest,
        account: &Account,
        confirmation: ProviderPayment,
    ) -> Result<Transaction, PaymentError> {
        if confirmation.amount != request.amount
            || confirmation.account_id != request.account_id
            || confirmation.reference != request.reference
        {
            tracing::warn!(
                echoed_account_id = %confirmation.account_id,
                echoed_reference = %confirmation.reference,
                echoed_amount = %confirmation.amount,
                "Provider echo differs from the request; balance uses the requested amount"
            );
        }

        let new_balance = match direction {
            TransactionType::Credit => account.balance_after_credit(request.amount),
            TransactionType::Debit => account.balance_after_debit(request.amount),
        };
        let Some(new_balance) = new_balance else {
            tracing::error!(
                %direction,
                reference = %confirmation.reference,
                balance = %account.balance,
                amount = %request.amount,
                "Provider confirmed the payment but the new balance overflows"
            );
            return Err(PaymentError::BalanceOverflow {
                direction,
                account_id: request.account_id.clone(),
                amount: request.amount,
            });
        };

        let transaction = Transaction::confirmed(direction, request.user_id.clone(), confirmation);

        if let Err(source) = self.store.create_transaction(&transaction).await {
            tracing::error!(
                %direction,
                transaction_id = %transaction.id,
                error = %source,
                "Provider confirmed the payment but the transaction was not recorded"
            );
            return Err(PaymentError::RecordTransaction {
                direction,
                reference: transaction.reference,
                source,
            });
        }

        if let Err(source) = self
            .store
            .update_account_balance(&request.account_id, new_balance)
            .await
        {
            tracing::error!(
                %direction,
                transaction_id = %transaction.id,
                %new_balance,
                error = %source,
                "Transaction recorded but the cached balance was not updated"
            );
            return Err(PaymentError::UpdateBalance {
                direction,
                account_id: request.account_id.clone(),
                source,
            });
        }

        tracing::info!(
            %direction,
            transaction_id = %transaction.id,
            %new_balance,
            "Payment settled"
        );
        Ok(transaction)
    }
}
