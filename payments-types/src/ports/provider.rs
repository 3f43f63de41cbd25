//! Payment provider port traits.
//!
//! Implementations talk to the third-party payment API; tests use fakes.

use rust_decimal::Decimal;

use crate::domain::AccountId;
use crate::dto::ProviderPayment;
use crate::error::ProviderError;

/// Money movement at the external provider.
///
/// On success the provider echoes the payment it performed. Callers treat
/// the echo as authoritative.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Moves `amount` into the account.
    async fn deposit(
        &self,
        account_id: &AccountId,
        reference: &str,
        amount: Decimal,
    ) -> Result<ProviderPayment, ProviderError>;

    /// Moves `amount` out of the account.
    async fn withdraw(
        &self,
        account_id: &AccountId,
        reference: &str,
        amount: Decimal,
    ) -> Result<ProviderPayment, ProviderError>;
}

/// Lookup of payments the provider has performed.
#[async_trait::async_trait]
pub trait PaymentLookup: Send + Sync + 'static {
    /// Returns `None` when the provider does not know the reference.
    async fn retrieve(&self, reference: &str) -> Result<Option<ProviderPayment>, ProviderError>;
}
