//! Reconciliation lookups.
//!
//! Compares what the local ledger recorded for a reference with what the
//! provider reports. Read-only: a disagreement is reported, never repaired.

use payments_types::{
    PaymentError, PaymentLookup, PaymentLookupReport, ReconciliationState, TransactionLedger,
};

/// Service answering "what happened to this reference?".
pub struct ReconciliationService<L: TransactionLedger, Q: PaymentLookup> {
    ledger: L,
    lookup: Q,
}

impl<L: TransactionLedger, Q: PaymentLookup> ReconciliationService<L, Q> {
    pub fn new(ledger: L, lookup: Q) -> Self {
        Self { ledger, lookup }
    }

    /// Looks the reference up on both sides and classifies the result.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, reference: &str) -> Result<PaymentLookupReport, PaymentError> {
        if reference.trim().is_empty() {
            return Err(PaymentError::BadRequest("reference cannot be empty".into()));
        }

        let local = self
            .ledger
            .find_transactions_by_reference(reference)
            .await
            .map_err(PaymentError::Ledger)?;
        let provider = self.lookup.retrieve(reference).await?;

        let state = ReconciliationState::classify(&local, provider.as_ref());
        match state {
            ReconciliationState::Consistent | ReconciliationState::Unknown => {
                tracing::debug!(?state, "Reference reconciled");
            }
            _ => {
                tracing::warn!(?state, local_records = local.len(), "Ledger disagrees with provider");
            }
        }

        Ok(PaymentLookupReport {
            reference: reference.to_string(),
            state,
            local,
            provider,
        })
    }
}
