//! # Payments Hex
//!
//! Application services and HTTP adapter for the consumer payments service.
//!
//! ## Architecture
//!
//! - `service/` - Credit/debit orchestrator (ordered gates over the ports)
//! - `reconcile/` - Read-only comparison of the local ledger with the provider
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served by the adapter
//!
//! Services are generic over the store and provider ports, allowing
//! different adapters (or in-memory fakes) to be injected.

pub mod inbound;
pub mod openapi;
pub mod reconcile;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use reconcile::ReconciliationService;
pub use service::{PaymentService, ServiceSettings};
