//! # Payments Types
//!
//! Domain types and port traits for the consumer payments service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (User, Account, Transaction)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API and provider boundaries
//! - `error/` - Store, provider and workflow error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Account, AccountId, Transaction, TransactionId, TransactionStatus, TransactionType, User,
    UserId,
};
pub use dto::*;
pub use error::{ErrorKind, PaymentError, ProviderError, StatusPolicy, StoreError};
pub use ports::{PaymentGateway, PaymentLookup, StoreGateway, TransactionLedger};
