//! Domain models for the payment service.

pub mod account;
pub mod transaction;
pub mod user;

pub use account::{Account, AccountId};
pub use transaction::{Transaction, TransactionId, TransactionStatus, TransactionType};
pub use user::{User, UserId};
