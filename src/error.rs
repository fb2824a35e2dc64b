//! Error types shared by every part of the sales ledger.

use rust_decimal::Decimal;
use thiserror::Error;

/// Bad user input. Reported back to whoever filled in the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("item name must not be empty")]
    EmptyItemName,

    #[error("unit price is not a number: {0:?}")]
    InvalidUnitPrice(String),

    #[error("unit price must be greater than 0 (got {0})")]
    NonPositiveUnitPrice(Decimal),

    #[error("quantity is not a whole number: {0:?}")]
    InvalidQuantity(String),

    #[error("quantity must be at least 1 (got {0})")]
    NonPositiveQuantity(i64),

    #[error("quantity is too large (got {0})")]
    QuantityOutOfRange(i64),

    #[error("total price of {quantity} x {unit_price} is too large")]
    TotalOutOfRange { unit_price: Decimal, quantity: u32 },
}

/// Failure talking to the ledger store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("ledger store unavailable: {0}")]
    Unavailable(String),

    #[error("ledger store rejected the request: {0}")]
    Rejected(String),

    #[error("ledger store returned a malformed record: {0}")]
    Corrupt(String),

    /// The request may or may not have been applied.
    #[error("ledger store timed out, outcome unknown: {0}")]
    TimedOut(String),
}

/// Outcome of a failed form submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("malformed store configuration: {0}")]
    Malformed(String),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
