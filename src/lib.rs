//! Sales bookkeeping ledger.
//!
//! Sales are validated by [`form`], persisted through a [`store::LedgerStore`],
//! and read back as a [`stat::Ledger`] snapshot that feeds the [`report`] table
//! and the bucketed revenue chart.

pub mod config;
pub mod error;
pub mod form;
pub mod report;
pub mod stat;
pub mod store;

pub use error::{ConfigError, StoreError, SubmitError, ValidationError};
pub use stat::*;
pub use store::{LedgerStore, MemoryLedgerStore};
