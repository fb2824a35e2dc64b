//! Append-only persistence for sale records.

use crate::error::StoreError;
use crate::stat::datatype::{NewSale, Record};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// The append/read interface over the sales collection.
///
/// `append` stores exactly one record (assigning its id and `created_at`) or
/// nothing at all. `list_all` is a full scan in no particular order.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append(&self, sale: NewSale) -> Result<Record, StoreError>;

    async fn list_all(&self) -> Result<Vec<Record>, StoreError>;
}

#[async_trait]
impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    async fn append(&self, sale: NewSale) -> Result<Record, StoreError> {
        (**self).append(sale).await
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        (**self).list_all().await
    }
}

/// Process-local store. Useful for tests and the offline demo.
///
/// `list_all` returns newest first; callers must not rely on storage order.
#[derive(Debug)]
pub struct MemoryLedgerStore {
    records: RwLock<Vec<Record>>,
    available: AtomicBool,
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates losing (or regaining) the connection to the store.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn append(&self, sale: NewSale) -> Result<Record, StoreError> {
        self.ensure_available()?;
        let record = sale.into_record(Uuid::new_v4(), Utc::now());
        self.records.write().await.push(record.clone());
        debug!(record_id = %record.id(), "appended record to memory store");
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        self.ensure_available()?;
        let records = self.records.read().await;
        Ok(records.iter().rev().cloned().collect())
    }
}
