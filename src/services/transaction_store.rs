// services/transaction_store.rs
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::{AppError, Result};
use crate::models::transaction::TransactionRecord;

/// Mutation applied by [`TransactionStore::update`].
pub type Mutator = Box<dyn FnOnce(&mut TransactionRecord) -> Result<()> + Send>;

/// Keyed storage for transaction records.
///
/// Handlers only see this trait, so a persistent backend can replace the
/// in-memory map without touching call sites.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts a new record. Fails with `DuplicateReference` if the key exists.
    async fn put(&self, record: TransactionRecord) -> Result<()>;

    async fn get(&self, reference: &str) -> Result<Option<TransactionRecord>>;

    async fn contains(&self, reference: &str) -> Result<bool> {
        Ok(self.get(reference).await?.is_some())
    }

    /// Applies `mutator` to the stored record. Returns `Ok(None)` for an
    /// unknown reference. The record is only replaced if the mutator succeeds.
    async fn update(&self, reference: &str, mutator: Mutator) -> Result<Option<TransactionRecord>>;

    /// Most recent `limit` records, oldest first.
    async fn list(&self, limit: usize) -> Result<Vec<TransactionRecord>>;

    async fn len(&self) -> Result<usize>;
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, TransactionRecord>,
    order: Vec<String>,
}

/// Process-local store. Nothing is persisted and nothing is evicted.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    inner: RwLock<Inner>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::internal("transaction store lock poisoned")
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn put(&self, record: TransactionRecord) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.records.contains_key(&record.reference) {
            return Err(AppError::DuplicateReference(record.reference));
        }
        inner.order.push(record.reference.clone());
        inner.records.insert(record.reference.clone(), record);
        Ok(())
    }

    async fn get(&self, reference: &str) -> Result<Option<TransactionRecord>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.records.get(reference).cloned())
    }

    async fn update(&self, reference: &str, mutator: Mutator) -> Result<Option<TransactionRecord>> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let Some(current) = inner.records.get(reference) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        mutator(&mut updated)?;
        inner.records.insert(reference.to_string(), updated.clone());
        Ok(Some(updated))
    }

    async fn list(&self, limit: usize) -> Result<Vec<TransactionRecord>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let skip = inner.order.len().saturating_sub(limit);
        Ok(inner.order[skip..]
            .iter()
            .filter_map(|reference| inner.records.get(reference).cloned())
            .collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.inner.read().map_err(poisoned)?.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::{TransactionStatus, Transition};
    use chrono::Utc;

    fn record(reference: &str) -> TransactionRecord {
        TransactionRecord::pending(
            reference.into(),
            10.0,
            "GMD".into(),
            "1h".into(),
            Some("1 Hour".into()),
            format!("1H-DEVICE-{}", reference),
            None,
        )
    }

    #[tokio::test]
    async fn put_rejects_existing_reference() {
        let store = InMemoryTransactionStore::new();
        store.put(record("R1")).await.unwrap();

        let err = store.put(record("R1")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateReference(ref r) if r == "R1"));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_applies_transition() {
        let store = InMemoryTransactionStore::new();
        store.put(record("R1")).await.unwrap();

        let updated = store
            .update(
                "R1",
                Box::new(|tx: &mut TransactionRecord| {
                    tx.apply(Transition::Complete { gateway_transaction_id: None, at: Utc::now() })
                        .map(|_| ())
                }),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status(), TransactionStatus::Completed);
        let stored = store.get("R1").await.unwrap().unwrap();
        assert_eq!(stored.status(), TransactionStatus::Completed);
        assert_eq!(stored.voucher_code(), "1H-DEVICE-R1");
    }

    #[tokio::test]
    async fn failed_mutation_leaves_record_untouched() {
        let store = InMemoryTransactionStore::new();
        store.put(record("R1")).await.unwrap();

        let result = store
            .update(
                "R1",
                Box::new(|tx: &mut TransactionRecord| {
                    tx.package_name = Some("changed".into());
                    Err(AppError::internal("boom"))
                }),
            )
            .await;

        assert!(result.is_err());
        let stored = store.get("R1").await.unwrap().unwrap();
        assert_eq!(stored.package_name.as_deref(), Some("1 Hour"));
    }

    #[tokio::test]
    async fn update_of_unknown_reference_is_none() {
        let store = InMemoryTransactionStore::new();
        let result = store.update("missing", Box::new(|_: &mut TransactionRecord| Ok(()))).await.unwrap();
        assert!(result.is_none());
        assert!(!store.contains("missing").await.unwrap());
    }

    #[tokio::test]
    async fn list_returns_most_recent_in_insertion_order() {
        let store = InMemoryTransactionStore::new();
        for i in 0..5 {
            store.put(record(&format!("R{}", i))).await.unwrap();
        }

        let refs: Vec<String> = store
            .list(3)
            .await
            .unwrap()
            .into_iter()
            .map(|tx| tx.reference)
            .collect();
        assert_eq!(refs, vec!["R2", "R3", "R4"]);
        assert_eq!(store.list(50).await.unwrap().len(), 5);
    }
}
