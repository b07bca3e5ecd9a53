use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{RecordStore, check_dimension};
use crate::error::VectorResult;
use crate::models::VectorRecord;

#[derive(Default)]
struct Inner {
    /// seq -> record; iteration order is collection order
    records: BTreeMap<u64, VectorRecord>,
    seq_by_id: HashMap<String, u64>,
    next_seq: u64,
}

/// Ordered in-process store for tests and `STORE_BACKEND=memory`.
///
/// Not durable; everything is lost when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl Inner {
    fn dimension(&self) -> Option<usize> {
        self.records.values().next().map(VectorRecord::dimension)
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn ping(&self) -> VectorResult<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> VectorResult<()> {
        Ok(())
    }

    async fn dimension(&self) -> VectorResult<Option<usize>> {
        Ok(self.inner.read().await.dimension())
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> VectorResult<()> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        // Checked under the write guard so concurrent first inserts cannot
        // both establish a dimension.
        check_dimension(inner.dimension(), &records)?;

        for record in records {
            let seq = match inner.seq_by_id.get(&record.id) {
                Some(&seq) => seq,
                None => {
                    let seq = inner.next_seq;
                    inner.next_seq += 1;
                    inner.seq_by_id.insert(record.id.clone(), seq);
                    seq
                }
            };
            inner.records.insert(seq, record);
        }
        Ok(())
    }

    async fn delete(&self, ids: Vec<String>) -> VectorResult<u64> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let mut removed = 0;
        for id in ids {
            if let Some(seq) = inner.seq_by_id.remove(&id) {
                inner.records.remove(&seq);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn scan(&self) -> VectorResult<Vec<VectorRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.records.values().cloned().collect())
    }

    async fn truncate(&self) -> VectorResult<u64> {
        let mut inner = self.inner.write().await;
        let removed = inner.records.len() as u64;
        inner.records.clear();
        inner.seq_by_id.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VectorError;
    use crate::ingest::ingest;
    use std::sync::Arc;

    fn ids(records: &[VectorRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_scan_keeps_first_insertion_order() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![
                VectorRecord::new("b", vec![1.0]),
                VectorRecord::new("a", vec![2.0]),
            ])
            .await
            .unwrap();
        store
            .upsert(vec![
                VectorRecord::new("c", vec![3.0]),
                VectorRecord::new("b", vec![9.0]),
            ])
            .await
            .unwrap();

        let records = store.scan().await.unwrap();
        assert_eq!(ids(&records), vec!["b", "a", "c"]);
        assert_eq!(records[0].embedding, vec![9.0]);
    }

    #[tokio::test]
    async fn test_dimension_tracks_contents() {
        let store = InMemoryStore::new();
        assert_eq!(store.dimension().await.unwrap(), None);

        store
            .upsert(vec![VectorRecord::new("a", vec![1.0, 2.0, 3.0])])
            .await
            .unwrap();
        assert_eq!(store.dimension().await.unwrap(), Some(3));

        store.delete(vec!["a".into()]).await.unwrap();
        assert_eq!(store.dimension().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_counts_only_present_ids() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![
                VectorRecord::new("a", vec![1.0]),
                VectorRecord::new("b", vec![2.0]),
            ])
            .await
            .unwrap();

        let removed = store
            .delete(vec!["a".into(), "missing".into()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_reinsert_after_delete_goes_to_the_end() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![
                VectorRecord::new("a", vec![1.0]),
                VectorRecord::new("b", vec![2.0]),
            ])
            .await
            .unwrap();
        store.delete(vec!["a".into()]).await.unwrap();
        store
            .upsert(vec![VectorRecord::new("a", vec![1.0])])
            .await
            .unwrap();

        assert_eq!(ids(&store.scan().await.unwrap()), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_truncate() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![
                VectorRecord::new("a", vec![1.0]),
                VectorRecord::new("b", vec![2.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.truncate().await.unwrap(), 2);
        assert!(store.is_empty().await);
        assert_eq!(store.truncate().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_rejects_other_dimension() {
        let store = InMemoryStore::new();
        store
            .upsert(vec![VectorRecord::new("a", vec![1.0, 2.0])])
            .await
            .unwrap();

        let result = store
            .upsert(vec![VectorRecord::new("b", vec![1.0, 2.0, 3.0])])
            .await;
        assert!(matches!(result, Err(VectorError::Validation(_))));
        assert_eq!(ids(&store.scan().await.unwrap()), vec!["a"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_inserts_keep_one_dimension() {
        for _ in 0..50 {
            let store = Arc::new(InMemoryStore::new());

            let two = {
                let store = store.clone();
                tokio::spawn(async move {
                    ingest(store.as_ref(), vec![VectorRecord::new("a", vec![1.0, 2.0])], 10).await
                })
            };
            let three = {
                let store = store.clone();
                tokio::spawn(async move {
                    ingest(
                        store.as_ref(),
                        vec![VectorRecord::new("b", vec![1.0, 2.0, 3.0])],
                        10,
                    )
                    .await
                })
            };

            let two = two.await.unwrap();
            let three = three.await.unwrap();
            assert_ne!(two.is_ok(), three.is_ok());

            let records = store.scan().await.unwrap();
            assert_eq!(records.len(), 1);
            let expected = if two.is_ok() { 2 } else { 3 };
            assert!(records.iter().all(|r| r.dimension() == expected));
        }
    }
}
