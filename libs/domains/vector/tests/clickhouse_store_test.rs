//! ClickHouse store against a real server. Run with `--ignored` (needs Docker).

use database::clickhouse::ClickHouseClient;
use domain_vector::{ClickHouseStore, RecordStore, TableConfig, VectorRecord};
use test_utils::{TestClickHouse, TestDataBuilder};

async fn store(clickhouse: &TestClickHouse) -> ClickHouseStore {
    let client: ClickHouseClient = clickhouse.client("db_test");
    let store = ClickHouseStore::new(client, &TableConfig::default()).unwrap();
    store.ensure_schema().await.unwrap();
    store
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_upsert_keeps_collection_order() {
    let clickhouse = TestClickHouse::new().await;
    let store = store(&clickhouse).await;

    assert_eq!(store.dimension().await.unwrap(), None);

    store
        .upsert(vec![
            VectorRecord::new("b", vec![1.0, 0.0]),
            VectorRecord::new("a", vec![0.0, 1.0]),
        ])
        .await
        .unwrap();
    store
        .upsert(vec![
            VectorRecord::new("c", vec![2.0, 2.0]),
            VectorRecord::new("b", vec![5.0, 5.0]),
        ])
        .await
        .unwrap();

    let records = store.scan().await.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert_eq!(records[0].embedding, vec![5.0, 5.0]);
    assert_eq!(store.dimension().await.unwrap(), Some(2));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_and_truncate_counts() {
    let clickhouse = TestClickHouse::new().await;
    let store = store(&clickhouse).await;

    let builder = TestDataBuilder::from_test_name("test_delete_and_truncate_counts");
    let records: Vec<VectorRecord> = builder
        .records("doc", 20, 4)
        .into_iter()
        .map(|(id, embedding)| VectorRecord::new(id, embedding))
        .collect();
    let first_two = vec![records[0].id.clone(), records[1].id.clone()];
    store.upsert(records).await.unwrap();

    assert_eq!(store.delete(first_two.clone()).await.unwrap(), 2);
    assert_eq!(store.delete(first_two).await.unwrap(), 0);
    assert_eq!(store.truncate().await.unwrap(), 18);
    assert!(store.scan().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_ids_with_quotes_round_trip() {
    let clickhouse = TestClickHouse::new().await;
    let store = store(&clickhouse).await;

    store
        .upsert(vec![VectorRecord::new("o'neil\\x", vec![1.0])])
        .await
        .unwrap();
    assert_eq!(store.delete(vec!["o'neil\\x".to_string()]).await.unwrap(), 1);
}
