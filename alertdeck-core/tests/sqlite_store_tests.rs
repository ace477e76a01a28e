// SqliteStore Tests
// Scan/resume behavior of the sqlite store, including parity with the
// in-memory store on the same fixture.

use chrono::{Duration, SecondsFormat, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use alertdeck_core::{
    AlertFilters, AlertItem, AlertStore, FilterSpec, MemoryStore, Predicate, SqliteStore,
};

fn alert(n: u32, age: Duration, severity: i64, src_ip: &str, category: &str) -> AlertItem {
    let ts = (Utc::now() - age).to_rfc3339_opts(SecondsFormat::Millis, true);
    AlertItem {
        sort_key: format!("TS#{}#ET#alert#FLOW#{}#EID#{:04}", ts, n, n),
        timestamp: ts,
        severity,
        src_ip: src_ip.to_string(),
        dest_ip: "172.16.0.9".to_string(),
        signature: format!("ET SCAN Suspicious Traffic {}", n),
        category: category.to_string(),
        action: "allowed".to_string(),
        flow_id: format!("{}", n),
        signature_id: "2100001".to_string(),
        tenant_id: "tenant-a".to_string(),
        alert_data: Some(serde_json::json!({ "seq": n })),
    }
}

fn fixture() -> Vec<AlertItem> {
    vec![
        alert(1, Duration::minutes(1), 1, "192.168.1.10", "scan"),
        alert(2, Duration::minutes(5), 1, "192.168.1.11", "scan"),
        alert(3, Duration::hours(2), 1, "192.168.1.12", "malware"),
        alert(4, Duration::minutes(3), 2, "10.0.0.4", "policy"),
        alert(5, Duration::days(3), 1, "10.0.0.5", "scan"),
    ]
}

async fn sqlite_store(items: &[AlertItem]) -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqliteStore::new(pool);
    store.ensure_schema().await.unwrap();
    for item in items {
        store.insert(item).await.unwrap();
    }
    store
}

/// Drain a store page by page, returning all items in scan order.
async fn drain(
    store: &dyn AlertStore,
    filter: &FilterSpec,
    limit: Option<usize>,
) -> Vec<AlertItem> {
    let mut all = Vec::new();
    let mut start_key = None;
    loop {
        let page = store
            .scan(filter, limit, start_key.as_ref(), true)
            .await
            .unwrap();
        all.extend(page.items);
        match page.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => break,
        }
    }
    all
}

#[tokio::test]
async fn test_scan_descending_order() {
    let store = sqlite_store(&fixture()).await;
    let page = store
        .scan(&FilterSpec::new(), Some(50), None, true)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 5);
    for pair in page.items.windows(2) {
        assert!(pair[0].sort_key > pair[1].sort_key);
    }
    assert!(page.last_evaluated_key.is_none());
}

#[tokio::test]
async fn test_scan_filter_and_resume() {
    let store = sqlite_store(&fixture()).await;
    let now = Utc::now();
    let spec = AlertFilters {
        severity: Some(1),
        time_range: Some("24h".to_string()),
        ..Default::default()
    }
    .to_spec(now);

    let first = store.scan(&spec, Some(2), None, true).await.unwrap();
    assert_eq!(first.items.len(), 2);
    let key = first.last_evaluated_key.expect("continuation key expected");

    let second = store.scan(&spec, Some(2), Some(&key), true).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(second.last_evaluated_key.is_none());

    // No overlap between pages
    assert!(first.items.iter().all(|a| a.sort_key != second.items[0].sort_key));
}

#[tokio::test]
async fn test_scan_parity_with_memory_store() {
    let items = fixture();
    let sqlite = sqlite_store(&items).await;
    let memory = MemoryStore::with_items(items);

    let spec = FilterSpec::new().with(Predicate::SeverityEquals(1));
    for limit in [None, Some(1), Some(2), Some(10)] {
        let from_sqlite = drain(&sqlite, &spec, limit).await;
        let from_memory = drain(&memory, &spec, limit).await;
        assert_eq!(from_sqlite, from_memory, "limit {:?}", limit);
    }
}

#[tokio::test]
async fn test_insert_round_trips_payload() {
    let items = fixture();
    let store = sqlite_store(&items).await;

    let spec = FilterSpec::new().with(Predicate::SortKeyEquals(items[0].sort_key.clone()));
    let page = store.scan(&spec, None, None, false).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0], items[0]);
}

#[tokio::test]
async fn test_unrecognized_continuation_key() {
    let store = sqlite_store(&fixture()).await;
    let bogus = serde_json::json!({"unexpected": true});
    let result = store
        .scan(&FilterSpec::new(), Some(2), Some(&bogus), true)
        .await;
    assert!(result.is_err());
}
