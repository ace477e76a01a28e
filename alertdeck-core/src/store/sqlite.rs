use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};

use crate::{
    error::StoreError,
    filter::FilterSpec,
    model::AlertItem,
    store::{AlertStore, ScanPage},
};

/// Rows examined per round trip while walking the table.
const SCAN_BATCH: usize = 256;

/// Sqlite-backed alert store.
///
/// Performs a full scan with post-hoc filtering: rows are walked in sort-key
/// order in fixed batches and the `FilterSpec` is applied in process, the same
/// access pattern the engines assume of any collaborator. Continuation values
/// are `{"sort_key": <last examined>}`; callers carry them uninterpreted.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Create the alerts table and its timestamp index if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS alerts (
                sort_key TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                severity INTEGER NOT NULL,
                src_ip TEXT NOT NULL,
                dest_ip TEXT NOT NULL,
                signature TEXT NOT NULL,
                category TEXT NOT NULL,
                action TEXT NOT NULL,
                flow_id TEXT NOT NULL,
                signature_id TEXT NOT NULL,
                tenant_id TEXT NOT NULL,
                alert_data TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_timestamp ON alerts(timestamp)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Upsert a single alert record. Used by ingestion paths and tests; the
    /// engines themselves never write.
    pub async fn insert(&self, item: &AlertItem) -> Result<(), StoreError> {
        let alert_data = item
            .alert_data
            .as_ref()
            .map(|v| v.to_string());

        sqlx::query(
            "INSERT OR REPLACE INTO alerts
                (sort_key, timestamp, severity, src_ip, dest_ip, signature,
                 category, action, flow_id, signature_id, tenant_id, alert_data)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.sort_key)
        .bind(&item.timestamp)
        .bind(item.severity)
        .bind(&item.src_ip)
        .bind(&item.dest_ip)
        .bind(&item.signature)
        .bind(&item.category)
        .bind(&item.action)
        .bind(&item.flow_id)
        .bind(&item.signature_id)
        .bind(&item.tenant_id)
        .bind(alert_data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_batch(
        &self,
        resume: Option<&str>,
        descending: bool,
    ) -> Result<Vec<SqliteRow>, StoreError> {
        let sql = match (resume.is_some(), descending) {
            (true, true) => {
                "SELECT * FROM alerts WHERE sort_key < ? ORDER BY sort_key DESC LIMIT ?"
            }
            (true, false) => {
                "SELECT * FROM alerts WHERE sort_key > ? ORDER BY sort_key ASC LIMIT ?"
            }
            (false, true) => "SELECT * FROM alerts ORDER BY sort_key DESC LIMIT ?",
            (false, false) => "SELECT * FROM alerts ORDER BY sort_key ASC LIMIT ?",
        };

        let mut query = sqlx::query(sql);
        if let Some(key) = resume {
            query = query.bind(key.to_string());
        }
        let rows = query
            .bind(SCAN_BATCH as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

fn item_from_row(row: &SqliteRow) -> Result<AlertItem, StoreError> {
    let alert_data: Option<String> = row.try_get("alert_data")?;
    let alert_data = match alert_data {
        Some(raw) => Some(
            serde_json::from_str(&raw)
                .map_err(|e| StoreError::Backend(format!("corrupt alert_data column: {}", e)))?,
        ),
        None => None,
    };

    Ok(AlertItem {
        sort_key: row.try_get("sort_key")?,
        timestamp: row.try_get("timestamp")?,
        severity: row.try_get("severity")?,
        src_ip: row.try_get("src_ip")?,
        dest_ip: row.try_get("dest_ip")?,
        signature: row.try_get("signature")?,
        category: row.try_get("category")?,
        action: row.try_get("action")?,
        flow_id: row.try_get("flow_id")?,
        signature_id: row.try_get("signature_id")?,
        tenant_id: row.try_get("tenant_id")?,
        alert_data,
    })
}

#[async_trait]
impl AlertStore for SqliteStore {
    async fn scan(
        &self,
        filter: &FilterSpec,
        limit: Option<usize>,
        exclusive_start_key: Option<&Value>,
        descending: bool,
    ) -> Result<ScanPage, StoreError> {
        let mut resume: Option<String> = match exclusive_start_key {
            None => None,
            Some(value) => Some(
                value
                    .get("sort_key")
                    .and_then(Value::as_str)
                    .ok_or(StoreError::UnrecognizedContinuationKey)?
                    .to_string(),
            ),
        };

        let cap = limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();

        loop {
            let rows = self.fetch_batch(resume.as_deref(), descending).await?;
            let batch_len = rows.len();
            if batch_len == 0 {
                break;
            }

            for (i, row) in rows.iter().enumerate() {
                let item = item_from_row(row)?;
                let key = item.sort_key.clone();
                resume = Some(key.clone());

                if !filter.matches(&item) {
                    continue;
                }
                out.push(item);

                if out.len() >= cap {
                    // Only report a continuation key when rows remain past
                    // the one we stopped at
                    let exhausted = batch_len < SCAN_BATCH && i + 1 == batch_len;
                    let last_key = if exhausted {
                        None
                    } else {
                        Some(json!({ "sort_key": key }))
                    };
                    return Ok(ScanPage {
                        items: out,
                        last_evaluated_key: last_key,
                    });
                }
            }

            if batch_len < SCAN_BATCH {
                break;
            }
        }

        Ok(ScanPage {
            items: out,
            last_evaluated_key: None,
        })
    }
}
