use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::{
    cursor::Cursor,
    error::QueryError,
    filter::{AlertFilters, FilterSpec, Predicate, TimeRange},
    model::{is_valid_sort_key, AlertDetail, AlertItem, AlertStats, AlertSummary},
    store::AlertStore,
};

/// Fixed per-instance configuration for the query engine.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub default_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
        }
    }
}

/// One page of query results plus continuation state.
#[derive(Debug, Clone, Default)]
pub struct AlertPage {
    pub alerts: Vec<AlertSummary>,
    /// Transport-encoded continuation token, absent when the scan exhausted
    /// the data.
    pub last_key: Option<String>,
    pub has_more: bool,
}

/// Paginated, filtered alert listing. Stateless per request; one store scan
/// per call.
#[derive(Clone)]
pub struct AlertQueryEngine {
    store: Arc<dyn AlertStore>,
    config: QueryConfig,
}

impl AlertQueryEngine {
    pub fn new(store: Arc<dyn AlertStore>, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// Run one page scan. `cursor` is the token from a prior response;
    /// malformed tokens fail with `DecodeCursor` before any storage call.
    ///
    /// Note: `page_size` is not clamped to an upper bound.
    pub async fn query(
        &self,
        filters: &AlertFilters,
        page_size: Option<usize>,
        cursor: Option<&str>,
    ) -> Result<AlertPage, QueryError> {
        let start_key = cursor
            .map(Cursor::decode)
            .transpose()?
            .map(Cursor::into_inner);

        let spec = filters.to_spec(Utc::now());
        let limit = page_size.unwrap_or(self.config.default_page_size);

        let page = self
            .store
            .scan(&spec, Some(limit), start_key.as_ref(), true)
            .await?;

        let mut alerts: Vec<AlertSummary> =
            page.items.into_iter().map(AlertSummary::from_item).collect();
        sort_newest_first(&mut alerts);

        let has_more = page.last_evaluated_key.is_some();
        let last_key = page.last_evaluated_key.map(|key| Cursor::new(key).encode());

        Ok(AlertPage {
            alerts,
            last_key,
            has_more,
        })
    }
}

/// The store already scans most-recent-first; re-sorting keeps the page
/// non-increasing by timestamp even when the native ordering is not a total
/// order over timestamps.
fn sort_newest_first(alerts: &mut [AlertSummary]) {
    alerts.sort_by(|a, b| {
        match (parse_ts(&a.timestamp), parse_ts(&b.timestamp)) {
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            _ => b.timestamp.cmp(&a.timestamp),
        }
    });
}

fn parse_ts(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Window aggregation: total, severity buckets, top categories and sources.
#[derive(Clone)]
pub struct AlertStatsEngine {
    store: Arc<dyn AlertStore>,
}

impl AlertStatsEngine {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    /// Aggregate every record in the window. The whole matching set is
    /// collected before counting; continuation keys from the store are
    /// followed sequentially.
    ///
    /// Stats are always windowed: unlike list queries, `"all"` is not a
    /// sentinel here and gets the same one-hour default as any unrecognized
    /// range.
    pub async fn stats(&self, time_range: &str) -> Result<AlertStats, QueryError> {
        let duration = TimeRange::parse(time_range)
            .duration()
            .unwrap_or_else(|| Duration::hours(1));
        let cutoff = Utc::now() - duration;
        let spec = FilterSpec::new().with(Predicate::TimestampAtLeast(cutoff));

        let mut items = Vec::new();
        let mut start_key: Option<Value> = None;
        loop {
            let page = self.store.scan(&spec, None, start_key.as_ref(), true).await?;
            items.extend(page.items);
            match page.last_evaluated_key {
                Some(key) => start_key = Some(key),
                None => break,
            }
        }

        Ok(aggregate(&items))
    }
}

fn aggregate(items: &[AlertItem]) -> AlertStats {
    let mut critical = 0;
    let mut high = 0;
    let mut medium = 0;
    let mut low = 0;
    for item in items {
        match item.severity {
            1 => critical += 1,
            2 => high += 1,
            3 => medium += 1,
            4 => low += 1,
            // Out-of-range severities count toward the total only
            _ => {}
        }
    }

    AlertStats {
        total: items.len(),
        critical,
        high,
        medium,
        low,
        top_categories: top_counts(items.iter().map(|i| i.category.as_str()), 5),
        top_sources: top_counts(items.iter().map(|i| i.src_ip.as_str()), 10),
    }
}

/// Occurrence counts, highest first, truncated to `take`. Equal counts order
/// lexicographically by key so rankings stay deterministic.
fn top_counts<'a>(keys: impl Iterator<Item = &'a str>, take: usize) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for key in keys {
        *counts.entry(key.to_string()).or_default() += 1;
    }

    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(take);
    ranked
}

/// Single-record lookup by composite sort key.
#[derive(Clone)]
pub struct AlertDetailLookup {
    store: Arc<dyn AlertStore>,
}

impl AlertDetailLookup {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    /// Resolve one alert by its sort key. The format check happens before
    /// any storage call.
    pub async fn get_by_id(&self, id: &str) -> Result<AlertDetail, QueryError> {
        if !is_valid_sort_key(id) {
            return Err(QueryError::InvalidIdentifier { id: id.to_string() });
        }

        let spec = FilterSpec::new().with(Predicate::SortKeyEquals(id.to_string()));
        let page = self.store.scan(&spec, None, None, false).await?;

        let mut items = page.items.into_iter();
        let first = match items.next() {
            Some(item) => item,
            None => return Err(QueryError::NotFound { id: id.to_string() }),
        };

        // Sort keys are expected unique; a duplicate is a data-integrity
        // violation. Take the first in store-return order and flag it.
        let extra = items.count();
        if extra > 0 {
            tracing::warn!(id, extra, "duplicate sort key in store, taking first match");
        }

        Ok(AlertDetail::from_item(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: &str, src_ip: &str, severity: i64) -> AlertItem {
        AlertItem {
            sort_key: format!("TS#2025-01-01T00:00:00+00:00#ET#alert#FLOW#1#EID#{}", category),
            timestamp: "2025-01-01T00:00:00+00:00".to_string(),
            severity,
            src_ip: src_ip.to_string(),
            dest_ip: "10.0.0.2".to_string(),
            signature: "sig".to_string(),
            category: category.to_string(),
            action: "allowed".to_string(),
            flow_id: "1".to_string(),
            signature_id: "1".to_string(),
            tenant_id: "t".to_string(),
            alert_data: None,
        }
    }

    #[test]
    fn test_severity_buckets_ignore_out_of_range() {
        let items = vec![
            item("a", "1.1.1.1", 1),
            item("b", "1.1.1.1", 2),
            item("c", "1.1.1.1", 9),
        ];
        let stats = aggregate(&items);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.high, 1);
        assert_eq!(stats.medium + stats.low, 0);
        // Bucket sum is below total when a severity falls outside 1..4
        assert!(stats.critical + stats.high + stats.medium + stats.low < stats.total);
    }

    #[test]
    fn test_top_counts_truncation_and_tie_break() {
        let keys = [
            "gamma", "alpha", "beta", "alpha", "gamma", "delta", "epsilon", "zeta",
        ];
        let ranked = top_counts(keys.iter().copied(), 5);
        assert_eq!(ranked.len(), 5);
        // alpha and gamma tie at 2; alpha wins lexicographically
        assert_eq!(ranked[0], ("alpha".to_string(), 2));
        assert_eq!(ranked[1], ("gamma".to_string(), 2));
        // Remaining singles also in lexicographic order
        assert_eq!(ranked[2].1, 1);
        assert!(ranked[2].0 < ranked[3].0 && ranked[3].0 < ranked[4].0);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut alerts: Vec<AlertSummary> = vec![
            AlertSummary::from_item(AlertItem {
                timestamp: "2025-01-01T10:00:00+00:00".to_string(),
                ..item("a", "1.1.1.1", 1)
            }),
            AlertSummary::from_item(AlertItem {
                timestamp: "2025-01-01T12:00:00+00:00".to_string(),
                ..item("b", "1.1.1.1", 1)
            }),
            AlertSummary::from_item(AlertItem {
                timestamp: "2025-01-01T11:00:00+00:00".to_string(),
                ..item("c", "1.1.1.1", 1)
            }),
        ];
        sort_newest_first(&mut alerts);
        assert_eq!(alerts[0].timestamp, "2025-01-01T12:00:00+00:00");
        assert_eq!(alerts[1].timestamp, "2025-01-01T11:00:00+00:00");
        assert_eq!(alerts[2].timestamp, "2025-01-01T10:00:00+00:00");
    }
}
