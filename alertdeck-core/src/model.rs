use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minimum number of `#`-delimited segments a sort key must carry to be
/// treated as a valid alert identifier
/// (`TS#<iso8601>#ET#<type>#FLOW#<flow_id>#EID#<short>`).
pub const SORT_KEY_MIN_SEGMENTS: usize = 6;

/// Raw alert record as the storage collaborator returns it. The sort key is
/// the only natural identifier; it is parsed for validation and echoed back
/// as `id`, never regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertItem {
    pub sort_key: String,
    pub timestamp: String,
    pub severity: i64,
    pub src_ip: String,
    pub dest_ip: String,
    pub signature: String,
    pub category: String,
    pub action: String,
    pub flow_id: String,
    pub signature_id: String,
    pub tenant_id: String,
    /// Full original detection payload. Opaque; surfaced on detail lookups
    /// only.
    pub alert_data: Option<Value>,
}

/// Public list shape for an alert. Omits the raw payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSummary {
    pub id: String,
    pub timestamp: String,
    pub severity: i64,
    #[serde(rename = "sourceIP")]
    pub source_ip: String,
    #[serde(rename = "destIP")]
    pub dest_ip: String,
    pub signature: String,
    pub category: String,
    pub action: String,
    pub flow_id: String,
    pub signature_id: String,
}

impl AlertSummary {
    pub fn from_item(item: AlertItem) -> Self {
        Self {
            id: item.sort_key,
            timestamp: item.timestamp,
            severity: item.severity,
            source_ip: item.src_ip,
            dest_ip: item.dest_ip,
            signature: item.signature,
            category: item.category,
            action: item.action,
            flow_id: item.flow_id,
            signature_id: item.signature_id,
        }
    }
}

/// Public detail shape. Unlike the list contract, this carries the full
/// original payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDetail {
    pub id: String,
    pub timestamp: String,
    pub severity: i64,
    #[serde(rename = "sourceIP")]
    pub source_ip: String,
    #[serde(rename = "destIP")]
    pub dest_ip: String,
    pub signature: String,
    pub category: String,
    pub action: String,
    pub flow_id: String,
    pub signature_id: String,
    pub tenant_id: String,
    #[serde(rename = "fullData")]
    pub full_data: Option<Value>,
}

impl AlertDetail {
    pub fn from_item(item: AlertItem) -> Self {
        Self {
            id: item.sort_key,
            timestamp: item.timestamp,
            severity: item.severity,
            source_ip: item.src_ip,
            dest_ip: item.dest_ip,
            signature: item.signature,
            category: item.category,
            action: item.action,
            flow_id: item.flow_id,
            signature_id: item.signature_id,
            tenant_id: item.tenant_id,
            full_data: item.alert_data,
        }
    }
}

/// Aggregated counts over a time window. Derived per request, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertStats {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    #[serde(rename = "topCategories")]
    pub top_categories: Vec<(String, u64)>,
    #[serde(rename = "topSources")]
    pub top_sources: Vec<(String, u64)>,
}

/// Sort key format check: at least six `#`-delimited segments.
pub fn is_valid_sort_key(id: &str) -> bool {
    id.split('#').count() >= SORT_KEY_MIN_SEGMENTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_validation() {
        assert!(is_valid_sort_key(
            "TS#2025-01-01T12:00:00+00:00#ET#alert#FLOW#12345#EID#a1b2"
        ));
        // Exactly six segments is the minimum
        assert!(is_valid_sort_key("TS#x#ET#y#FLOW#z"));
        assert!(!is_valid_sort_key("bad-id"));
        assert!(!is_valid_sort_key("TS#x#ET#y"));
        assert!(!is_valid_sort_key(""));
    }

    #[test]
    fn test_summary_omits_payload() {
        let item = AlertItem {
            sort_key: "TS#2025-01-01T12:00:00+00:00#ET#alert#FLOW#1#EID#ab".to_string(),
            timestamp: "2025-01-01T12:00:00+00:00".to_string(),
            severity: 1,
            src_ip: "10.0.0.1".to_string(),
            dest_ip: "10.0.0.2".to_string(),
            signature: "ET SCAN Nmap".to_string(),
            category: "scan".to_string(),
            action: "allowed".to_string(),
            flow_id: "1".to_string(),
            signature_id: "2100001".to_string(),
            tenant_id: "tenant-a".to_string(),
            alert_data: Some(serde_json::json!({"payload": "raw"})),
        };

        let summary = AlertSummary::from_item(item.clone());
        assert_eq!(summary.id, item.sort_key);
        let encoded = serde_json::to_value(&summary).unwrap();
        assert!(encoded.get("fullData").is_none());
        assert_eq!(encoded["sourceIP"], "10.0.0.1");

        let detail = AlertDetail::from_item(item);
        let encoded = serde_json::to_value(&detail).unwrap();
        assert_eq!(encoded["fullData"]["payload"], "raw");
        assert_eq!(encoded["tenant_id"], "tenant-a");
    }
}
