use chrono::{DateTime, Duration, Utc};

use crate::model::AlertItem;

/// Supported relative time windows for alert queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    All,
    Last15m,
    Last1h,
    Last6h,
    Last24h,
    Last7d,
    Last30d,
}

impl TimeRange {
    /// Parse a client-supplied range. Unrecognized non-"all" values fall
    /// back to one hour rather than failing.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "all" => TimeRange::All,
            "15m" => TimeRange::Last15m,
            "1h" => TimeRange::Last1h,
            "6h" => TimeRange::Last6h,
            "24h" => TimeRange::Last24h,
            "7d" => TimeRange::Last7d,
            "30d" => TimeRange::Last30d,
            _ => TimeRange::Last1h,
        }
    }

    pub fn duration(self) -> Option<Duration> {
        match self {
            TimeRange::All => None,
            TimeRange::Last15m => Some(Duration::minutes(15)),
            TimeRange::Last1h => Some(Duration::hours(1)),
            TimeRange::Last6h => Some(Duration::hours(6)),
            TimeRange::Last24h => Some(Duration::hours(24)),
            TimeRange::Last7d => Some(Duration::days(7)),
            TimeRange::Last30d => Some(Duration::days(30)),
        }
    }

    /// Earliest instant still included by this range, `None` for `All`.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration().map(|d| now - d)
    }
}

/// A single filter condition evaluated against a raw alert item.
#[derive(Debug, Clone)]
pub enum Predicate {
    TimestampAtLeast(DateTime<Utc>),
    SeverityEquals(i64),
    SourceIpContains(String),
    CategoryEquals(String),
    SortKeyEquals(String),
}

impl Predicate {
    fn matches(&self, item: &AlertItem) -> bool {
        match self {
            Predicate::TimestampAtLeast(cutoff) => {
                // Unparseable timestamps never satisfy a range condition
                match DateTime::parse_from_rfc3339(&item.timestamp) {
                    Ok(ts) => ts.with_timezone(&Utc) >= *cutoff,
                    Err(_) => false,
                }
            }
            Predicate::SeverityEquals(v) => item.severity == *v,
            Predicate::SourceIpContains(s) => item.src_ip.contains(s.as_str()),
            Predicate::CategoryEquals(v) => item.category == *v,
            Predicate::SortKeyEquals(k) => item.sort_key == *k,
        }
    }
}

/// Request-scoped conjunction of filter conditions. AND-only, no nesting.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    predicates: Vec<Predicate>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.push(predicate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, item: &AlertItem) -> bool {
        self.predicates.iter().all(|p| p.matches(item))
    }
}

/// Client-facing filter parameters for alert list queries. Absent values and
/// the `"all"` sentinel impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct AlertFilters {
    pub severity: Option<i64>,
    pub time_range: Option<String>,
    pub source_ip: Option<String>,
    pub category: Option<String>,
}

impl AlertFilters {
    /// Compose the filter conjunction for this request, resolving the time
    /// range against `now`.
    pub fn to_spec(&self, now: DateTime<Utc>) -> FilterSpec {
        let mut spec = FilterSpec::new();

        if let Some(raw) = self.time_range.as_deref() {
            if let Some(cutoff) = TimeRange::parse(raw).cutoff(now) {
                spec.push(Predicate::TimestampAtLeast(cutoff));
            }
        }

        if let Some(severity) = self.severity {
            spec.push(Predicate::SeverityEquals(severity));
        }

        if let Some(source_ip) = self.source_ip.as_deref() {
            if !source_ip.is_empty() && source_ip != "all" {
                spec.push(Predicate::SourceIpContains(source_ip.to_string()));
            }
        }

        if let Some(category) = self.category.as_deref() {
            if category != "all" {
                spec.push(Predicate::CategoryEquals(category.to_string()));
            }
        }

        spec
    }
}
