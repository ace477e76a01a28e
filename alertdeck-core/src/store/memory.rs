use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    error::StoreError,
    filter::FilterSpec,
    model::AlertItem,
    store::{AlertStore, ScanPage},
};

/// In-memory alert store for tests and demos.
///
/// Walks records in sort-key order and mints `{"sort_key": ...}` continuation
/// values. Sort keys are `TS#<iso8601>#...`, so lexicographic order is
/// chronological.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<Vec<AlertItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<AlertItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub fn insert(&self, item: AlertItem) {
        self.items
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(item);
    }

    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn resume_key(exclusive_start_key: Option<&Value>) -> Result<Option<String>, StoreError> {
    match exclusive_start_key {
        None => Ok(None),
        Some(value) => value
            .get("sort_key")
            .and_then(Value::as_str)
            .map(|k| Some(k.to_string()))
            .ok_or(StoreError::UnrecognizedContinuationKey),
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn scan(
        &self,
        filter: &FilterSpec,
        limit: Option<usize>,
        exclusive_start_key: Option<&Value>,
        descending: bool,
    ) -> Result<ScanPage, StoreError> {
        let resume = resume_key(exclusive_start_key)?;

        let mut rows = self
            .items
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        rows.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        if descending {
            rows.reverse();
        }

        let cap = limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        let mut last_key = None;

        let mut iter = rows
            .into_iter()
            .skip_while(|item| match &resume {
                // Exclusive: skip everything up to and including the resume key
                Some(k) if descending => item.sort_key >= *k,
                Some(k) => item.sort_key <= *k,
                None => false,
            })
            .peekable();

        while let Some(item) = iter.next() {
            if !filter.matches(&item) {
                continue;
            }
            let key = item.sort_key.clone();
            out.push(item);
            if out.len() >= cap {
                if iter.peek().is_some() {
                    last_key = Some(json!({ "sort_key": key }));
                }
                break;
            }
        }

        Ok(ScanPage {
            items: out,
            last_evaluated_key: last_key,
        })
    }
}
