use async_trait::async_trait;
use serde_json::Value;

use crate::{error::StoreError, filter::FilterSpec, model::AlertItem};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// One page of a (possibly partial) scan.
///
/// `last_evaluated_key` is present iff the scan stopped before exhausting the
/// underlying data; its shape is store-defined and opaque to callers.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub items: Vec<AlertItem>,
    pub last_evaluated_key: Option<Value>,
}

/// Read contract the engines consume. Any document store with a filterable
/// scan and continuation-key semantics satisfies it.
///
/// `items` are the post-filter matches; `limit` bounds matches per page, and
/// `exclusive_start_key` resumes a prior scan from the value that scan
/// returned verbatim.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn scan(
        &self,
        filter: &FilterSpec,
        limit: Option<usize>,
        exclusive_start_key: Option<&Value>,
        descending: bool,
    ) -> Result<ScanPage, StoreError>;
}
