// Alertdeck Core
// Query, statistics, and detail-lookup engines for security alerts stored
// behind a filterable-scan document store.

pub mod cursor;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod store;

// Re-export commonly used types
pub use cursor::Cursor;
pub use engine::{AlertDetailLookup, AlertPage, AlertQueryEngine, AlertStatsEngine, QueryConfig};
pub use error::{QueryError, StoreError};
pub use filter::{AlertFilters, FilterSpec, Predicate, TimeRange};
pub use model::{AlertDetail, AlertItem, AlertStats, AlertSummary};
pub use store::{AlertStore, MemoryStore, ScanPage, SqliteStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
