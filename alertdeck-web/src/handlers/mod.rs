pub mod alerts;

pub use alerts::{alert_stats, get_alert, health_check, list_alerts};
