use axum::{routing::get, Router};

use crate::{handlers, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Alert routes
        .route("/alerts", get(handlers::list_alerts))
        .route("/alerts/stats", get(handlers::alert_stats))
        .route("/alerts/:id", get(handlers::get_alert))
}
