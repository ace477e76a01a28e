use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use alertdeck_core::{AlertDetail, AlertFilters, AlertStats, AlertSummary};

use crate::{error_handling::ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertListParams {
    pub severity: Option<String>,
    pub time_range: Option<String>,
    #[serde(rename = "sourceIP")]
    pub source_ip: Option<String>,
    pub alert_type: Option<String>,
    pub limit: Option<usize>,
    pub last_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertListResponse {
    pub success: bool,
    pub alerts: Vec<AlertSummary>,
    pub count: usize,
    pub last_key: Option<String>,
    pub has_more: bool,
}

/// GET /api/alerts
/// Paginated, filtered alert listing.
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertListParams>,
) -> Result<Json<AlertListResponse>, ApiError> {
    let severity = match params.severity.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
            ApiError::BadRequest(format!("severity must be an integer or \"all\": {}", raw))
        })?),
    };

    let filters = AlertFilters {
        severity,
        time_range: params.time_range,
        source_ip: params.source_ip,
        category: params.alert_type,
    };

    let page = state
        .query
        .query(&filters, params.limit, params.last_key.as_deref())
        .await?;

    Ok(Json(AlertListResponse {
        success: true,
        count: page.alerts.len(),
        alerts: page.alerts,
        last_key: page.last_key,
        has_more: page.has_more,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStatsParams {
    pub time_range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlertStatsResponse {
    pub success: bool,
    pub stats: AlertStats,
    #[serde(rename = "timeRange")]
    pub time_range: String,
}

/// GET /api/alerts/stats
/// Aggregate counts for the dashboard; window defaults to 24h.
pub async fn alert_stats(
    State(state): State<AppState>,
    Query(params): Query<AlertStatsParams>,
) -> Result<Json<AlertStatsResponse>, ApiError> {
    let time_range = params.time_range.unwrap_or_else(|| "24h".to_string());
    let stats = state.stats.stats(&time_range).await?;

    Ok(Json(AlertStatsResponse {
        success: true,
        stats,
        time_range,
    }))
}

#[derive(Debug, Serialize)]
pub struct AlertDetailResponse {
    pub success: bool,
    pub alert: AlertDetail,
}

/// GET /api/alerts/:id
/// Single alert by composite sort key, including the raw payload.
pub async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AlertDetailResponse>, ApiError> {
    let alert = state.detail.get_by_id(&id).await?;
    Ok(Json(AlertDetailResponse {
        success: true,
        alert,
    }))
}

/// GET /health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "alertdeck-web",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
