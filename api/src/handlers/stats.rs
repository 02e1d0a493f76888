use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    auth::Principal,
    db::{self, users::Details},
    error::{AppError, AppResult},
    extract::AppQuery,
    AppState, API_VERSION,
};

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    #[serde(default)]
    pub include_details: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub active_users: i64,
    pub inactive_users: i64,
    pub active_sessions: i64,
    pub api_version: &'static str,
    pub uptime_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

/// Aggregates only. The detail view needs a valid bearer token and still
/// carries no per-user fields.
pub async fn stats(
    State(state): State<AppState>,
    principal: Option<Principal>,
    AppQuery(params): AppQuery<StatsParams>,
) -> AppResult<Json<StatsResponse>> {
    let details = if params.include_details {
        if principal.is_none() {
            return Err(AppError::Unauthorized(
                "Authentication required for detailed statistics".into(),
            ));
        }
        Some(db::users::details(&state.db).await?)
    } else {
        None
    };

    let totals = db::users::totals(&state.db).await?;
    let active_sessions = db::sessions::count_live(&state.db, Utc::now()).await?;

    Ok(Json(StatsResponse {
        total_users: totals.total_users,
        active_users: totals.active_users,
        inactive_users: totals.inactive_users,
        active_sessions,
        api_version: API_VERSION,
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
        details,
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: f64,
    pub db: &'static str,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, health, db) = match db::ping(&state.db).await {
        Ok(()) => (StatusCode::OK, "healthy", "ok"),
        Err(e) => {
            tracing::error!("health check database probe failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: health,
            timestamp: Utc::now(),
            uptime_seconds: state.started_at.elapsed().as_secs_f64(),
            db,
        }),
    )
}
