use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;

use crate::{
    auth::{password, token, Principal},
    db::{self, sessions::Session},
    error::{AppError, AppResult},
    extract::{AppJson, ClientIp},
    models::user::{AuthResponse, LoginPayload, MessageResponse},
    AppState,
};

pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    AppJson(payload): AppJson<LoginPayload>,
) -> AppResult<Json<AuthResponse>> {
    let Some(user) = db::users::find_by_username(&state.db, &payload.username).await? else {
        // Spend the same hashing time as a real check before refusing.
        let _ = password::verify(&payload.password, password::dummy_hash());
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    };

    if !password::verify(&payload.password, &user.password_hash)? {
        tracing::info!(username = %user.username, %client_ip, "failed login");
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    let now = Utc::now();
    let ttl = chrono::Duration::from_std(state.config.token_ttl)
        .map_err(|_| AppError::Internal("token ttl out of range".into()))?;
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal("token expiry out of range".into()))?;

    let session = Session {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.id,
        client_ip,
        created_at: now,
        expires_at,
    };
    db::sessions::insert(&state.db, &session).await?;

    let claims = token::Claims::new(user.id, &session.id, now, expires_at);
    let token = token::issue(&claims, &state.encoding_key)?;

    db::users::touch_last_login(&state.db, user.id, now).await?;
    match db::sessions::purge_expired(&state.db, now).await {
        Ok(0) => {}
        Ok(purged) => tracing::debug!(purged, "purged expired sessions"),
        Err(e) => tracing::warn!("failed to purge expired sessions: {}", e),
    }

    tracing::info!(user_id = user.id, client_ip = %session.client_ip, "login");
    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer",
        expires_in: state.config.token_ttl.as_secs(),
        user_id: user.id,
    }))
}

/// Revokes the presented session. Succeeds even without one, so clients can
/// call it unconditionally.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<MessageResponse>> {
    let principal = match Principal::authenticate(&state, &headers).await {
        Ok(principal) => principal,
        Err(AppError::Unauthorized(_)) => {
            return Ok(Json(MessageResponse {
                message: "No active session",
            }))
        }
        Err(e) => return Err(e),
    };

    db::sessions::delete(&state.db, &principal.session_id).await?;
    tracing::info!(user_id = principal.user_id, "logout");
    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}
