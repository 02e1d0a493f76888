//! Bearer authentication for protected handlers.
//!
//! Every mutating endpoint uses `Authorization: Bearer <token>`; other
//! schemes are refused. A token is only honoured while both its signed
//! expiry and its server-side session are live.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::Utc;

use super::token;
use crate::{db, error::AppError, AppState};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub session_id: String,
}

impl Principal {
    pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Self, AppError> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

        let bearer = bearer_token(header).ok_or_else(|| {
            AppError::Unauthorized("Unsupported authorization scheme; use Bearer".into())
        })?;

        let claims = token::verify(bearer, &state.decoding_key)?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

        let session = db::sessions::find_live(&state.db, &claims.sid, Utc::now())
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or revoked".into()))?;
        if session.user_id != user_id {
            return Err(AppError::Unauthorized("Invalid token".into()));
        }

        Ok(Principal {
            user_id,
            session_id: session.id,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Principal::authenticate(state, &parts.headers).await
    }
}

/// Object-level check: only the owner may act on `target_user_id`.
pub fn require_owner(principal: &Principal, target_user_id: i64) -> Result<(), AppError> {
    if principal.user_id == target_user_id {
        Ok(())
    } else {
        tracing::warn!(
            actor = principal.user_id,
            target = target_user_id,
            "refused action on another user's account"
        );
        Err(AppError::Forbidden(
            "You may only modify your own account".into(),
        ))
    }
}

/// Extracts the credential from `Bearer <token>`; the scheme name is
/// case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, credential) = header.split_once(' ')?;
    let credential = credential.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !credential.is_empty()).then_some(credential)
}
