//! Signed bearer tokens bound to a server-side session.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Session id; revoking the session revokes the token.
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user_id: i64,
        session_id: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

pub fn issue(claims: &Claims, key: &EncodingKey) -> Result<String, AppError> {
    Ok(encode(&Header::new(Algorithm::HS256), claims, key)?)
}

/// Verifies signature and expiry. Any failure is reported as unauthorized.
pub fn verify(token: &str, key: &DecodingKey) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("rejected bearer token: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Session expired".into())
                }
                _ => AppError::Unauthorized("Invalid token".into()),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn keys() -> (EncodingKey, DecodingKey) {
        (
            EncodingKey::from_secret(b"test-secret"),
            DecodingKey::from_secret(b"test-secret"),
        )
    }

    #[test]
    fn issued_token_verifies() {
        let (enc, dec) = keys();
        let claims = Claims::new(7, "sess-1", Utc::now(), Utc::now() + Duration::hours(1));
        let token = issue(&claims, &enc).unwrap();

        let verified = verify(&token, &dec).unwrap();
        assert_eq!(verified.user_id(), Some(7));
        assert_eq!(verified.sid, "sess-1");
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let (enc, dec) = keys();
        let issued = Utc::now() - Duration::hours(2);
        let token = issue(&Claims::new(7, "s", issued, issued + Duration::hours(1)), &enc).unwrap();

        match verify(&token, &dec) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Session expired"),
            other => panic!("expected expiry rejection, got {other:?}"),
        }
    }

    #[test]
    fn foreign_signature_is_unauthorized() {
        let (enc, _) = keys();
        let token = issue(&Claims::new(7, "s", Utc::now(), Utc::now() + Duration::hours(1)), &enc).unwrap();
        let other = DecodingKey::from_secret(b"another-secret");
        assert!(matches!(verify(&token, &other), Err(AppError::Unauthorized(_))));
    }
}
