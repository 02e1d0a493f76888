use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validate;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub age: i64,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// `POST /users` body. Unknown fields are ignored and never stored.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub age: i64,
    pub phone: Option<String>,
}

impl CreateUser {
    /// Checks every field and normalises the username to lowercase.
    pub fn validate(mut self) -> Result<Self, AppError> {
        validate::username(&self.username)?;
        validate::email(&self.email)?;
        validate::password(&self.password)?;
        validate::age(self.age)?;
        if let Some(phone) = &self.phone {
            validate::phone(phone)?;
        }
        self.username = self.username.to_lowercase();
        Ok(self)
    }
}

/// `PUT /users/{id}` body. `username` is not updatable, so unknown fields
/// are rejected rather than dropped.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub age: Option<i64>,
    pub phone: Option<String>,
}

impl UpdateUser {
    pub fn validate(self) -> Result<Self, AppError> {
        if let Some(email) = &self.email {
            validate::email(email)?;
        }
        if let Some(age) = self.age {
            validate::age(age)?;
        }
        if let Some(phone) = &self.phone {
            validate::phone(phone)?;
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.age.is_none() && self.phone.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub was_active: bool,
}

#[derive(Debug, Serialize)]
pub struct BulkError {
    pub index: usize,
    pub status: u16,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub created: usize,
    pub users: Vec<User>,
    pub errors: Vec<BulkError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateUser {
        CreateUser {
            username: "John_Doe".into(),
            email: "john@example.com".into(),
            password: "password123".into(),
            age: 30,
            phone: Some("+15551234567".into()),
        }
    }

    #[test]
    fn create_lowercases_username() {
        let valid = payload().validate().unwrap();
        assert_eq!(valid.username, "john_doe");
    }

    #[test]
    fn create_rejects_bad_phone() {
        let bad = CreateUser {
            phone: Some("005321234567".into()),
            ..payload()
        };
        assert!(matches!(bad.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn update_refuses_string_age_and_username() {
        let string_age = serde_json::from_value::<UpdateUser>(serde_json::json!({"age": "31"}));
        assert!(string_age.is_err());

        let rename = serde_json::from_value::<UpdateUser>(serde_json::json!({"username": "x"}));
        assert!(rename.is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "a".into(),
            email: "a@b.co".into(),
            password_hash: "secret-hash".into(),
            age: 20,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["is_active"], true);
    }
}
