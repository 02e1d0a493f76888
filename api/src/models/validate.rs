//! Field rules shared by create and update payloads.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 150;
pub const MIN_PASSWORD_LEN: usize = 6;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[a-zA-Z0-9_\-'";]{3,50}$"#).expect("valid username regex"));

// E.164: leading '+', no leading zero in the country code, 8 to 15 digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").expect("valid phone regex"));

static EMAIL_LOCAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("valid email local-part regex")
});

static EMAIL_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
        .expect("valid email domain regex")
});

pub fn username(value: &str) -> Result<(), AppError> {
    if USERNAME_RE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "username must be 3-50 characters of letters, digits, or _-'\";".into(),
        ))
    }
}

pub fn email(value: &str) -> Result<(), AppError> {
    let valid = value.len() <= 254
        && value.split_once('@').is_some_and(|(local, domain)| {
            local.len() <= 64 && EMAIL_LOCAL_RE.is_match(local) && EMAIL_DOMAIN_RE.is_match(domain)
        });
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!("invalid email address: {value:?}")))
    }
}

pub fn password(value: &str) -> Result<(), AppError> {
    if value.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )))
    }
}

pub fn phone(value: &str) -> Result<(), AppError> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "invalid phone number {value:?}; expected E.164 such as +15551234567"
        )))
    }
}

pub fn age(value: i64) -> Result<(), AppError> {
    if (MIN_AGE..=MAX_AGE).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "age must be between {MIN_AGE} and {MAX_AGE}"
        )))
    }
}
