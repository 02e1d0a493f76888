//! Credentials, bearer tokens, and the authenticated principal.

pub mod password;
pub mod principal;
pub mod token;

pub use principal::{require_owner, Principal};
