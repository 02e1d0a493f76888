pub mod auth;
pub mod search;
pub mod stats;
pub mod users;
