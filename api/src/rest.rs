use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{auth, search, stats, users},
    AppState, API_VERSION,
};

#[derive(Serialize)]
pub struct Banner {
    pub message: &'static str,
    pub version: &'static str,
}

pub async fn root() -> Json<Banner> {
    Json(Banner {
        message: "User Management API",
        version: API_VERSION,
    })
}

/// Route table.
///
/// Matching ranks literal segments above captures at the same depth, so
/// `/users/search` and `/users/bulk` resolve to their own handlers even
/// though `/users/:id` is registered first.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/search", get(search::search_users))
        .route("/users/bulk", post(users::bulk_create_users))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/stats", get(stats::stats))
        .route("/health", get(stats::health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
