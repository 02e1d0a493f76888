use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::{
    auth::{password, require_owner, Principal},
    db,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath, AppQuery, ClientIp},
    models::user::{BulkError, BulkResponse, CreateUser, DeleteResponse, UpdateUser, User},
    pagination::ListParams,
    AppState,
};

/// Validates, checks uniqueness, hashes, and stores a new user.
async fn register(state: &AppState, payload: CreateUser) -> AppResult<User> {
    let payload = payload.validate()?;

    if db::users::username_exists(&state.db, &payload.username).await? {
        return Err(AppError::Conflict("Username already exists".into()));
    }
    if db::users::email_exists(&state.db, &payload.email, None).await? {
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let password_hash = password::hash(&payload.password)?;
    let user = db::users::insert(&state.db, &payload, &password_hash, Utc::now()).await?;
    tracing::info!(user_id = user.id, username = %user.username, "user created");
    Ok(user)
}

async fn find_user(state: &AppState, id: i64) -> AppResult<User> {
    db::users::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn create_user(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    AppJson(payload): AppJson<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    state.limiter.enforce(&client_ip).await?;
    let user = register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Creates each item independently. Items refused by validation,
/// uniqueness, or the rate limiter are reported in `errors` and do not
/// stop the rest.
pub async fn bulk_create_users(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    AppJson(items): AppJson<Vec<serde_json::Value>>,
) -> AppResult<Json<BulkResponse>> {
    let mut users = Vec::new();
    let mut errors = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match register_bulk_item(&state, &client_ip, item).await {
            Ok(user) => users.push(user),
            Err(e) if e.status().is_server_error() => return Err(e),
            Err(e) => errors.push(BulkError {
                index,
                status: e.status().as_u16(),
                error: e.message(),
            }),
        }
    }

    tracing::info!(created = users.len(), failed = errors.len(), "bulk create");
    Ok(Json(BulkResponse {
        created: users.len(),
        users,
        errors,
    }))
}

async fn register_bulk_item(
    state: &AppState,
    client_ip: &str,
    item: serde_json::Value,
) -> AppResult<User> {
    state.limiter.enforce(client_ip).await?;
    let payload: CreateUser =
        serde_json::from_value(item).map_err(|e| AppError::Validation(e.to_string()))?;
    register(state, payload).await
}

pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<Json<Vec<User>>> {
    let page = params.page()?;
    if page.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let users = db::users::list(&state.db, page, params.sort_by, params.order).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<User>> {
    Ok(Json(find_user(&state, id).await?))
}

/// Owner-only. An inactive account is returned unchanged.
pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    AppPath(id): AppPath<i64>,
    AppJson(changes): AppJson<UpdateUser>,
) -> AppResult<Json<User>> {
    let changes = changes.validate()?;
    let target = find_user(&state, id).await?;
    require_owner(&principal, target.id)?;

    if !target.is_active || changes.is_empty() {
        return Ok(Json(target));
    }

    if let Some(email) = &changes.email {
        if db::users::email_exists(&state.db, email, Some(target.id)).await? {
            return Err(AppError::Conflict("Email already exists".into()));
        }
    }

    let updated = db::users::update(&state.db, target.id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    tracing::info!(user_id = updated.id, "user updated");
    Ok(Json(updated))
}

/// Owner-only soft delete; every session of the user is revoked.
pub async fn delete_user(
    State(state): State<AppState>,
    principal: Principal,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<DeleteResponse>> {
    let target = find_user(&state, id).await?;
    require_owner(&principal, target.id)?;

    let was_active = db::users::deactivate(&state.db, target.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let revoked = db::sessions::delete_for_user(&state.db, target.id).await?;

    tracing::info!(user_id = target.id, revoked, "user deactivated");
    Ok(Json(DeleteResponse {
        message: "User deleted successfully",
        was_active,
    }))
}
