use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    db,
    error::{AppError, AppResult},
    extract::AppQuery,
    models::user::User,
    pagination::{Page, PageParams},
    AppState,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    #[default]
    All,
    Username,
    Email,
}

impl SearchField {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            SearchField::All => &["username", "email"],
            SearchField::Username => &["username"],
            SearchField::Email => &["email"],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub field: SearchField,
    #[serde(default)]
    pub exact: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// `exact=true` compares for case-insensitive equality; otherwise any
/// case-insensitive substring matches.
pub async fn search_users(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<Vec<User>>> {
    let needle = params.q.trim();
    if needle.is_empty() {
        return Err(AppError::BadRequest("query parameter `q` must not be empty".into()));
    }

    let page = Page::try_from(PageParams {
        limit: params.limit,
        offset: params.offset,
    })?;
    if page.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let users =
        db::users::search(&state.db, needle, params.field.columns(), params.exact, page).await?;
    tracing::debug!(field = ?params.field, exact = params.exact, hits = users.len(), "search");
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_defaults_to_all_and_rejects_unknown() {
        let params: SearchParams = serde_json::from_value(serde_json::json!({"q": "x"})).unwrap();
        assert_eq!(params.field, SearchField::All);
        assert!(!params.exact);
        assert_eq!(params.field.columns(), &["username", "email"]);

        let bad = serde_json::from_value::<SearchParams>(
            serde_json::json!({"q": "x", "field": "nonexistent"}),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn q_is_required() {
        assert!(serde_json::from_value::<SearchParams>(serde_json::json!({"field": "email"})).is_err());
    }
}
