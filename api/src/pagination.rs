//! Listing parameters: page bounds and sort order.

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Id,
    Username,
    CreatedAt,
}

impl SortBy {
    pub fn column(self) -> &'static str {
        match self {
            SortBy::Id => "id",
            SortBy::Username => "username",
            SortBy::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// `limit`/`offset` as they arrive on the query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// A validated page window. `limit` is an exact cap on returned rows;
/// `limit == 0` is a legal request for an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl TryFrom<PageParams> for Page {
    type Error = AppError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if limit > MAX_LIMIT {
            return Err(AppError::BadRequest(format!(
                "limit must be at most {MAX_LIMIT}, got {limit}"
            )));
        }
        Ok(Page {
            limit,
            offset: params.offset.unwrap_or(0),
        })
    }
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }

    pub fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub fn sql_offset(&self) -> i64 {
        i64::from(self.offset)
    }
}

/// Full query for `GET /users`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub order: Order,
}

impl ListParams {
    pub fn page(&self) -> Result<Page, AppError> {
        Page::try_from(PageParams {
            limit: self.limit,
            offset: self.offset,
        })
    }
}
