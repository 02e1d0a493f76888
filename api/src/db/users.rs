use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;

use crate::models::user::{CreateUser, UpdateUser, User};
use crate::pagination::{Order, Page, SortBy};

pub async fn insert(
    pool: &SqlitePool,
    new_user: &CreateUser,
    password_hash: &str,
    created_at: DateTime<Utc>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, age, phone, is_active, created_at)
         VALUES (?, ?, ?, ?, ?, 1, ?)
         RETURNING *",
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(password_hash)
    .bind(new_user.age)
    .bind(&new_user.phone)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = lower(?)")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = lower(?)")
        .bind(username)
        .fetch_one(pool)
        .await
        .map(|count| count > 0)
}

/// Case-insensitive; `except_id` lets an owner keep their own address.
pub async fn email_exists(
    pool: &SqlitePool,
    email: &str,
    except_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE lower(email) = lower(?) AND id IS NOT ?",
    )
    .bind(email)
    .bind(except_id)
    .fetch_one(pool)
    .await
    .map(|count| count > 0)
}

pub async fn list(
    pool: &SqlitePool,
    page: Page,
    sort_by: SortBy,
    order: Order,
) -> Result<Vec<User>, sqlx::Error> {
    let direction = order.keyword();
    let sql = format!(
        "SELECT * FROM users ORDER BY {} {direction}, id {direction} LIMIT ? OFFSET ?",
        sort_by.column(),
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(pool)
        .await
}

/// Matches `needle` against each of `columns`, case-insensitively. With
/// `exact` a column must equal the needle; otherwise it must contain it.
pub async fn search(
    pool: &SqlitePool,
    needle: &str,
    columns: &[&'static str],
    exact: bool,
    page: Page,
) -> Result<Vec<User>, sqlx::Error> {
    let predicate = columns
        .iter()
        .map(|column| {
            if exact {
                format!("lower({column}) = lower(?)")
            } else {
                format!("instr(lower({column}), lower(?)) > 0")
            }
        })
        .collect::<Vec<_>>()
        .join(" OR ");
    let sql = format!("SELECT * FROM users WHERE {predicate} ORDER BY id ASC LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, User>(&sql);
    for _ in columns {
        query = query.bind(needle);
    }
    query
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(pool)
        .await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    changes: &UpdateUser,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users
         SET email = COALESCE(?, email),
             age   = COALESCE(?, age),
             phone = COALESCE(?, phone)
         WHERE id = ?
         RETURNING *",
    )
    .bind(&changes.email)
    .bind(changes.age)
    .bind(&changes.phone)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Marks the user inactive. Returns the previous `is_active`, or `None`
/// when no such user exists.
pub async fn deactivate(pool: &SqlitePool, id: i64) -> Result<Option<bool>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let previous = sqlx::query_scalar::<_, bool>("SELECT is_active FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if previous.is_some() {
        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(previous)
}

pub async fn touch_last_login(
    pool: &SqlitePool,
    id: i64,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Totals {
    pub total_users: i64,
    pub active_users: i64,
    pub inactive_users: i64,
}

pub async fn totals(pool: &SqlitePool) -> Result<Totals, sqlx::Error> {
    sqlx::query_as::<_, Totals>(
        "SELECT COUNT(*) AS total_users,
                COALESCE(SUM(is_active), 0) AS active_users,
                COALESCE(SUM(1 - is_active), 0) AS inactive_users
         FROM users",
    )
    .fetch_one(pool)
    .await
}

/// Aggregates that identify nobody.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Details {
    pub average_age: Option<f64>,
    pub users_with_phone: i64,
    pub users_logged_in: i64,
}

pub async fn details(pool: &SqlitePool) -> Result<Details, sqlx::Error> {
    sqlx::query_as::<_, Details>(
        "SELECT AVG(age) AS average_age,
                COUNT(phone) AS users_with_phone,
                COUNT(last_login) AS users_logged_in
         FROM users",
    )
    .fetch_one(pool)
    .await
}
