// ABOUTME: Database operations for user accounts
// ABOUTME: Creation with uniqueness validation, lookups, and listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{is_unique_violation, AppError, AppResult};
use crate::models::User;

/// User account database operations manager
pub struct UsersManager {
    pool: SqlitePool,
}

impl UsersManager {
    /// Create a new users manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user account
    ///
    /// Email and username uniqueness is enforced by the schema; violations
    /// are reported as field-level validation errors.
    ///
    /// # Errors
    ///
    /// Returns a validation error on duplicate email/username, or a
    /// database error otherwise.
    pub async fn create(&self, user: &User) -> AppResult<Uuid> {
        let result = sqlx::query(
            r"
            INSERT INTO users (id, email, username, first_name, last_name, is_admin, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(i64::from(user.is_admin))
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user.id),
            Err(e) if is_unique_violation(&e) => {
                let field = if e.to_string().contains("users.email") {
                    "email"
                } else {
                    "username"
                };
                Err(AppError::validation(
                    field,
                    format!("A user with this {field} already exists"),
                ))
            }
            Err(e) => Err(AppError::database(format!("Failed to create user: {e}"))),
        }
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, username, first_name, last_name, is_admin, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Get a user by ID, failing with 404 if absent
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no such user exists.
    pub async fn get_required(&self, user_id: Uuid) -> AppResult<User> {
        self.get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))
    }

    /// Get a user by email address
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, email, username, first_name, last_name, is_admin, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// List users ordered by creation time
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, limit: u32, offset: u32) -> AppResult<Vec<User>> {
        let rows = sqlx::query(
            r"
            SELECT id, email, username, first_name, last_name, is_admin, created_at
            FROM users
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;

        rows.iter().map(row_to_user).collect()
    }

    /// Get total number of users
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?;

        Ok(row.get("count"))
    }
}

/// Map a database row to a [`User`]
fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");

    Ok(User {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid user id in database: {e}")))?,
        email: row.get("email"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        is_admin: row.get::<i64, _>("is_admin") != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::database(format!("Invalid timestamp in database: {e}")))?
            .with_timezone(&Utc),
    })
}
