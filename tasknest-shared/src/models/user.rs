/// User model and database operations
///
/// A user is created either by password signup or implicitly on first GitHub
/// login. The schema guarantees every account has at least one credential:
/// a password hash, a GitHub id, or both.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255),
///     name VARCHAR(255) NOT NULL,
///     github_id BIGINT UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ,
///     CONSTRAINT users_has_credential CHECK (password_hash IS NOT NULL OR github_id IS NOT NULL)
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing an account
///
/// Emails are stored lower-cased; all lookups lower-case their input so
/// comparison is effectively case-insensitive. Passwords are stored as
/// Argon2id hashes, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user id (UUID v4)
    pub id: Uuid,

    /// Email address, lower-cased, unique across all users
    pub email: String,

    /// Argon2id password hash; None for OAuth-only accounts
    pub password_hash: Option<String>,

    /// Display name
    pub name: String,

    /// GitHub account id, unique when present; None for password-only accounts
    pub github_id: Option<i64>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
///
/// At least one of `password_hash` and `github_id` must be set; the CHECK
/// constraint rejects the insert otherwise.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address (lower-cased before insert)
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: Option<String>,

    /// Display name
    pub name: String,

    /// GitHub account id for OAuth signups
    pub github_id: Option<i64>,
}

/// Allow-listed profile fields a user may change about themselves
///
/// Only these fields ever reach the UPDATE statement; anything else a client
/// submits is dropped at the request-parsing boundary.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    /// New email address (lower-cased before update)
    pub email: Option<String>,

    /// New display name
    pub name: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique-constraint violation if the email (or github_id)
    /// is already taken, or a check violation if no credential was supplied.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name, github_id)
            VALUES (LOWER($1), $2, $3, $4)
            RETURNING id, email, password_hash, name, github_id,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.name)
        .bind(data.github_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by id
    ///
    /// This is the auth middleware's "does the token's subject still exist"
    /// lookup as well as the general profile fetch.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, github_id,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, github_id,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE email = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by their GitHub account id
    pub async fn find_by_github_id(
        pool: &PgPool,
        github_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, github_id,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE github_id = $1
            "#,
        )
        .bind(github_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates a user's profile from the allow-listed fields
    ///
    /// Only non-None fields are written. Returns the updated user, or None
    /// if the user no longer exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = COALESCE(LOWER($2), email),
                name = COALESCE($3, name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, name, github_id,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(data.email)
        .bind(data.name)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces a user's password hash
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamps the last-login timestamp after successful authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user account
    ///
    /// Owned tasks, categories, and comments are removed by the schema's
    /// ON DELETE CASCADE. Outstanding tokens for this subject become useless
    /// at the auth gate's existence check.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
