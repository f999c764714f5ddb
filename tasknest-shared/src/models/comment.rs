/// Comment model and database operations
///
/// Comments hang off a task and carry their author. Authorization here is
/// two-layered and deliberately asymmetric:
///
/// - Task-scoped operations (create, list-by-task) require the referenced
///   task to be owned by the caller; the handlers check that with
///   [`crate::models::task::Task::find_owned`] and report a plain 404.
/// - Operations addressing a comment by its own id check existence first
///   (404 when absent) and authorship second (403 when it exists but was
///   written by someone else).
///
/// That is why, unlike tasks, `find_by_id` is NOT owner-scoped: the caller
/// needs to know the comment exists before deciding between 404 and 403.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment id
    pub id: Uuid,

    /// Task this comment is attached to
    pub task_id: Uuid,

    /// User who wrote the comment
    pub author_id: Uuid,

    /// Comment text
    pub body: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// When the comment was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a comment
///
/// The handler must have verified that `task_id` refers to a task owned by
/// `author_id` before calling [`Comment::create`].
#[derive(Debug, Clone)]
pub struct CreateComment {
    /// Task this comment is attached to
    pub task_id: Uuid,

    /// User who wrote the comment
    pub author_id: Uuid,

    /// Comment text
    pub body: String,
}

impl Comment {
    /// Creates a new comment
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, author_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, author_id, body, created_at, updated_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.author_id)
        .bind(data.body)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by id, unscoped
    ///
    /// Deliberately not filtered by author: the caller distinguishes
    /// "absent" (404) from "present but not yours" (403).
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, body, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists a task's comments, oldest first
    ///
    /// Task ownership must already have been established by the handler.
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, body, created_at, updated_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Replaces a comment's body
    pub async fn update_body(
        pool: &PgPool,
        id: Uuid,
        body: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET body = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, task_id, author_id, body, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(body)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Deletes a comment by id
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_comment_struct() {
        let data = CreateComment {
            task_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            body: "looks done to me".to_string(),
        };

        assert!(!data.body.is_empty());
    }
}
