/// Category model and database operations
///
/// Categories group a user's tasks. Names are unique per owner (enforced by
/// the `categories_owner_id_name_key` constraint), and like tasks, every
/// lookup is scoped by `id AND owner_id` in one query.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Category model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category id
    pub id: Uuid,

    /// Owning user
    pub owner_id: Uuid,

    /// Category name, unique per owner
    pub name: String,

    /// Optional display color (free-form, e.g. "#ff8800")
    pub color: Option<String>,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone)]
pub struct CreateCategory {
    /// Owning user
    pub owner_id: Uuid,

    /// Category name
    pub name: String,

    /// Optional display color
    pub color: Option<String>,
}

/// Allow-listed fields for updating a category
#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    /// New name
    pub name: Option<String>,

    /// New color (Some(None) clears it)
    pub color: Option<Option<String>>,
}

impl Category {
    /// Creates a new category
    ///
    /// # Errors
    ///
    /// Fails with a unique-constraint violation when the owner already has a
    /// category with this name.
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (owner_id, name, color)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, color, created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.name)
        .bind(data.color)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Finds a category by id, scoped to its owner
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, owner_id, name, color, created_at, updated_at
            FROM categories
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Lists an owner's categories, alphabetically
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, owner_id, name, color, created_at, updated_at
            FROM categories
            WHERE owner_id = $1
            ORDER BY name
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Updates a category from the allow-listed fields, scoped to its owner
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateCategory,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE categories SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND owner_id = $2 \
             RETURNING id, owner_id, name, color, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Category>(&query).bind(id).bind(owner_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }

        let category = q.fetch_optional(pool).await?;

        Ok(category)
    }

    /// Deletes a category, scoped to its owner
    ///
    /// Tasks pointing at it are detached (category_id set to NULL by the
    /// schema), not deleted.
    pub async fn delete_owned(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
