/// Category CRUD endpoints
///
/// Same ownership discipline as tasks: id lookups filter by
/// `id AND owner_id` in one query and answer 404 for both "missing" and
/// "not yours". Category names are unique per owner; a duplicate reports
/// 400 conflict.
///
/// # Endpoints
///
/// - `POST /api/categories` - create
/// - `GET /api/categories` - list own categories
/// - `GET /api/categories/:id` - fetch one
/// - `PUT /api/categories/:id` - update
/// - `DELETE /api/categories/:id` - delete (tasks are detached, not removed)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, MessageResponse},
    middleware::auth::CurrentUser,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasknest_shared::models::category::{Category, CreateCategory, UpdateCategory};
use uuid::Uuid;
use validator::Validate;

/// Create-category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Category name, unique per owner
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    /// Optional display color
    #[validate(length(max = 32, message = "color must be at most 32 characters"))]
    pub color: Option<String>,
}

/// Update-category request (the full allow-list)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    /// New name
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New color (null clears)
    #[serde(default, deserialize_with = "super::double_option")]
    pub color: Option<Option<String>>,
}

/// Create handler
pub async fn create_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    req.validate()?;

    let category = Category::create(
        &state.db,
        CreateCategory {
            owner_id: user.id,
            name: req.name,
            color: req.color,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// List handler
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = Category::list_by_owner(&state.db, user.id).await?;
    Ok(Json(categories))
}

/// Get-by-id handler
pub async fn get_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>> {
    let category = Category::find_owned(&state.db, id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("category not found".to_string()))?;

    Ok(Json(category))
}

/// Update handler
pub async fn update_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCategoryRequest>,
) -> ApiResult<Json<Category>> {
    req.validate()?;

    let category = Category::update_owned(
        &state.db,
        id,
        user.id,
        UpdateCategory {
            name: req.name,
            color: req.color,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("category not found".to_string()))?;

    Ok(Json(category))
}

/// Delete handler
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Category::delete_owned(&state.db, id, user.id).await?;

    if !deleted {
        return Err(ApiError::NotFound("category not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "category deleted".to_string(),
    }))
}
