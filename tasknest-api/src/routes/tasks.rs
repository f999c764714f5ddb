/// Task CRUD endpoints
///
/// Every operation is scoped to the authenticated owner. Lookups by id
/// filter by `id AND owner_id` in one query, so "not yours" and "does not
/// exist" produce the same 404; a non-owner learns nothing about whether
/// the id is real.
///
/// # Endpoints
///
/// - `POST /api/tasks` - create
/// - `GET /api/tasks` - list own tasks
/// - `GET /api/tasks/:id` - fetch one
/// - `PUT /api/tasks/:id` - update (explicit field allow-list)
/// - `DELETE /api/tasks/:id` - delete
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
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tasknest_shared::models::{
    category::Category,
    task::{CreateTask, Task, UpdateTask},
};
use uuid::Uuid;
use validator::Validate;

/// Create-task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional category; must belong to the caller
    pub category_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
}

/// Update-task request
///
/// This is the complete allow-list: a field absent from the body is left
/// untouched, an explicit null clears nullable fields. Anything else a
/// client submits is dropped by serde.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description (null clears)
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,

    /// New completion state
    pub completed: Option<bool>,

    /// New category (null detaches)
    #[serde(default, deserialize_with = "super::double_option")]
    pub category_id: Option<Option<Uuid>>,

    /// New due date (null clears)
    #[serde(default, deserialize_with = "super::double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Verifies a submitted category reference belongs to the caller
///
/// Reported as a plain 404 on the category, same as every other ownership
/// miss.
async fn check_category(
    state: &AppState,
    owner_id: Uuid,
    category_id: Uuid,
) -> Result<(), ApiError> {
    Category::find_owned(&state.db, category_id, owner_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("category not found".to_string()))?;
    Ok(())
}

/// Create-task handler
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    if let Some(category_id) = req.category_id {
        check_category(&state, user.id, category_id).await?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: user.id,
            title: req.title,
            description: req.description,
            category_id: req.category_id,
            due_date: req.due_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List handler: all of the caller's tasks, newest first
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_by_owner(&state.db, user.id).await?;
    Ok(Json(tasks))
}

/// Get-by-id handler
pub async fn get_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_owned(&state.db, id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("task not found".to_string()))?;

    Ok(Json(task))
}

/// Update handler
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    if let Some(Some(category_id)) = req.category_id {
        check_category(&state, user.id, category_id).await?;
    }

    let task = Task::update_owned(
        &state.db,
        id,
        user.id,
        UpdateTask {
            title: req.title,
            description: req.description,
            completed: req.completed,
            category_id: req.category_id,
            due_date: req.due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete handler
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Task::delete_owned(&state.db, id, user.id).await?;

    if !deleted {
        return Err(ApiError::NotFound("task not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "task deleted".to_string(),
    }))
}
