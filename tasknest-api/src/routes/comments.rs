/// Comment CRUD endpoints
///
/// Authorization here is two-layered, and the two layers answer
/// differently on purpose:
///
/// - Task-scoped paths (create, list-by-task) gate on ownership of the
///   referenced TASK and answer a plain 404 when it is missing or not
///   yours; existence is hidden, exactly as for tasks themselves.
/// - Paths addressing a comment by its own id check existence first (404)
///   and authorship second (403). A comment id is the one place where
///   "exists but forbidden" is deliberately visible.
///
/// # Endpoints
///
/// - `POST /api/comments` - comment on one of your tasks
/// - `GET /api/comments/task/:task_id` - list a task's comments
/// - `GET/PUT/DELETE /api/comments/:id` - single comment by id
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
use tasknest_shared::models::{
    comment::{Comment, CreateComment},
    task::Task,
};
use uuid::Uuid;
use validator::Validate;

/// Create-comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Task to attach the comment to; must be owned by the caller
    pub task_id: Uuid,

    /// Comment text
    #[validate(length(min = 1, max = 2000, message = "body must be 1-2000 characters"))]
    pub body: String,
}

/// Update-comment request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    /// Replacement text
    #[validate(length(min = 1, max = 2000, message = "body must be 1-2000 characters"))]
    pub body: String,
}

/// Task-ownership gate for the task-scoped paths
///
/// "Task missing" and "task not yours" collapse into the same 404.
async fn check_task_owned(state: &AppState, task_id: Uuid, owner_id: Uuid) -> Result<(), ApiError> {
    Task::find_owned(&state.db, task_id, owner_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("task not found".to_string()))?;
    Ok(())
}

/// Authorship gate for the comment-id paths
///
/// Existence first, authorship second: an absent id is 404, someone else's
/// comment is 403.
async fn find_authored(
    state: &AppState,
    id: Uuid,
    author_id: Uuid,
) -> Result<Comment, ApiError> {
    let comment = Comment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("comment not found".to_string()))?;

    if comment.author_id != author_id {
        return Err(ApiError::Forbidden(
            "comment belongs to another user".to_string(),
        ));
    }

    Ok(comment)
}

/// Create handler
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()?;

    check_task_owned(&state, req.task_id, user.id).await?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            task_id: req.task_id,
            author_id: user.id,
            body: req.body,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// List handler: a task's comments, gated on task ownership
pub async fn list_task_comments(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    check_task_owned(&state, task_id, user.id).await?;

    let comments = Comment::list_by_task(&state.db, task_id).await?;
    Ok(Json(comments))
}

/// Get-by-id handler
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Comment>> {
    let comment = find_authored(&state, id, user.id).await?;
    Ok(Json(comment))
}

/// Update handler
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    req.validate()?;

    find_authored(&state, id, user.id).await?;

    let comment = Comment::update_body(&state.db, id, &req.body)
        .await?
        .ok_or_else(|| ApiError::NotFound("comment not found".to_string()))?;

    Ok(Json(comment))
}

/// Delete handler
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    find_authored(&state, id, user.id).await?;

    Comment::delete(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "comment deleted".to_string(),
    }))
}
