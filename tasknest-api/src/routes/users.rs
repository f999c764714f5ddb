/// User account endpoints
///
/// # Endpoints
///
/// - `POST /api/users/signup` - create an account, returns 201 with a token
/// - `POST /api/users/login` - password login, returns a token
/// - `GET /api/users/profile` - authenticated identity
/// - `PUT /api/users/profile` - update email / display name
/// - `PUT /api/users/password` - change password
/// - `DELETE /api/users/profile` - delete the account (cascades to owned
///   tasks, categories, and comments)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, MessageResponse},
    middleware::auth::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use tasknest_shared::{
    auth::password,
    models::user::{CreateUser, UpdateProfile, User},
};
use uuid::Uuid;
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address
    #[validate(email(message = "invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Public view of a user, embedded in auth responses
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User id
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Response carrying a fresh bearer token and the identity it asserts
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed bearer token
    pub token: String,

    /// The authenticated user
    pub user: UserResponse,
}

/// Full profile view for the authenticated user
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User id
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,

    /// Linked GitHub account id, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_id: Option<i64>,

    /// Account creation time
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Profile update request, the full allow-list of self-editable fields
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New email address
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,

    /// New display name
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password, verified before anything changes
    pub current_password: String,

    /// Replacement password
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub new_password: String,
}

/// Signup handler
///
/// # Errors
///
/// - `400 validation_error`: bad email / short password / missing name
/// - `400 conflict`: email already registered
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash: Some(password_hash),
            name: req.name,
            github_id: None,
        },
    )
    .await?;

    let token = state.tokens.issue(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Login handler
///
/// The same 401 answers an unknown email, a password-less (OAuth-only)
/// account, and a wrong password; none of them is distinguishable from
/// outside.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid email or password".to_string()))?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("invalid email or password".to_string()))?;

    if !password::verify_password(&req.password, hash)? {
        return Err(ApiError::Unauthorized(
            "invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let token = state.tokens.issue(user.id)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Profile handler: returns the identity resolved by the auth gate
pub async fn get_profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        github_id: user.github_id,
        created_at: user.created_at,
    })
}

/// Profile update handler
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    req.validate()?;

    let updated = User::update_profile(
        &state.db,
        user.id,
        UpdateProfile {
            email: req.email,
            name: req.name,
        },
    )
    .await?
    .ok_or_else(|| ApiError::Unauthorized("subject no longer exists".to_string()))?;

    Ok(Json(ProfileResponse {
        id: updated.id,
        email: updated.email,
        name: updated.name,
        github_id: updated.github_id,
        created_at: updated.created_at,
    }))
}

/// Password change handler
///
/// OAuth-only accounts have no current password to verify and get a 400.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let hash = user.password_hash.as_deref().ok_or_else(|| {
        ApiError::BadRequest("account has no password credential".to_string())
    })?;

    if !password::verify_password(&req.current_password, hash)? {
        return Err(ApiError::Unauthorized("invalid password".to_string()));
    }

    let new_hash = password::hash_password(&req.new_password)?;
    User::update_password(&state.db, user.id, &new_hash).await?;

    Ok(Json(MessageResponse {
        message: "password updated".to_string(),
    }))
}

/// Account deletion handler
///
/// Owned tasks, categories, and comments go with the account (schema-level
/// cascade). Tokens already issued for this subject die at the auth gate's
/// existence check.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<MessageResponse>> {
    User::delete(&state.db, user.id).await?;

    Ok(Json(MessageResponse {
        message: "account deleted".to_string(),
    }))
}
