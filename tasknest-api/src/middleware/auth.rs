/// Bearer-token auth gate
///
/// Applied as a layer to every protected route. The gate, in order:
///
/// 1. extracts the bearer credential from the `Authorization` header
///    (absent → 401 "no token provided");
/// 2. verifies it with the token service (any failure → 401
///    "invalid or expired token"; the response never reveals which
///    verification step failed);
/// 3. resolves the subject id to a live user row (missing → 401
///    "subject no longer exists", covering accounts deleted after the
///    token was issued);
/// 4. attaches the resolved user to request extensions and lets the
///    handler run.
///
/// The gate never mutates storage; on failure the handler does not run at
/// all. Handlers downstream extract [`CurrentUser`] via `Extension`.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Json};
/// use tasknest_api::middleware::auth::CurrentUser;
///
/// async fn profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<String> {
///     Json(user.email)
/// }
/// ```
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{app::AppState, error::ApiError};
use tasknest_shared::models::user::User;

/// The authenticated identity, attached to request extensions by the gate
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Auth gate middleware
///
/// Use with `axum::middleware::from_fn_with_state` on protected routers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("no token provided".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("no token provided".to_string()))?;

    // Collapses malformed/bad-signature/expired into one message
    let subject = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::Unauthorized("invalid or expired token".to_string()))?;

    // A valid token does not mean the account still exists
    let user = User::find_by_id(&state.db, subject)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("subject no longer exists".to_string()))?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
