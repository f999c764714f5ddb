/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>`; the `IntoResponse` impl converts each variant to
/// its status code and the wire-level error body.
///
/// # Wire format
///
/// Failures are always `{"error": <short code>, "details": <string|array>}`.
/// The `details` value is a human string, except for validation failures
/// where it is an array of `{field, message}` objects.
///
/// # Status mapping
///
/// Two mappings are deliberate compatibility choices rather than the usual
/// HTTP conventions: duplicate unique keys (`Conflict`) and validation
/// failures both answer 400, matching the API surface this server replaces.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthenticated (401): no/invalid/expired token, vanished subject,
    /// failed login, or a failed OAuth exchange
    Unauthorized(String),

    /// Authenticated but not the author (403) - comments path only
    Forbidden(String),

    /// Not found (404) - also covers "exists but owned by someone else"
    /// for tasks and categories
    NotFound(String),

    /// Duplicate unique key (400) - e.g. email, per-owner category name
    Conflict(String),

    /// Malformed input body (400), with per-field details
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500); logged, never detailed to the client
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error code (e.g. "unauthorized", "not_found")
    pub error: String,

    /// Human string, or a validation array
    pub details: serde_json::Value,
}

/// Success body for operations that return no resource (e.g. deletes)
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            // Compatibility: the original surface reported duplicates as 400
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short error code for the wire body
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.error_code().to_string();

        let details = match self {
            ApiError::ValidationError(errors) => {
                serde_json::to_value(errors).unwrap_or_default()
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                serde_json::Value::String("An internal error occurred".to_string())
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => serde_json::Value::String(msg),
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique-constraint violations become `Conflict` with a message derived
/// from the constraint name; everything else unexpected is internal.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("email already registered".to_string());
                    }
                    if constraint.contains("github") {
                        return ApiError::Conflict(
                            "github account already linked".to_string(),
                        );
                    }
                    if constraint.contains("categories_owner_id_name") {
                        return ApiError::Conflict("category name already in use".to_string());
                    }
                    return ApiError::Conflict(format!("constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert request-DTO validation failures into the field-detail array
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

/// Convert token errors to API errors
///
/// All verification failures collapse to the same 401: the response must not
/// reveal whether parsing, the signature, or the expiry check failed.
impl From<tasknest_shared::auth::jwt::TokenError> for ApiError {
    fn from(err: tasknest_shared::auth::jwt::TokenError) -> Self {
        use tasknest_shared::auth::jwt::TokenError;
        match err {
            TokenError::CreateError(msg) => ApiError::InternalError(msg),
            TokenError::Malformed(_) | TokenError::InvalidSignature | TokenError::Expired => {
                ApiError::Unauthorized("invalid or expired token".to_string())
            }
        }
    }
}

/// Convert password errors to API errors
impl From<tasknest_shared::auth::password::PasswordError> for ApiError {
    fn from(err: tasknest_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasknest_shared::auth::jwt::TokenError;

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("task not found".to_string());
        assert_eq!(err.to_string(), "Not found: task not found");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        // Duplicates report 400, not 409
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ValidationError(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_token_errors_collapse_to_one_message() {
        for err in [
            TokenError::Malformed("junk".into()),
            TokenError::InvalidSignature,
            TokenError::Expired,
        ] {
            match ApiError::from(err) {
                ApiError::Unauthorized(msg) => assert_eq!(msg, "invalid or expired token"),
                other => panic!("expected Unauthorized, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_validation_error_details() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
