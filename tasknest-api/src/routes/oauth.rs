/// GitHub OAuth login
///
/// Maps a GitHub login onto a local account: the callback exchanges the
/// authorization code for a GitHub access token, fetches the GitHub user,
/// and looks up an account by `github_id`, creating one on first sight
/// (an implicit signup with no password credential). From there a bearer
/// token is issued exactly as in password login.
///
/// Any failure in the exchange surfaces as a single 401 with no account
/// created or mutated.
///
/// # Endpoints
///
/// - `GET /api/auth/github` - 302 redirect into GitHub's authorize page
/// - `GET /api/auth/github/callback?code=…` - completes the dance,
///   returns `{token, user}`
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::AuthResponse,
};
use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use serde::Deserialize;
use tasknest_shared::models::user::{CreateUser, User};

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_API_URL: &str = "https://api.github.com/user";

/// Query parameters GitHub sends to the callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code (absent when the user denied access)
    pub code: Option<String>,

    /// Error code from GitHub, if the authorization failed
    pub error: Option<String>,
}

/// Token exchange response from GitHub
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
}

/// The subset of GitHub's user object we care about
#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
}

/// Redirects the browser into GitHub's authorization page
pub async fn github_start(State(state): State<AppState>) -> ApiResult<Redirect> {
    let github = state
        .config
        .github
        .as_ref()
        .ok_or_else(|| ApiError::InternalError("github oauth is not configured".to_string()))?;

    let url = format!(
        "{}?client_id={}&redirect_uri={}&scope=read:user%20user:email",
        AUTHORIZE_URL, github.client_id, github.redirect_url
    );

    Ok(Redirect::temporary(&url))
}

/// Completes the OAuth dance
///
/// # Errors
///
/// - `401 unauthorized`: GitHub reported an error, the user denied access,
///   or any step of the exchange failed
pub async fn github_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Json<AuthResponse>> {
    let github = state
        .config
        .github
        .as_ref()
        .ok_or_else(|| ApiError::InternalError("github oauth is not configured".to_string()))?;

    if let Some(error) = query.error {
        tracing::info!(error = %error, "GitHub authorization denied");
        return Err(ApiError::Unauthorized("github login failed".to_string()));
    }

    let code = query
        .code
        .ok_or_else(|| ApiError::Unauthorized("github login failed".to_string()))?;

    let gh_user = exchange_code(&github.client_id, &github.client_secret, &code).await?;

    // First sight of this GitHub account is an implicit signup
    let user = match User::find_by_github_id(&state.db, gh_user.id).await? {
        Some(user) => user,
        None => {
            let email = gh_user
                .email
                .unwrap_or_else(|| format!("{}@users.noreply.github.com", gh_user.login));
            let name = gh_user.name.unwrap_or(gh_user.login);

            User::create(
                &state.db,
                CreateUser {
                    email,
                    password_hash: None,
                    name,
                    github_id: Some(gh_user.id),
                },
            )
            .await?
        }
    };

    User::update_last_login(&state.db, user.id).await?;

    let token = state.tokens.issue(user.id)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Exchanges an authorization code for the GitHub user behind it
///
/// Both HTTP round trips collapse to the same 401; nothing about which step
/// failed reaches the client.
async fn exchange_code(
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<GithubUser, ApiError> {
    let client = reqwest::Client::new();

    let token_response: AccessTokenResponse = client
        .post(ACCESS_TOKEN_URL)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
        ])
        .send()
        .await
        .map_err(|e| {
            tracing::warn!("GitHub token exchange failed: {}", e);
            ApiError::Unauthorized("github login failed".to_string())
        })?
        .json()
        .await
        .map_err(|e| {
            tracing::warn!("GitHub token response unreadable: {}", e);
            ApiError::Unauthorized("github login failed".to_string())
        })?;

    let access_token = token_response
        .access_token
        .ok_or_else(|| ApiError::Unauthorized("github login failed".to_string()))?;

    let gh_user: GithubUser = client
        .get(USER_API_URL)
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .header(reqwest::header::USER_AGENT, "tasknest-api")
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!("GitHub user fetch failed: {}", e);
            ApiError::Unauthorized("github login failed".to_string())
        })?
        .json()
        .await
        .map_err(|e| {
            tracing::warn!("GitHub user response unreadable: {}", e);
            ApiError::Unauthorized("github login failed".to_string())
        })?;

    Ok(gh_user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_query_shapes() {
        let denied: CallbackQuery =
            serde_json::from_str(r#"{"error": "access_denied"}"#).unwrap();
        assert!(denied.code.is_none());
        assert_eq!(denied.error.as_deref(), Some("access_denied"));

        let granted: CallbackQuery = serde_json::from_str(r#"{"code": "abc123"}"#).unwrap();
        assert_eq!(granted.code.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_github_user_parsing_with_nulls() {
        let gh_user: GithubUser = serde_json::from_str(
            r#"{"id": 42, "login": "octocat", "name": null, "email": null}"#,
        )
        .unwrap();

        assert_eq!(gh_user.id, 42);
        assert_eq!(gh_user.login, "octocat");
        assert!(gh_user.name.is_none());
        assert!(gh_user.email.is_none());
    }
}
