/// Application state and router builder
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /api/
///     ├── /users/
///     │   ├── POST /signup           # public
///     │   ├── POST /login            # public
///     │   ├── GET/PUT /profile       # bearer
///     │   ├── PUT /password          # bearer
///     │   └── DELETE /profile        # bearer
///     ├── /auth/github[/callback]    # public (OAuth dance)
///     ├── /tasks[/:id]               # bearer
///     ├── /categories[/:id]          # bearer
///     └── /comments[...]             # bearer
/// ```
///
/// Protected sub-routers carry the auth gate as a layer; public routes never
/// see it. Tracing and CORS wrap the whole router.
use crate::{config::Config, middleware::auth::require_auth, routes};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use tasknest_shared::auth::jwt::TokenService;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; Arc keeps it cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Token issuance/verification service
    pub tokens: TokenService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state, constructing the token service from the
    /// configured secret and TTL
    pub fn new(db: PgPool, config: Config) -> Self {
        let tokens = TokenService::new(
            &config.jwt.secret,
            Duration::hours(config.jwt.token_ttl_hours),
        );

        Self {
            db,
            tokens,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public: signup/login and the OAuth dance issue tokens, they can't require one
    let public_user_routes = Router::new()
        .route("/signup", post(routes::users::signup))
        .route("/login", post(routes::users::login));

    let oauth_routes = Router::new()
        .route("/github", get(routes::oauth::github_start))
        .route("/github/callback", get(routes::oauth::github_callback));

    let protected_user_routes = Router::new()
        .route(
            "/profile",
            get(routes::users::get_profile)
                .put(routes::users::update_profile)
                .delete(routes::users::delete_account),
        )
        .route("/password", put(routes::users::change_password))
        .layer(from_fn_with_state(state.clone(), require_auth));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task).get(routes::tasks::list_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(from_fn_with_state(state.clone(), require_auth));

    let category_routes = Router::new()
        .route(
            "/",
            post(routes::categories::create_category).get(routes::categories::list_categories),
        )
        .route(
            "/:id",
            get(routes::categories::get_category)
                .put(routes::categories::update_category)
                .delete(routes::categories::delete_category),
        )
        .layer(from_fn_with_state(state.clone(), require_auth));

    let comment_routes = Router::new()
        .route("/", post(routes::comments::create_comment))
        .route("/task/:task_id", get(routes::comments::list_task_comments))
        .route(
            "/:id",
            get(routes::comments::get_comment)
                .put(routes::comments::update_comment)
                .delete(routes::comments::delete_comment),
        )
        .layer(from_fn_with_state(state.clone(), require_auth));

    let api_routes = Router::new()
        .nest("/users", public_user_routes.merge(protected_user_routes))
        .nest("/auth", oauth_routes)
        .nest("/tasks", task_routes)
        .nest("/categories", category_routes)
        .nest("/comments", comment_routes);

    // Permissive CORS in development, explicit origins otherwise
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
