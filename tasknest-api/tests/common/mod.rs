/// Common test utilities for integration tests
///
/// Shared infrastructure for the API integration suite:
/// - test database setup (DATABASE_URL) with migrations applied
/// - a router wired to a short-TTL token service
/// - request helpers that drive the router directly via tower
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::PgPool;
use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use tower::ServiceExt as _;
use uuid::Uuid;

/// Signing secret shared by the app under test and the helpers below
pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Token lifetime in the test configuration
pub const TEST_TTL_HOURS: i64 = 1;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Creates a new test context against the database at DATABASE_URL
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for integration tests");

        let db = PgPool::connect(&database_url).await?;

        // Path relative to the crate manifest, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_SECRET.to_string(),
                token_ttl_hours: TEST_TTL_HOURS,
            },
            github: None,
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext { db, app })
    }

    /// Sends a request through the router and returns status + parsed body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Signs up a fresh user and returns their bearer token and user object
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> (String, serde_json::Value) {
        let (status, body) = self
            .request(
                "POST",
                "/api/users/signup",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                    "name": name,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);

        let token = body["token"].as_str().unwrap().to_string();
        (token, body["user"].clone())
    }

    /// Removes a test user; owned resources go with it via cascade
    pub async fn delete_user_by_email(&self, email: &str) {
        sqlx::query("DELETE FROM users WHERE email = LOWER($1)")
            .bind(email)
            .execute(&self.db)
            .await
            .expect("cleanup failed");
    }
}

/// Generates an email no other test run will have used
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}
