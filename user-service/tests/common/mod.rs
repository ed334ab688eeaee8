use std::sync::Arc;

use auth::Authenticator;
use auth::HashingParams;
use auth::ManualClock;
use auth::PasswordHasher;
use auth::SigningSecret;
use axum::body::Body;
use axum::http::header;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use chrono::Duration;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;
use user_service::domain::authentication::service::AuthenticationService;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::SqliteUserRepository;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Cheap work factor so tests do not spend seconds in argon2
pub const TEST_HASHING_PARAMS: HashingParams = HashingParams {
    memory_kib: 1024,
    iterations: 1,
    parallelism: 1,
};

/// Fresh in-memory database with the schema applied.
///
/// A single connection that never expires keeps the in-memory database alive
/// for the lifetime of the pool.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    SqliteUserRepository::new(pool.clone())
        .migrate()
        .await
        .expect("Failed to run migrations");

    pool
}

/// Test application driving the router in-process
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub pool: SqlitePool,
}

/// Status and parsed JSON body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub www_authenticate: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let pool = test_pool().await;
        let clock = Arc::new(ManualClock::starting_now());

        let secret = SigningSecret::new(TEST_SECRET).expect("Failed to build secret");
        let authenticator = Arc::new(
            Authenticator::with_clock(&secret, clock.clone())
                .with_password_hasher(
                    PasswordHasher::with_params(TEST_HASHING_PARAMS)
                        .expect("Failed to build hasher"),
                )
                .with_session_ttl(Duration::minutes(30)),
        );

        let repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));
        let authentication_service = Arc::new(AuthenticationService::new(
            repository,
            authenticator,
        ));

        Self {
            router: create_router(user_service, authentication_service),
            clock,
            pool,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let www_authenticate = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Failed to parse response")
        };

        TestResponse {
            status,
            www_authenticate,
            body,
        }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });

        self.send(
            Request::post("/users/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let form = format!("username={username}&password={password}");

        self.send(
            Request::post("/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
    }

    /// Log in and return the access token, panicking on failure
    pub async fn token_for(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["access_token"]
            .as_str()
            .expect("Missing access_token")
            .to_string()
    }

    pub async fn me(&self, authorization: Option<&str>) -> TestResponse {
        let mut request = Request::get("/users/me");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }

        self.send(request.body(Body::empty()).unwrap()).await
    }
}
