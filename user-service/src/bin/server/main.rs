use std::str::FromStr;
use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use chrono::Duration;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::domain::authentication::service::AuthenticationService;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::SqliteUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let secret = config.jwt.signing_secret()?;

    tracing::info!(
        database_url = %config.database.url,
        http_port = config.server.http_port,
        session_ttl_minutes = config.jwt.expiration_minutes,
        leeway_seconds = config.jwt.leeway_seconds,
        "Configuration loaded"
    );

    let connect_options =
        SqliteConnectOptions::from_str(&config.database.url)?.create_if_missing(true);
    let sqlite_pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(connect_options)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "sqlite",
        "Database connection pool created"
    );

    let user_repository = Arc::new(SqliteUserRepository::new(sqlite_pool));
    user_repository.migrate().await?;
    tracing::info!(database = "sqlite", "Database migrations completed");

    let password_hasher = PasswordHasher::with_params(config.password.hashing_params())?;
    let authenticator = Arc::new(
        Authenticator::new(&secret)
            .with_password_hasher(password_hasher)
            .with_session_ttl(Duration::minutes(config.jwt.expiration_minutes))
            .with_leeway(Duration::seconds(config.jwt.leeway_seconds))
            .with_max_concurrent_hashes(config.password.max_concurrent_hashes),
    );

    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repository),
        Arc::clone(&authenticator),
    ));
    let authentication_service = Arc::new(AuthenticationService::new(
        Arc::clone(&user_repository),
        Arc::clone(&authenticator),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authentication_service);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
