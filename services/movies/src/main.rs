use anyhow::Result;
use common::database::DatabaseConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use movies::{
    AppState,
    auth::AuthGate,
    config::Settings,
    create_router, fixtures,
    jwt::{JwtConfig, JwtService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting movies service");

    let settings = Settings::from_env()?;

    // Initialize the auth gate
    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let protected = settings.protected_capabilities()?;
    let credentials = settings.login_credentials();
    if credentials.is_none() {
        info!("MOVIES_LOGIN_USER/MOVIES_LOGIN_PASSWORD not set, login is disabled");
    }
    let auth_gate = AuthGate::new(jwt_service, protected, credentials);

    // Initialize database connection pool and schema
    let db_config = DatabaseConfig::from_env()?;
    let app_state = AppState::connect(&db_config, auth_gate).await?;

    if settings.seed_fixtures {
        app_state
            .movie_repository
            .seed_if_empty(&fixtures::seed_movies())
            .await?;
    }

    info!("Movies service initialized successfully");

    // Start the web server
    let app = create_router(app_state);

    let addr = settings.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Movies service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
