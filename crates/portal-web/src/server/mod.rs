//! Server setup and initialization
//!
//! Provides the application builder, dependency wiring and the server runner.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use portal_cache::{MemorySessionStore, RedisPool, RedisPoolConfig, RedisSessionStore};
use portal_common::{AppConfig, AppError, PasswordResetTokens, SessionBackend};
use portal_core::{SessionStore, User};
use portal_db::{
    create_pool, run_migrations, MemoryDatabase, PgAuditLogRepository, PgPool,
    PgProfileRepository, PgUserRepository, PoolConfig,
};
use portal_service::{mailer_from_config, Mailer, ServiceContextBuilder, UserService};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;
use crate::templates::Templates;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config().server.request_timeout_secs);
    let router = create_router().merge(health_routes());
    let router = apply_middleware(router, timeout);
    router.with_state(state)
}

async fn connect_database(config: &AppConfig) -> Result<PgPool, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");
    Ok(pool)
}

fn reset_tokens(config: &AppConfig) -> Arc<PasswordResetTokens> {
    Arc::new(PasswordResetTokens::new(
        &config.security.secret_key,
        config.security.password_reset_timeout,
    ))
}

fn templates(config: &AppConfig) -> Result<Templates, AppError> {
    Templates::new(&config.app.name).map_err(|e| AppError::Template(e.to_string()))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let pool = connect_database(&config).await?;

    let mut builder = ServiceContextBuilder::new();
    let session_store: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => {
            let redis_config = config
                .redis
                .as_ref()
                .ok_or_else(|| AppError::Config("REDIS_URL is required for Redis sessions".into()))?;

            info!("Connecting to Redis...");
            let redis_pool = RedisPool::new(RedisPoolConfig::from(redis_config))
                .map_err(|e| AppError::Cache(e.to_string()))?;
            info!("Redis connection established");

            builder = builder.redis_pool(Arc::new(redis_pool.clone()));
            Arc::new(RedisSessionStore::new(redis_pool, config.session.cookie_age))
        }
        SessionBackend::Memory => {
            info!("Using in-process session store");
            Arc::new(MemorySessionStore::new(config.session.cookie_age))
        }
    };

    let mailer = mailer_from_config(&config.mail).map_err(|e| AppError::Mail(e.to_string()))?;

    let service_context = builder
        .pool(pool.clone())
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .profile_repo(Arc::new(PgProfileRepository::new(pool.clone())))
        .audit_repo(Arc::new(PgAuditLogRepository::new(pool)))
        .session_store(session_store)
        .reset_tokens(reset_tokens(&config))
        .mailer(mailer)
        .mail_from(config.mail.from_address.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let templates = templates(&config)?;
    Ok(AppState::new(service_context, config, templates))
}

/// AppState over in-memory stores and the given mailer
///
/// Nothing outlives the process; used by the end-to-end tests and for
/// trying the portal without PostgreSQL or Redis.
pub fn create_memory_app_state(
    config: AppConfig,
    mailer: Arc<dyn Mailer>,
) -> Result<AppState, AppError> {
    let db = MemoryDatabase::new();

    let service_context = ServiceContextBuilder::new()
        .user_repo(Arc::new(db.clone()))
        .profile_repo(Arc::new(db.clone()))
        .audit_repo(Arc::new(db))
        .session_store(Arc::new(MemorySessionStore::new(config.session.cookie_age)))
        .reset_tokens(reset_tokens(&config))
        .mailer(mailer)
        .mail_from(config.mail.from_address.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let templates = templates(&config)?;
    Ok(AppState::new(service_context, config, templates))
}

/// Run the HTTP server on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Bind `addr` and run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, app).await
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state);
    run_server(app, addr).await
}

/// Apply pending SQL migrations
pub async fn migrate(config: &AppConfig) -> Result<(), AppError> {
    let pool = connect_database(config).await?;
    let dir = Path::new(&config.database.migrations_dir);

    info!(dir = %dir.display(), "Running migrations");
    run_migrations(&pool, dir)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("Migrations applied");
    Ok(())
}

/// Create an active superuser with a usable password
pub async fn create_superuser(
    config: AppConfig,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let state = create_app_state(config).await?;
    let user = UserService::new(state.service_context())
        .create_superuser(username, email, password)
        .await?;
    info!(user_id = %user.id, username = %user.username, "Superuser created");
    Ok(user)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
