//! Application state - shared across all handlers.

use std::sync::Arc;

use folio_core::ports::{NotificationSink, PasswordService, TokenService};
use folio_core::service::Repositories;
use folio_core::{BlogService, PublicationLifecycle};
use folio_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService, LogNotificationSink};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: BlogService,
}

impl AppState {
    pub fn new(repos: Repositories, sink: Arc<dyn NotificationSink>, page_size: u64) -> Self {
        let lifecycle = PublicationLifecycle::new(sink);
        Self {
            service: BlogService::new(repos, lifecycle, page_size),
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn from_config(config: &AppConfig) -> Self {
        let repos = build_repositories(config).await;
        let sink = build_sink(config).await;

        tracing::info!("Application state initialized");
        Self::new(repos, sink, config.page_size)
    }
}

/// Token and password services handed to the auth extractors and handlers.
pub fn auth_services(config: &AppConfig) -> (Arc<dyn TokenService>, Arc<dyn PasswordService>) {
    (
        Arc::new(JwtTokenService::new(config.jwt.clone())),
        Arc::new(Argon2PasswordService::new()),
    )
}

fn in_memory() -> Repositories {
    Repositories::from_store(Arc::new(InMemoryStore::new()))
}

#[cfg(feature = "postgres")]
async fn build_repositories(config: &AppConfig) -> Repositories {
    use migration::MigratorTrait;

    let Some(db_config) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set. Running with the in-memory store.");
        return in_memory();
    };

    let db = match folio_infra::connect(db_config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory store.");
            return in_memory();
        }
    };

    if let Err(e) = migration::Migrator::up(&db, None).await {
        tracing::error!(error = %e, "Failed to apply migrations. Using in-memory store.");
        return in_memory();
    }

    folio_infra::postgres_repositories(db)
}

#[cfg(not(feature = "postgres"))]
async fn build_repositories(_config: &AppConfig) -> Repositories {
    tracing::info!("Running without postgres feature - using the in-memory store");
    in_memory()
}

#[cfg(feature = "redis")]
async fn build_sink(config: &AppConfig) -> Arc<dyn NotificationSink> {
    use folio_infra::RedisNotificationSink;

    let Some(redis_config) = config.redis.clone() else {
        return Arc::new(LogNotificationSink);
    };

    match RedisNotificationSink::new(redis_config).await {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable. Notifications go to the log.");
            Arc::new(LogNotificationSink)
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn build_sink(_config: &AppConfig) -> Arc<dyn NotificationSink> {
    Arc::new(LogNotificationSink)
}
