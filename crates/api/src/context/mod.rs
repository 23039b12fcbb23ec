//! Application context - dependency injection container

use std::sync::Arc;

use influlink_core::{InfluencerRepository, LinkService, StateTokenCodec, StatsAggregator};
use influlink_domain::{Config, InfluLinkError, Result};
use influlink_infra::{
    build_provider_registry, build_stats_aggregator, DbManager, HttpClient,
    InMemoryInfluencerRepository, SqliteInfluencerRepository, TracingLinkNotifier,
};
use tracing::{info, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    /// Present only when a database path is configured.
    pub db: Option<Arc<DbManager>>,
    pub links: Arc<LinkService>,
    pub stats: Arc<StatsAggregator>,
    admin_token: Option<blake3::Hash>,
}

impl AppContext {
    /// Wire every service from configuration.
    ///
    /// # Errors
    /// Fails when the database cannot be opened or migrated, or the HTTP
    /// client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let (db, repository) = open_repository(&config)?;
        let http = HttpClient::new()?;

        let registry = build_provider_registry(&config, &http);
        if registry.is_empty() {
            warn!("no OAuth providers configured; every authorization flow will be refused");
        }

        let tokens = StateTokenCodec::from_secret(config.security.state_secret.as_deref());
        let links = LinkService::new(
            Arc::new(registry),
            Arc::new(tokens),
            repository,
            Arc::new(TracingLinkNotifier::new()),
        );
        let stats = build_stats_aggregator(&config, &http);

        let admin_token = config
            .security
            .admin_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| blake3::hash(token.as_bytes()));
        if admin_token.is_none() {
            warn!("no admin token configured; every caller is authorized");
        }

        info!(persistent = db.is_some(), "application context ready");
        Ok(Self { config, db, links: Arc::new(links), stats: Arc::new(stats), admin_token })
    }

    /// Whether a presented bearer token grants privileged access.
    ///
    /// Compares BLAKE3 digests; `Hash` equality is constant time.
    pub fn is_authorized(&self, bearer: Option<&str>) -> bool {
        match &self.admin_token {
            None => true,
            Some(expected) => {
                bearer.is_some_and(|token| blake3::hash(token.trim().as_bytes()) == *expected)
            }
        }
    }

    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new().add_component(self.check_database_health().await);

        status = status.add_component(if self.links.registry().is_empty() {
            ComponentHealth::unhealthy("providers", "no OAuth providers configured")
        } else {
            ComponentHealth::healthy("providers")
        });

        status.calculate_score();
        status
    }

    async fn check_database_health(&self) -> ComponentHealth {
        let Some(db) = self.db.clone() else {
            return ComponentHealth::healthy("database");
        };

        match tokio::task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(err)) => ComponentHealth::unhealthy("database", err.to_string()),
            Err(err) => ComponentHealth::unhealthy("database", format!("health check task failed: {err}")),
        }
    }
}

fn open_repository(config: &Config) -> Result<(Option<Arc<DbManager>>, Arc<dyn InfluencerRepository>)> {
    let Some(path) = config.database.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
        warn!("no database path configured; influencers are kept in memory only");
        return Ok((None, Arc::new(InMemoryInfluencerRepository::new())));
    };

    let db = Arc::new(DbManager::new(path, config.database.pool_size.max(1))?);
    db.run_migrations()
        .map_err(|err| InfluLinkError::Database(format!("migrations failed for {path}: {err}")))?;
    info!(path, "influencer store opened");

    let repository = Arc::new(SqliteInfluencerRepository::new(Arc::clone(&db)));
    Ok((Some(db), repository))
}
