//! Shared application state.

use crate::config::ServerConfig;
use crate::db::{self, repo};
use crate::export::ExportJob;
use crate::storage::{BlobStorage, LocalStorage};
use anyhow::Result;
use inkwell_policy::RoleRegistry;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<ServerConfig>,
    pub roles: Arc<RoleRegistry>,
    pub storage: Arc<dyn BlobStorage>,
    pub exports: ExportJob,
}

impl AppState {
    /// Connect, migrate, seed and load the role registry.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let pool = db::create_pool(&config.database).await?;

        if config.database.run_migrations {
            db::run_migrations(&pool).await?;
        } else {
            let pending = db::pending_migrations(&pool).await?;
            if !pending.is_empty() {
                warn!(?pending, "Database has unapplied migrations");
            }
        }
        db::ensure_admin(&pool, &config.seed).await?;

        let purged = repo::tokens::purge_expired(&pool).await?;
        if purged > 0 {
            info!(purged, "Purged expired revoked tokens");
        }

        let roles = repo::roles::load_registry(&pool).await?;
        let storage = LocalStorage::new(&config.storage.root, &config.storage.public_url);
        info!(root = %storage.root().display(), "File storage ready");

        Ok(Self::from_parts(pool, config, roles, Arc::new(storage)))
    }

    pub fn from_parts(
        db: PgPool,
        config: ServerConfig,
        roles: RoleRegistry,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            exports: ExportJob::new(db.clone(), storage.clone()),
            db,
            config: Arc::new(config),
            roles: Arc::new(roles),
            storage,
        }
    }
}
