//! Database access: pool, migrations, health, seeding and repositories.

pub mod health;
pub mod import_store;
pub mod migration;
pub mod pool;
pub mod repo;
pub mod seed;

pub use health::{check_health, DbHealth};
pub use import_store::PgImportStore;
pub use migration::{pending_migrations, run_migrations};
pub use pool::{create_pool, lazy_pool, pool_stats, verify_connection, PoolStats};
pub use seed::ensure_admin;
