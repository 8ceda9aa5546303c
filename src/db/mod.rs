// ============================================================================
// Database Layer - connection handle and schema bootstrap
// ============================================================================
//
// `Database` wraps an sqlx AnyPool together with the dialect resolved from
// the connection URL. Every store operation checks a connection out of the
// pool for the duration of one statement or transaction; there is no shared
// process-wide connection.
//
// ============================================================================

mod dialect;
mod schema;

pub use dialect::Dialect;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::config::DatabaseConfig;
use crate::domain::order::OrderError;

/// Handle to the active backend: a connection pool plus its dialect.
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    dialect: Dialect,
}

impl Database {
    /// Connect to the configured backend. The dialect is resolved from the
    /// URL scheme before any I/O, so a misconfigured backend fails here.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, OrderError> {
        // Register the compiled-in drivers with the Any runtime; idempotent.
        sqlx::any::install_default_drivers();

        let dialect = Dialect::from_url(&config.url)?;
        let pool = AnyPoolOptions::new()
            .max_connections(config.effective_max_connections())
            .connect(&config.url)
            .await?;

        tracing::info!(
            backend = dialect.name(),
            max_connections = config.effective_max_connections(),
            "Connected to order database"
        );

        Ok(Self { pool, dialect })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Which backend this handle talks to.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Create the order tables and indexes if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), OrderError> {
        for statement in schema::statements(self.dialect) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        tracing::info!(backend = self.dialect.name(), "Order schema initialized");
        Ok(())
    }

    /// Close the pool, releasing all connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
