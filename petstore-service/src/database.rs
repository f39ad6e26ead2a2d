//! SQLite storage handle
//!
//! [`Database`] is opened once before serving begins and closed once after the
//! server stops. Foreign keys are enforced on every connection and the
//! embedded migrations are applied on open, in file-name order.

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use std::str::FromStr;

use crate::{
    config::DatabaseConfig,
    error::{DatabaseError, DatabaseOperation, Result},
};

/// Schema migrations embedded at compile time
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Shared handle to the store
///
/// Cloning is cheap; all clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the store described by `config` and apply migrations
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let pool = create_pool(config).await?;

        MIGRATOR.run(&pool).await.map_err(DatabaseError::from)?;
        tracing::info!(
            migrations = MIGRATOR.iter().count(),
            "Database migrations applied"
        );

        Ok(Self { pool })
    }

    /// In-memory store with the schema applied
    pub async fn in_memory() -> Result<Self> {
        Self::open(&DatabaseConfig::in_memory()).await
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap round-trip used by the readiness probe
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Connect))?;
        Ok(())
    }

    /// Close every connection; in-flight queries finish first
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connections closed");
    }
}

/// Create the SQLite pool
///
/// An in-memory database lives exactly as long as its connection, so that
/// case gets one connection that is never reaped or recycled.
async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = connect_options(config)?;

    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
    };

    let pool = pool_options
        .acquire_timeout(config.connection_timeout())
        .connect_with(options)
        .await
        .map_err(|e| {
            DatabaseError::from(e)
                .during(DatabaseOperation::Connect)
                .add_context(config.path.clone())
        })?;

    tracing::info!(
        path = %config.path,
        max_connections = pool.options().get_max_connections(),
        "Database connection pool created"
    );

    Ok(pool)
}

fn connect_options(config: &DatabaseConfig) -> Result<SqliteConnectOptions> {
    let options = if config.is_in_memory() {
        SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            DatabaseError::from(e).during(DatabaseOperation::Connect)
        })?
    } else {
        SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
    };

    Ok(options.foreign_keys(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_names(db: &Database) -> Vec<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name != 'sqlite_sequence' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_schema() {
        let db = Database::in_memory().await.unwrap();
        assert_eq!(
            table_names(&db).await,
            vec!["orders", "pet_tags", "pets", "tags", "users"]
        );
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = Database::in_memory().await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);

        let orphan = sqlx::query("INSERT INTO pet_tags (pet_id, tag_id) VALUES (42, 42)")
            .execute(db.pool())
            .await;
        assert!(orphan.is_err());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("petstore.db").display().to_string(),
            ..DatabaseConfig::default()
        };

        let db = Database::open(&config).await.unwrap();
        sqlx::query("INSERT INTO pets (name, status) VALUES ('Fido', 'available')")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;

        // Reopening re-runs the migrator, which skips what is already applied.
        let db = Database::open(&config).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pets")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        db.close().await;
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_error() {
        let db = Database::in_memory().await.unwrap();
        db.close().await;
        let err = db.ping().await.unwrap_err();
        assert_eq!(err.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
