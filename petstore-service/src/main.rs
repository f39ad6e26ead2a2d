//! petstore-service binary
//!
//! Loads configuration, opens the store, serves until SIGINT/SIGTERM, then
//! closes the store.

use anyhow::Context;
use petstore_service::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    init_tracing(&config)?;

    tracing::info!(path = %config.database.path, "Opening database");
    let db = Database::open(&config.database)
        .await
        .context("opening database")?;

    let app = app(AppState::new(config.clone(), db.clone()));
    let served = Server::new(config).serve(app).await;

    db.close().await;
    shutdown_tracing();

    served.context("serving HTTP")
}
