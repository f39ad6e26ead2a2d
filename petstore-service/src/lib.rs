//! # petstore-service
//!
//! REST service for a pet store: pets, purchase orders and users, stored in
//! SQLite.
//!
//! ## Features
//!
//! - **Pets**: CRUD, search by status or tag, form updates, image upload
//! - **Store**: orders and a per-status pet inventory
//! - **Users**: CRUD keyed by username, transactional batch create, login
//! - **Middleware stack**: request ids, sensitive header masking, body size
//!   limits, request timeout, CORS, panic recovery
//! - **Health checks**: liveness and readiness probes
//! - **Graceful shutdown**: SIGTERM and SIGINT drain in-flight requests, then
//!   the store is closed
//!
//! ## Example
//!
//! ```rust,no_run
//! use petstore_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let db = Database::open(&config.database).await?;
//!     let app = app(AppState::new(config.clone(), db.clone()));
//!
//!     let served = Server::new(config).serve(app).await;
//!     db.close().await;
//!     served
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repository;
pub mod server;
pub mod state;

/// Common imports for binaries and tests
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, MiddlewareConfig, ServiceConfig};
    pub use crate::database::Database;
    pub use crate::error::{DatabaseError, Error, ErrorResponse, Result};
    pub use crate::health::{health, readiness};
    pub use crate::ids::RequestId;
    pub use crate::models::{Category, Inventory, Order, Pet, Tag, UploadedFile, User};
    pub use crate::observability::{init_tracing, shutdown_tracing};
    pub use crate::repository::{OrderRepository, PetRepository, UserRepository};
    pub use crate::server::{app, Server};
    pub use crate::state::AppState;

    pub use axum::{
        extract::{Path, Query, State},
        routing::{delete, get, post, put},
        Json, Router,
    };
    pub use tokio;
    pub use tracing::{debug, error, info, instrument, trace, warn};
}
