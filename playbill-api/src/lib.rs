//! playbill-api library - theatre graph service
//!
//! Records materials, productions, venues, people, companies, characters and
//! awards as a property graph in SQLite and serves create/edit/show/list/
//! delete contracts for each collection over HTTP.

use std::sync::Arc;

use axum::Router;
use playbill_common::{IdGenerator, RandomIds};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Identity source for newly created entities
    pub ids: Arc<dyn IdGenerator>,
}

impl AppState {
    /// Create application state with random v4 identities
    pub fn new(db: SqlitePool) -> Self {
        Self::with_ids(db, Arc::new(RandomIds))
    }

    /// Create application state with a specific identity source
    pub fn with_ids(db: SqlitePool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { db, ids }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::material_routes())
        .merge(api::production_routes())
        .merge(api::venue_routes())
        .merge(api::person_routes())
        .merge(api::company_routes())
        .merge(api::character_routes())
        .merge(api::award_routes())
        .merge(api::award_ceremony_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
