//! rampart library - HTTP handlers and application setup.
//!
//! this crate provides the http server and cli for the rampart rule
//! control plane:
//! - [`handlers`]: http request handlers for the authoring api
//! - [`cli`]: command-line interface implementation

#![warn(missing_docs)]

/// command-line interface implementation.
pub mod cli;
/// http request handlers for the authoring api.
pub mod handlers;

use axum::{Router, routing::get};
use rampart_db::RampartDb;
use rampart_rules::RuleEngine;
use rampart_types::Config;

/// shared state for all http handlers.
#[derive(Clone)]
pub struct AppState {
    /// database connection for persistent storage.
    pub db: RampartDb,
    /// rule authoring and propagation engine.
    pub engine: RuleEngine<RampartDb>,
    /// server configuration.
    pub config: Config,
}

/// create the axum application with all routes.
pub fn create_app(db: RampartDb, config: Config) -> Router {
    let state = AppState {
        engine: RuleEngine::new(db.clone()),
        db,
        config,
    };

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", handlers::api_v1::router())
        .with_state(state)
}
