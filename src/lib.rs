use axum::{Router, http::Method, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::handler::{AppState, healthcheck};

pub mod api;
pub mod books;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod model;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/", get(healthcheck))
        .nest("/api/books", books::routes())
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}
