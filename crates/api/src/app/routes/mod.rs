use axum::{routing::get, Router};

pub mod resources;
pub mod seed;
pub mod system;

/// Router for the catalog endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/resources", resources::router())
        .route("/inject", get(seed::inject))
}
