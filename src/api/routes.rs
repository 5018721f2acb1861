use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::store::Store;

/// Build the API router. Generic over the store so the same routes run
/// against Postgres in production and the in-memory store in tests.
pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Configurations
        .route(
            "/configs",
            get(handlers::list_configs::<S>).post(handlers::create_config::<S>),
        )
        .route(
            "/configs/:id",
            get(handlers::get_config::<S>).put(handlers::update_config::<S>),
        )
        // Tags
        .route(
            "/tags",
            get(handlers::list_tags::<S>).post(handlers::create_tag::<S>),
        )
        .route("/tags/:name", get(handlers::get_tag::<S>))
        // Surveys
        .route(
            "/surveys",
            get(handlers::list_surveys::<S>).post(handlers::create_survey::<S>),
        )
        .route("/surveys/conclude", put(handlers::conclude_survey::<S>))
        .route("/surveys/:id", get(handlers::get_survey::<S>))
        .route("/surveys/:id/delivery", get(handlers::deliver_survey::<S>))
        // The widget is embedded on third-party pages
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_router_builds() {
        let store = Arc::new(MemoryStore::new());
        let _app: Router = create_router::<MemoryStore>().with_state(store);
    }

    #[test]
    fn test_router_is_cloneable_for_serving() {
        let store = Arc::new(MemoryStore::new());
        let app: Router = create_router::<MemoryStore>().with_state(store);
        let _clone = app.clone();
    }
}
