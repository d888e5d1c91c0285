use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all catalog endpoints.
pub fn build_router(state: AppState) -> Router {
    let products = Router::new()
        .route(
            "/products",
            get(handler::list_products)
                .post(handler::create_products)
                .put(handler::update_products),
        )
        .route("/products/compare", post(handler::compare_products))
        .route(
            "/products/:id",
            get(handler::get_product).delete(handler::delete_product),
        );

    Router::new()
        .route("/health", get(handler::health_handler))
        .nest("/api/v1", products)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
