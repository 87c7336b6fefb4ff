mod handlers;
mod middleware;

pub use middleware::{RateLimiter, SecurityConfig};

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::Database;

/// Router with security settings taken from the environment.
pub fn create_router(db: Database) -> Router {
    create_router_with_config(db, SecurityConfig::from_env())
}

pub fn create_router_with_config(db: Database, config: SecurityConfig) -> Router {
    let mut protected = Router::new()
        // Lists
        .route("/lists", get(handlers::list_lists).post(handlers::create_list))
        .route(
            "/lists/{id}",
            get(handlers::get_list)
                .put(handlers::update_list)
                .delete(handlers::delete_list),
        )
        // Items
        .route("/items", post(handlers::create_item))
        .route("/items/move", post(handlers::move_item))
        .route(
            "/items/{id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        // Tagged mutations
        .route("/mutations", post(handlers::apply_mutation));

    if let Some(limiter) = config.rate_limiter.clone() {
        protected =
            protected.route_layer(from_fn_with_state(limiter, middleware::rate_limit_middleware));
    }
    let protected =
        protected.route_layer(from_fn_with_state(config.clone(), middleware::auth_middleware));

    // Health stays reachable without credentials.
    let api = protected.route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config)),
        )
        .with_state(db)
}

fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}
