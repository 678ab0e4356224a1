pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// The full HTTP application. Every route runs behind the authenticator,
/// which resolves the caller for the handlers' role checks.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(product_routes())
        .merge(category_routes())
        .merge(country_routes())
        .merge(payment_method_routes())
        .merge(order_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ))
        .with_state(state);

    let config = config::config();
    let router = if config.security.enable_cors {
        router.layer(cors_layer(&config.security.cors_origins))
    } else {
        router
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Permissive unless specific origins are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| !o.is_empty() && o.as_str() != "*")
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

fn product_routes() -> Router<AppState> {
    use handlers::products::*;

    Router::new()
        .route("/products", get(product_search).post(product_create))
        .route(
            "/products/:id",
            get(product_get).put(product_update).delete(product_delete),
        )
}

fn category_routes() -> Router<AppState> {
    use handlers::categories::*;

    Router::new()
        .route("/categories", get(category_list).post(category_create))
        .route(
            "/categories/:id",
            get(category_get).put(category_update).delete(category_delete),
        )
        .route("/categories/:id/subtree", get(category_subtree))
}

fn country_routes() -> Router<AppState> {
    use handlers::countries::*;

    Router::new()
        .route("/countries", get(country_list).post(country_create))
        .route(
            "/countries/:id",
            get(country_get).put(country_update).delete(country_delete),
        )
}

fn payment_method_routes() -> Router<AppState> {
    use handlers::payment_methods::*;

    Router::new()
        .route("/payment-methods", get(payment_method_list).post(payment_method_create))
        .route(
            "/payment-methods/:id",
            get(payment_method_get)
                .put(payment_method_update)
                .delete(payment_method_delete),
        )
}

fn order_routes() -> Router<AppState> {
    use handlers::orders::*;

    Router::new()
        .route("/orders", get(order_search).post(order_place))
        // Static segment wins over `:id`
        .route("/orders/mine", get(order_list_own))
        .route("/orders/:id", get(order_get))
        .route("/orders/:id/complete", post(order_complete))
}
