//! Nestora booking service: availability, pricing and booking lifecycle for
//! the rental marketplace.

use axum::{extract::State, http::Method, routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod booking;
pub mod cache;
pub mod caller;
pub mod config;
pub mod error;
pub mod listings;

use booking::FeePolicy;
use cache::AppCache;
use config::PaymentMode;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub fees: FeePolicy,
    pub payment_mode: PaymentMode,
}

/// Build the HTTP application
pub fn app(state: AppState, cors_allow_any: bool) -> Router {
    let cors = if cors_allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers(Any)
            .max_age(Duration::from_secs(60 * 60))
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health))
        .nest("/api", booking::router().merge(listings::router()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.cache.stats(),
    }))
}
