//! Mock catalog API
//!
//! A lightweight HTTP surface over the in-memory catalog:
//! - GET /health - Health check
//! - GET /api/products - Filter/sort/paginate the catalog
//!
//! Filter input never fails a request; malformed values degrade to "absent"
//! inside the query pipeline (see `query`).

use crate::catalog::Catalog;
use crate::query::{run_query, ProductParams};
use crate::types::ProductPage;
use axum::{
    extract::{Query, State},
    http::Method,
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

pub fn build_router(state: AppState) -> Router {
    // Allow any origin; this is a mock backing a local storefront
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/products", get(products_handler))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Filter/sort/paginate the catalog
async fn products_handler(
    State(state): State<AppState>,
    Query(params): Query<ProductParams>,
) -> Json<ProductPage> {
    log::debug!("Product query: {params:?}");
    let page = run_query(state.catalog.products(), &params);
    log::debug!(
        "Query matched {} products, returning page {}/{}",
        page.counts,
        page.current_page,
        page.total_pages
    );
    Json(page)
}
