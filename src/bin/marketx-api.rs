//! Mock catalog API server for the marketx storefront
//!
//! Serves an in-memory product catalog generated at startup (or loaded from
//! a TOML fixture) behind a small HTTP API.
//!
//! ## Endpoints
//! - GET /health - Health check
//! - GET /api/products - Filter/sort/paginate the catalog
//!
//! ## Usage
//! ```bash
//! cargo run --bin marketx-api
//! ```

use marketx::catalog::Catalog;
use marketx::server::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    let catalog_size: usize = std::env::var("CATALOG_SIZE")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(200);

    let catalog_seed: u64 = std::env::var("CATALOG_SEED")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1337);

    let catalog_file = std::env::var("CATALOG_FILE").ok().map(PathBuf::from);

    let catalog = match &catalog_file {
        Some(path) => Catalog::from_toml_file(path)?,
        None => Catalog::generate(catalog_size, catalog_seed),
    };

    log::info!("🛍️ marketx catalog API");
    match &catalog_file {
        Some(path) => log::info!("Catalog: {} products from {}", catalog.len(), path.display()),
        None => log::info!(
            "Catalog: {} generated products (seed {})",
            catalog.len(),
            catalog_seed
        ),
    }
    log::info!("Port: {}", port);

    let app = build_router(AppState {
        catalog: Arc::new(catalog),
    });

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
