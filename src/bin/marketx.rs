//! marketx - terminal client for the marketplace catalog
//!
//! One-shot mode prints the current result page (or every page with
//! `--all-pages`). Watch mode keeps the filter controller running so the
//! background refresh re-issues the query and prints changes as they land.

use anyhow::{Context, Result};
use chrono::Utc;
use marketx::catalog::Catalog;
use marketx::config::{self, Config};
use marketx::controller::FilterController;
use marketx::fetch::{HttpFetcher, LocalFetcher, ProductFetcher};
use marketx::util_text::{fit, format_price, format_when};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cfg = config::load().context("Failed to load configuration")?;

    let fetcher: Arc<dyn ProductFetcher> = if cfg.offline {
        let catalog = match &cfg.catalog_file {
            Some(path) => Catalog::from_toml_file(Path::new(path))?,
            None => Catalog::generate(cfg.catalog_size, cfg.catalog_seed),
        };
        log::info!("Offline mode: {} products in memory", catalog.len());
        Arc::new(LocalFetcher::new(Arc::new(catalog)))
    } else {
        log::info!("Catalog API: {}", cfg.api_url);
        Arc::new(HttpFetcher::new(
            &cfg.api_url,
            cfg.request_timeout_ms,
            cfg.retries,
        ))
    };

    let mut controller =
        FilterController::from_criteria(fetcher, cfg.controller.clone(), cfg.criteria.clone());

    controller.settle().await;
    if let Some(err) = controller.last_error() {
        return Err(anyhow::anyhow!("Fetch failed: {err}"));
    }

    if cfg.all_pages {
        while controller.has_more() {
            controller.load_more();
            controller.settle().await;
        }
    }

    render(&controller);

    if cfg.watch {
        watch_loop(&mut controller, &cfg).await?;
    }

    Ok(())
}

/// Re-render on every change until Ctrl+C.
async fn watch_loop(controller: &mut FilterController, cfg: &Config) -> Result<()> {
    println!(
        "\nWatching (refresh every {}s, Ctrl+C to quit)...",
        cfg.controller.refresh_interval_ms / 1000
    );
    let mut last_len = controller.products().len();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                controller.tick(Instant::now());
                controller.pump();
                if controller.products().len() != last_len {
                    last_len = controller.products().len();
                    render(controller);
                }
                if let Some(err) = controller.last_error() {
                    log::warn!("Refresh failed, showing stale data: {err}");
                }
            }
        }
    }
    Ok(())
}

fn render(controller: &FilterController) {
    let now = Utc::now();
    let link = controller.share_query();
    if link.is_empty() {
        println!("marketplace — {} matches", controller.counts());
    } else {
        println!("marketplace?{} — {} matches", link, controller.counts());
    }
    println!(
        "{} {} {} {} {} {}",
        fit("ID", 6),
        fit("TITLE", 24),
        fit("CATEGORY", 12),
        fit("TIER", 8),
        fit("PRICE", 12),
        fit("LISTED", 8),
    );
    for p in controller.products() {
        println!(
            "{} {} {} {} {} {}",
            fit(&p.id.to_string(), 6),
            fit(&p.title, 24),
            fit(&p.category, 12),
            fit(&p.tier.to_string(), 8),
            fit(&format_price(p.price), 12),
            fit(&format_when(p.created_at, now), 8),
        );
    }
    if controller.has_more() {
        println!(
            "... more available (page {} of results shown)",
            controller.criteria().page
        );
    }
}
