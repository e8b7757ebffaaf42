//! Data-fetching seam for the filter controller
//!
//! The controller only knows the `ProductFetcher` contract: hand it criteria,
//! get a page back. `HttpFetcher` talks to a running `marketx-api` instance;
//! `LocalFetcher` runs the same pipeline in-process for offline mode and
//! tests.

use crate::catalog::Catalog;
use crate::criteria::Criteria;
use crate::query::{run_query, ProductParams};
use crate::types::ProductPage;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::Rng;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

#[async_trait]
pub trait ProductFetcher: Send + Sync {
    async fn fetch(&self, criteria: &Criteria) -> Result<ProductPage>;
}

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .expect("reqwest client")
    })
}

fn backoff_delay_ms(attempt: u32) -> u64 {
    let base = 300u64.saturating_mul(1u64 << (attempt.min(5).saturating_sub(1))); // 300,600,1200,...
    let jitter: u64 = rand::thread_rng().gen_range(0..=250);
    base + jitter
}

/// Fetches pages from a running catalog API.
#[derive(Clone)]
pub struct HttpFetcher {
    base_url: String,
    timeout_ms: u64,
    retries: u32,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64, retries: u32) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms,
            retries,
        }
    }

    fn query_pairs(params: &ProductParams) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |k: &'static str, v: &Option<String>| {
            if let Some(v) = v.as_deref().filter(|s| !s.is_empty()) {
                pairs.push((k, v.to_string()));
            }
        };
        push("search", &params.search);
        push("tier", &params.tier);
        push("theme", &params.theme);
        push("time", &params.time);
        push("priceOrder", &params.price_order);
        push("price", &params.price);
        push("category", &params.category);
        push("page", &params.page);
        push("pageSize", &params.page_size);
        pairs
    }
}

#[async_trait]
impl ProductFetcher for HttpFetcher {
    async fn fetch(&self, criteria: &Criteria) -> Result<ProductPage> {
        let url = format!("{}/api/products", self.base_url);
        let pairs = Self::query_pairs(&criteria.to_params());

        // Small, bounded retry on transient failures; off by default
        let mut attempt = 0u32;
        loop {
            let res = http_client()
                .get(&url)
                .query(&pairs)
                .timeout(Duration::from_millis(self.timeout_ms))
                .send()
                .await;

            match res {
                Ok(r) if r.status().is_success() => {
                    return r
                        .json::<ProductPage>()
                        .await
                        .map_err(|e| anyhow!("Failed to parse products response: {e}"));
                }
                Ok(r) => {
                    let status = r.status();
                    let transient = status.as_u16() == 429 || status.is_server_error();
                    if transient && attempt < self.retries {
                        attempt += 1;
                        let back_ms = backoff_delay_ms(attempt);
                        log::warn!("{status} from {url}, retry={attempt} backoff={back_ms}ms");
                        tokio::time::sleep(Duration::from_millis(back_ms)).await;
                        continue;
                    }
                    let body = r.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(anyhow!("Catalog API error ({status}): {body}"));
                }
                Err(e) => {
                    if attempt < self.retries {
                        attempt += 1;
                        let back_ms = backoff_delay_ms(attempt);
                        log::warn!("Fetch error, retry={attempt} backoff={back_ms}ms: {e}");
                        tokio::time::sleep(Duration::from_millis(back_ms)).await;
                        continue;
                    }
                    return Err(anyhow!("Failed to reach catalog API: {e}"));
                }
            }
        }
    }
}

/// Runs queries directly against an in-memory catalog, no network involved.
#[derive(Clone)]
pub struct LocalFetcher {
    catalog: Arc<Catalog>,
}

impl LocalFetcher {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ProductFetcher for LocalFetcher {
    async fn fetch(&self, criteria: &Criteria) -> Result<ProductPage> {
        Ok(run_query(self.catalog.products(), &criteria.to_params()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_fetcher_pages_through_catalog() {
        let fetcher = LocalFetcher::new(Arc::new(Catalog::generate(30, 42)));
        let mut criteria = Criteria::default();
        criteria.page_size = 10;
        let page = fetcher.fetch(&criteria).await.expect("local fetch");
        assert_eq!(page.counts, 30);
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_query_pairs_skip_empty_fields() {
        let mut criteria = Criteria::default();
        criteria.search = Some("neon".to_string());
        let pairs = HttpFetcher::query_pairs(&criteria.to_params());
        assert!(pairs.iter().any(|(k, v)| *k == "search" && v == "neon"));
        assert!(!pairs.iter().any(|(k, _)| *k == "tier"));
        // page/pageSize always ride along on fetches
        assert!(pairs.iter().any(|(k, _)| *k == "page"));
        assert!(pairs.iter().any(|(k, _)| *k == "pageSize"));
    }
}
