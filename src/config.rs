use anyhow::{anyhow, Result};
use clap::Parser;

use crate::controller::ControllerConfig;
use crate::criteria::{Criteria, PriceOrder, TimeOrder};
use crate::query::parse_price_range;

/// marketx - Marketplace Catalog Browser
///
/// Terminal client for the marketx catalog API.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "marketx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Marketplace Catalog Browser", long_about = None)]
pub struct CliArgs {
    /// Catalog API base URL
    #[arg(long, env = "MARKETX_API_URL")]
    pub api_url: Option<String>,

    /// Run against a locally generated catalog instead of the API
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// Size of the generated catalog in offline mode (1-100000)
    #[arg(long, env = "CATALOG_SIZE")]
    pub catalog_size: Option<usize>,

    /// Seed for the generated catalog in offline mode
    #[arg(long, env = "CATALOG_SEED")]
    pub catalog_seed: Option<u64>,

    /// TOML fixture file to load the offline catalog from
    #[arg(long, env = "CATALOG_FILE")]
    pub catalog_file: Option<String>,

    /// Request timeout in milliseconds (1000-60000)
    #[arg(long, env = "REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Retry attempts for failed fetches (0-10)
    #[arg(long, env = "FETCH_RETRIES")]
    pub retries: Option<u32>,

    /// Search box debounce in milliseconds (0-5000)
    #[arg(long, env = "DEBOUNCE_MS")]
    pub debounce_ms: Option<u64>,

    /// Background refresh interval in milliseconds (5000-600000)
    #[arg(long, env = "REFRESH_INTERVAL_MS")]
    pub refresh_interval_ms: Option<u64>,

    /// Products per page (1-100)
    #[arg(long, env = "PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Hydrate filters from a share link or query string
    #[arg(long)]
    pub link: Option<String>,

    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by tier (basic, premium, deluxe)
    #[arg(long)]
    pub tier: Option<String>,

    /// Filter by theme (dark, light, colorful, halloween)
    #[arg(long)]
    pub theme: Option<String>,

    /// Filter by category
    #[arg(long)]
    pub category: Option<String>,

    /// Sort by creation time: latest or oldest
    #[arg(long, value_parser = clap::value_parser!(TimeOrder))]
    pub time: Option<TimeOrder>,

    /// Sort by price: low-to-high or high-to-low
    #[arg(long, value_parser = clap::value_parser!(PriceOrder))]
    pub price_order: Option<PriceOrder>,

    /// Inclusive price range, "min,max"
    #[arg(long)]
    pub price_range: Option<String>,

    /// Page to start from (1-based)
    #[arg(long)]
    pub page: Option<usize>,

    /// Keep fetching pages until the filtered set is exhausted
    #[arg(long, default_value_t = false)]
    pub all_pages: bool,

    /// Keep running: re-issue the current query periodically
    #[arg(long, default_value_t = false)]
    pub watch: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub offline: bool,
    pub catalog_size: usize,
    pub catalog_seed: u64,
    pub catalog_file: Option<String>,
    pub request_timeout_ms: u64,
    pub retries: u32,
    pub controller: ControllerConfig,
    pub criteria: Criteria,
    pub all_pages: bool,
    pub watch: bool,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Load configuration from CLI args and environment variables
pub fn load() -> Result<Config> {
    let args = CliArgs::parse();
    from_args(args)
}

pub fn from_args(args: CliArgs) -> Result<Config> {
    let api_url = args
        .api_url
        .unwrap_or_else(|| "http://127.0.0.1:5000".to_string());
    validate_url(&api_url, "MARKETX_API_URL")?;

    let catalog_size = validate_in_range(
        args.catalog_size.unwrap_or(200),
        1,
        100_000,
        "CATALOG_SIZE",
    )?;

    let request_timeout_ms = validate_in_range(
        args.request_timeout_ms.unwrap_or(8000),
        1000,
        60_000,
        "REQUEST_TIMEOUT_MS",
    )?;

    let retries = validate_in_range(args.retries.unwrap_or(0), 0, 10, "FETCH_RETRIES")?;

    let debounce_ms = validate_in_range(args.debounce_ms.unwrap_or(500), 0, 5000, "DEBOUNCE_MS")?;

    let refresh_interval_ms = validate_in_range(
        args.refresh_interval_ms.unwrap_or(60_000),
        5000,
        600_000,
        "REFRESH_INTERVAL_MS",
    )?;

    let page_size = validate_in_range(args.page_size.unwrap_or(12), 1, 100, "PAGE_SIZE")?;

    // Filters: hydrate from the link first, explicit flags win on top
    let mut criteria = args
        .link
        .as_deref()
        .map(Criteria::from_query_string)
        .unwrap_or_default();
    criteria.page_size = page_size;
    if let Some(s) = args.search {
        criteria.search = Some(s);
    }
    if let Some(t) = args.tier {
        criteria.tier = Some(t);
    }
    if let Some(t) = args.theme {
        criteria.theme = Some(t);
    }
    if let Some(c) = args.category {
        criteria.category = Some(c);
    }
    if let Some(t) = args.time {
        criteria.time = Some(t);
    }
    if let Some(o) = args.price_order {
        criteria.price_order = Some(o);
    }
    if let Some(raw) = args.price_range {
        let (min, max) = parse_price_range(&raw)
            .ok_or_else(|| anyhow!("Invalid price range '{raw}'. Expected \"min,max\""))?;
        criteria.set_price_range(min, max);
    }
    if let Some(p) = args.page {
        criteria.page = validate_in_range(p, 1, usize::MAX, "page")?;
    }

    Ok(Config {
        api_url,
        offline: args.offline,
        catalog_size,
        catalog_seed: args.catalog_seed.unwrap_or(1337),
        catalog_file: args.catalog_file,
        request_timeout_ms,
        retries,
        controller: ControllerConfig {
            debounce_ms,
            refresh_interval_ms,
            page_size,
        },
        criteria,
        all_pages: args.all_pages,
        watch: args.watch,
    })
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> Result<Config> {
        from_args(CliArgs::parse_from(argv))
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&["marketx"]).unwrap();
        assert_eq!(cfg.api_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.controller.debounce_ms, 500);
        assert_eq!(cfg.controller.refresh_interval_ms, 60_000);
        assert_eq!(cfg.criteria, Criteria::default());
    }

    #[test]
    fn test_flags_override_link() {
        let cfg = parse(&[
            "marketx",
            "--link",
            "?search=neon&category=Art",
            "--category",
            "Shoes",
        ])
        .unwrap();
        assert_eq!(cfg.criteria.search.as_deref(), Some("neon"));
        assert_eq!(cfg.criteria.category.as_deref(), Some("Shoes"));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(parse(&["marketx", "--request-timeout-ms", "10"]).is_err());
        assert!(parse(&["marketx", "--page-size", "0"]).is_err());
    }

    #[test]
    fn test_bad_price_range_rejected() {
        assert!(parse(&["marketx", "--price-range", "cheap"]).is_err());
    }
}
