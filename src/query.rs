//! Catalog query pipeline
//!
//! Applies the storefront's filter/sort/paginate passes to the in-memory
//! catalog. Stages run in a fixed order; the time sort is applied after the
//! price sort, so requests carrying both come back time-ordered. Malformed
//! numeric parameters never reject a request: they are logged and treated as
//! absent.

use crate::types::{Product, ProductPage};
use serde::Deserialize;

/// Raw query parameters of `GET /api/products`. Everything is an optional
/// string so that bad input degrades instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductParams {
    pub search: Option<String>,
    pub tier: Option<String>,
    pub theme: Option<String>,
    /// "latest" | "oldest"
    pub time: Option<String>,
    /// "low-to-high" | "high-to-low"
    #[serde(rename = "priceOrder")]
    pub price_order: Option<String>,
    /// Inclusive range, "min,max"
    pub price: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Lenient positive-integer parse; anything unparseable (or zero) counts as
/// absent.
fn parse_positive(v: &Option<String>, name: &str) -> Option<usize> {
    let raw = non_empty(v)?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("Ignoring malformed {name} parameter: {raw:?}");
            None
        }
    }
}

/// Parse an inclusive "min,max" price range. The bounds are kept in the
/// order given; an inverted range simply matches nothing.
pub fn parse_price_range(raw: &str) -> Option<(f64, f64)> {
    let mut it = raw.splitn(2, ',');
    let min = it.next()?.trim().parse::<f64>().ok()?;
    let max = it.next()?.trim().parse::<f64>().ok()?;
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

/// Run the full filter/sort/paginate pipeline over the catalog.
pub fn run_query(products: &[Product], params: &ProductParams) -> ProductPage {
    let mut hits: Vec<&Product> = products.iter().collect();

    // 1. Free-text search: substring over title/tier/theme/category, OR
    if let Some(q) = non_empty(&params.search) {
        let needle = q.to_lowercase();
        hits.retain(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.tier.to_string().to_lowercase().contains(&needle)
                || p.theme.to_string().to_lowercase().contains(&needle)
                || p.category.to_lowercase().contains(&needle)
        });
    }

    // 2-3. Exact tier/theme match (case-insensitive)
    if let Some(t) = non_empty(&params.tier) {
        let want = t.to_lowercase();
        hits.retain(|p| p.tier.to_string().to_lowercase() == want);
    }
    if let Some(t) = non_empty(&params.theme) {
        let want = t.to_lowercase();
        hits.retain(|p| p.theme.to_string().to_lowercase() == want);
    }

    // 4. Price sort
    match non_empty(&params.price_order) {
        Some("low-to-high") => hits.sort_by(|a, b| a.price.total_cmp(&b.price)),
        Some("high-to-low") => hits.sort_by(|a, b| b.price.total_cmp(&a.price)),
        Some(other) => log::warn!("Ignoring unknown priceOrder token: {other:?}"),
        None => {}
    }

    // 5. Time sort; when both sorts are requested this one wins
    match non_empty(&params.time) {
        Some("latest") => hits.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        Some("oldest") => hits.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        Some(other) => log::warn!("Ignoring unknown time token: {other:?}"),
        None => {}
    }

    // 6. Exact category match (case-insensitive)
    if let Some(c) = non_empty(&params.category) {
        let want = c.to_lowercase();
        hits.retain(|p| p.category.to_lowercase() == want);
    }

    // 7. Inclusive price range
    if let Some(raw) = non_empty(&params.price) {
        match parse_price_range(raw) {
            Some((min, max)) => hits.retain(|p| p.price >= min && p.price <= max),
            None => log::warn!("Ignoring malformed price range: {raw:?}"),
        }
    }

    // 8-9. Count, then slice. Without a usable pageSize the whole filtered
    // set comes back as a single page.
    let counts = hits.len();
    let page_size = parse_positive(&params.page_size, "pageSize");
    let (data, total_pages, current_page) = match page_size {
        Some(ps) => {
            let page = parse_positive(&params.page, "page").unwrap_or(1);
            let total_pages = counts.div_ceil(ps);
            let start = (page - 1).saturating_mul(ps).min(counts);
            let end = start.saturating_add(ps).min(counts);
            (hits[start..end].to_vec(), total_pages, page)
        }
        None => (hits, 1, 1),
    };

    ProductPage {
        data: data.into_iter().cloned().collect(),
        counts,
        total_pages,
        current_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Author, OnlineStatus, Tier, Theme};
    use chrono::{TimeZone, Utc};

    fn product(id: u64, title: &str, category: &str, price: f64, age_days: i64) -> Product {
        Product {
            id,
            title: title.to_string(),
            category: category.to_string(),
            price,
            tier: Tier::Basic,
            theme: Theme::Dark,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
                - chrono::Duration::days(age_days),
            author: Author {
                name: "Tuyen Thanh".to_string(),
                avatar: String::new(),
                online_status: OnlineStatus::Online,
            },
            is_favorite: false,
        }
    }

    fn fixture() -> Vec<Product> {
        vec![
            product(1, "Ice Giant", "Art", 0.3, 3),
            product(2, "Neon Drifter", "Art", 0.1, 1),
            product(3, "Cyber Samurai", "Art", 5.0, 2),
            product(4, "Basketball Girl", "Shoes", 2.5, 0),
            product(5, "The DJ", "Music", 9.9, 10),
        ]
    }

    fn params() -> ProductParams {
        ProductParams::default()
    }

    #[test]
    fn test_no_params_returns_everything_single_page() {
        let page = run_query(&fixture(), &params());
        assert_eq!(page.counts, 5);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_search_matches_title_substring_case_insensitive() {
        let mut p = params();
        p.search = Some("giant".to_string());
        let page = run_query(&fixture(), &p);
        assert_eq!(page.counts, 1);
        assert_eq!(page.data[0].title, "Ice Giant");
    }

    #[test]
    fn test_search_matches_category_too() {
        let mut p = params();
        p.search = Some("shoes".to_string());
        let page = run_query(&fixture(), &p);
        assert_eq!(page.counts, 1);
        assert_eq!(page.data[0].id, 4);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let mut p = params();
        p.price = Some("0.1,0.3".to_string());
        let page = run_query(&fixture(), &p);
        let ids: Vec<u64> = page.data.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2]); // both bounds included
    }

    #[test]
    fn test_inverted_price_range_matches_nothing() {
        let mut p = params();
        p.price = Some("5,1".to_string());
        assert_eq!(run_query(&fixture(), &p).counts, 0);
    }

    #[test]
    fn test_malformed_price_range_is_ignored() {
        let mut p = params();
        p.price = Some("cheap,expensive".to_string());
        assert_eq!(run_query(&fixture(), &p).counts, 5);
    }

    #[test]
    fn test_price_order_low_to_high() {
        let mut p = params();
        p.price_order = Some("low-to-high".to_string());
        let page = run_query(&fixture(), &p);
        let prices: Vec<f64> = page.data.iter().map(|d| d.price).collect();
        let mut sorted = prices.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(prices, sorted);
    }

    #[test]
    fn test_time_sort_overrides_price_order() {
        let mut p = params();
        p.price_order = Some("low-to-high".to_string());
        p.time = Some("latest".to_string());
        let page = run_query(&fixture(), &p);
        let stamps: Vec<_> = page.data.iter().map(|d| d.created_at).collect();
        let mut newest_first = stamps.clone();
        newest_first.sort_by(|a, b| b.cmp(a));
        assert_eq!(stamps, newest_first, "time sort must win over price sort");
    }

    #[test]
    fn test_category_and_price_order_paged() {
        // GET /api/products?category=Art&priceOrder=low-to-high&page=1&pageSize=2
        let mut p = params();
        p.category = Some("Art".to_string());
        p.price_order = Some("low-to-high".to_string());
        p.page = Some("1".to_string());
        p.page_size = Some("2".to_string());
        let page = run_query(&fixture(), &p);
        assert_eq!(page.counts, 3); // all Art items counted before slicing
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 2);
        let prices: Vec<f64> = page.data.iter().map(|d| d.price).collect();
        assert_eq!(prices, vec![0.1, 0.3]);
    }

    #[test]
    fn test_page_past_the_end_is_empty_with_correct_counts() {
        let mut p = params();
        p.page = Some("9".to_string());
        p.page_size = Some("2".to_string());
        let page = run_query(&fixture(), &p);
        assert!(page.data.is_empty());
        assert_eq!(page.counts, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 9); // echoed back as requested
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        let mut p = params();
        p.page = Some("1".to_string());
        p.page_size = Some("2".to_string());
        assert_eq!(run_query(&fixture(), &p).total_pages, 3); // ceil(5/2)
    }

    #[test]
    fn test_malformed_page_falls_back_to_first() {
        let mut p = params();
        p.page = Some("two".to_string());
        p.page_size = Some("2".to_string());
        let page = run_query(&fixture(), &p);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.data.len(), 2);
    }

    #[test]
    fn test_same_params_twice_yield_same_result() {
        let mut p = params();
        p.search = Some("a".to_string());
        p.price_order = Some("high-to-low".to_string());
        assert_eq!(run_query(&fixture(), &p), run_query(&fixture(), &p));
    }

    #[test]
    fn test_tier_filter_is_case_insensitive() {
        let mut p = params();
        p.tier = Some("BASIC".to_string());
        assert_eq!(run_query(&fixture(), &p).counts, 5);
        p.tier = Some("deluxe".to_string());
        assert_eq!(run_query(&fixture(), &p).counts, 0);
    }
}
