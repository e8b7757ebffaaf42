//! Pipeline properties over a generated catalog.

use marketx::catalog::Catalog;
use marketx::query::{run_query, ProductParams};

fn catalog() -> Catalog {
    Catalog::generate(120, 99)
}

#[test]
fn price_range_returns_only_products_inside_the_bounds() {
    let cat = catalog();
    let mut params = ProductParams::default();
    params.price = Some("10,50".to_string());
    let page = run_query(cat.products(), &params);
    assert!(page.counts > 0, "seeded catalog should have mid-priced items");
    for p in &page.data {
        assert!(
            (10.0..=50.0).contains(&p.price),
            "price {} outside [10, 50]",
            p.price
        );
    }
}

#[test]
fn every_title_substring_finds_its_product() {
    let cat = catalog();
    for target in cat.products().iter().take(20) {
        // A case-scrambled slice of the title
        let needle = target.title[..target.title.len().min(8)].to_uppercase();
        let mut params = ProductParams::default();
        params.search = Some(needle.clone());
        let page = run_query(cat.products(), &params);
        assert!(
            page.data.iter().any(|p| p.id == target.id),
            "search {needle:?} should surface product {}",
            target.id
        );
    }
}

#[test]
fn latest_sort_is_non_increasing() {
    let cat = catalog();
    let mut params = ProductParams::default();
    params.time = Some("latest".to_string());
    let page = run_query(cat.products(), &params);
    for pair in page.data.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[test]
fn low_to_high_sort_is_non_decreasing() {
    let cat = catalog();
    let mut params = ProductParams::default();
    params.price_order = Some("low-to-high".to_string());
    let page = run_query(cat.products(), &params);
    for pair in page.data.windows(2) {
        assert!(pair[0].price <= pair[1].price);
    }
}

#[test]
fn pagination_covers_the_filtered_set_exactly_once() {
    let cat = catalog();
    let mut params = ProductParams::default();
    params.tier = Some("premium".to_string());
    params.page_size = Some("7".to_string());

    let full = run_query(cat.products(), &ProductParams {
        tier: Some("premium".to_string()),
        ..ProductParams::default()
    });

    let mut collected = Vec::new();
    let total_pages = full.counts.div_ceil(7);
    for page_no in 1..=total_pages {
        params.page = Some(page_no.to_string());
        let page = run_query(cat.products(), &params);
        assert_eq!(page.total_pages, total_pages);
        assert!(page.data.len() <= 7);
        collected.extend(page.data.into_iter().map(|p| p.id));
    }

    let expected: Vec<u64> = full.data.iter().map(|p| p.id).collect();
    assert_eq!(collected, expected, "pages concatenate to the filtered set");
}

#[test]
fn tier_filter_matches_exactly() {
    let cat = catalog();
    let mut params = ProductParams::default();
    params.tier = Some("DELUXE".to_string());
    let page = run_query(cat.products(), &params);
    assert!(page.counts > 0);
    for p in &page.data {
        assert_eq!(p.tier.to_string(), "Deluxe");
    }
}
