//! Filter criteria and its shareable-link projection
//!
//! `Criteria` is the single source of truth for what the storefront is
//! showing. The query string is only ever a derived projection of it: it is
//! read back exactly once, when a controller is hydrated from a pasted link,
//! and written on every committed change. Value equality of two `Criteria`
//! is the query key used to decide whether a refetch is needed.

use crate::query::{parse_price_range, ProductParams};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOrder {
    Latest,
    Oldest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOrder {
    LowToHigh,
    HighToLow,
}

impl fmt::Display for TimeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOrder::Latest => write!(f, "latest"),
            TimeOrder::Oldest => write!(f, "oldest"),
        }
    }
}

impl fmt::Display for PriceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceOrder::LowToHigh => write!(f, "low-to-high"),
            PriceOrder::HighToLow => write!(f, "high-to-low"),
        }
    }
}

impl FromStr for TimeOrder {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "latest" => Ok(TimeOrder::Latest),
            "oldest" => Ok(TimeOrder::Oldest),
            _ => Err(anyhow::anyhow!(
                "Invalid time order '{s}'. Valid options: latest, oldest"
            )),
        }
    }
}

impl FromStr for PriceOrder {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "low-to-high" => Ok(PriceOrder::LowToHigh),
            "high-to-low" => Ok(PriceOrder::HighToLow),
            _ => Err(anyhow::anyhow!(
                "Invalid price order '{s}'. Valid options: low-to-high, high-to-low"
            )),
        }
    }
}

/// The current filter/sort/page selections. Absent fields mean
/// "no constraint".
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    pub search: Option<String>,
    pub tier: Option<String>,
    pub theme: Option<String>,
    pub category: Option<String>,
    pub time: Option<TimeOrder>,
    pub price_order: Option<PriceOrder>,
    /// Ascending (min, max), normalized on set.
    pub price_range: Option<(f64, f64)>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            search: None,
            tier: None,
            theme: None,
            category: None,
            time: None,
            price_order: None,
            price_range: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Criteria {
    /// Store a price range with the bounds normalized ascending, so slider
    /// handles can be dragged past each other without producing an empty
    /// range.
    pub fn set_price_range(&mut self, a: f64, b: f64) {
        self.price_range = Some((a.min(b), a.max(b)));
    }

    /// Project into the wire parameters of `GET /api/products`.
    pub fn to_params(&self) -> ProductParams {
        ProductParams {
            search: self.search.clone(),
            tier: self.tier.clone(),
            theme: self.theme.clone(),
            time: self.time.map(|t| t.to_string()),
            price_order: self.price_order.map(|o| o.to_string()),
            price: self.price_range.map(|(min, max)| format!("{min},{max}")),
            category: self.category.clone(),
            page: Some(self.page.to_string()),
            page_size: Some(self.page_size.to_string()),
        }
    }

    /// The shareable-link projection. Unset and default-valued fields are
    /// omitted, so `Criteria::default()` projects to the empty string.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(s) = non_empty(&self.search) {
            pairs.push(("search", s.to_string()));
        }
        if let Some(t) = non_empty(&self.tier) {
            pairs.push(("tier", t.to_string()));
        }
        if let Some(t) = non_empty(&self.theme) {
            pairs.push(("theme", t.to_string()));
        }
        if let Some(c) = non_empty(&self.category) {
            pairs.push(("category", c.to_string()));
        }
        if let Some(t) = self.time {
            pairs.push(("time", t.to_string()));
        }
        if let Some(o) = self.price_order {
            pairs.push(("priceOrder", o.to_string()));
        }
        if let Some((min, max)) = self.price_range {
            pairs.push(("price", format!("{min},{max}")));
        }
        if self.page != 1 {
            pairs.push(("page", self.page.to_string()));
        }
        // pageSize is a client constant, not part of the shareable state

        pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Hydrate from a pasted link or query string. Only called at
    /// construction time; afterwards the link is write-only. Unknown keys
    /// and malformed values are ignored.
    pub fn from_query_string(raw: &str) -> Self {
        let mut c = Criteria::default();
        // Accept a full URL, a bare query string, or one with a leading '?'
        let qs = raw
            .rsplit_once('?')
            .map(|(_, q)| q)
            .unwrap_or(raw)
            .trim_start_matches('?');

        for pair in qs.split('&').filter(|p| !p.is_empty()) {
            let (k, v) = match pair.split_once('=') {
                Some((k, v)) => (k, v),
                None => continue,
            };
            let v = match urlencoding::decode(v) {
                Ok(v) => v.into_owned(),
                Err(_) => continue,
            };
            if v.is_empty() {
                continue;
            }
            match k {
                "search" => c.search = Some(v),
                "tier" => c.tier = Some(v),
                "theme" => c.theme = Some(v),
                "category" => c.category = Some(v),
                "time" => c.time = v.parse().ok(),
                "priceOrder" => c.price_order = v.parse().ok(),
                "price" => {
                    if let Some((min, max)) = parse_price_range(&v) {
                        c.set_price_range(min, max);
                    }
                }
                "page" => {
                    if let Ok(p) = v.parse::<usize>() {
                        if p >= 1 {
                            c.page = p;
                        }
                    }
                }
                "pageSize" => {
                    if let Ok(ps) = v.parse::<usize>() {
                        if ps >= 1 {
                            c.page_size = ps;
                        }
                    }
                }
                _ => {}
            }
        }
        c
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_projects_to_empty_string() {
        assert_eq!(Criteria::default().to_query_string(), "");
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let mut c = Criteria::default();
        c.search = Some("  ".to_string()); // whitespace counts as empty
        c.category = Some("Art".to_string());
        assert_eq!(c.to_query_string(), "category=Art");
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let mut c = Criteria::default();
        c.search = Some("upper body".to_string());
        assert_eq!(c.to_query_string(), "search=upper%20body");
    }

    #[test]
    fn test_round_trip() {
        let mut c = Criteria::default();
        c.search = Some("neon".to_string());
        c.tier = Some("Premium".to_string());
        c.time = Some(TimeOrder::Latest);
        c.price_order = Some(PriceOrder::HighToLow);
        c.set_price_range(0.5, 10.0);
        c.page = 3;
        let back = Criteria::from_query_string(&c.to_query_string());
        assert_eq!(back, c);
    }

    #[test]
    fn test_hydrate_accepts_full_link_and_leading_question_mark() {
        let a = Criteria::from_query_string("https://x.example/marketplace?category=Shoes&page=2");
        let b = Criteria::from_query_string("?category=Shoes&page=2");
        assert_eq!(a, b);
        assert_eq!(a.category.as_deref(), Some("Shoes"));
        assert_eq!(a.page, 2);
    }

    #[test]
    fn test_unknown_and_malformed_params_are_ignored() {
        let c = Criteria::from_query_string("utm_source=x&page=zero&price=a,b&time=sideways");
        assert_eq!(c, Criteria::default());
    }

    #[test]
    fn test_page_size_is_never_projected() {
        let mut c = Criteria::default();
        c.page_size = 48;
        c.page = 2;
        assert_eq!(c.to_query_string(), "page=2");
    }

    #[test]
    fn test_price_range_normalizes_ascending() {
        let mut c = Criteria::default();
        c.set_price_range(10.0, 2.0);
        assert_eq!(c.price_range, Some((2.0, 10.0)));
    }

    #[test]
    fn test_query_key_equality() {
        let a = Criteria::from_query_string("search=shoes");
        let b = Criteria::from_query_string("search=shoes");
        let c = Criteria::from_query_string("search=hats");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
