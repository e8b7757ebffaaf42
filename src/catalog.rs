//! In-memory product catalog
//!
//! The catalog is built once at process start and never mutated afterwards.
//! Two sources are supported: seeded random generation (the default mock
//! dataset) and a TOML fixture file for pinning exact data in tests/demos.

use crate::types::{Author, OnlineStatus, Product, Tier, Theme};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::Path;

/// Categories the mock generator draws from. An open set on the wire
/// (category is a plain string), closed here only for generation.
pub const CATEGORIES: [&str; 8] = [
    "Art",
    "Gaming",
    "Music",
    "Upper Body",
    "Lower Body",
    "Hat",
    "Shoes",
    "Accessory",
];

const TITLE_POOL: [&str; 10] = [
    "Metaverse Ranger",
    "Cyber Samurai",
    "Neon Drifter",
    "Pixel Alchemist",
    "Astro Fennec",
    "The DJ",
    "Ice Giant",
    "Mafia England",
    "Basketball Girl",
    "Assassin X",
];

const AUTHOR_POOL: [&str; 6] = [
    "Ghozali Ghozalu",
    "Dang Van Lanh",
    "Ryan Gosling",
    "Tuyen Thanh",
    "Minh Tri",
    "Freya Vu",
];

pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Generate `n` mock products from a seeded RNG. Same seed, same catalog,
    /// so fixtures and golden tests stay reproducible across runs.
    pub fn generate(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let now = Utc::now();
        let products = (0..n)
            .map(|i| {
                let title_base = TITLE_POOL[rng.gen_range(0..TITLE_POOL.len())];
                let author_name = AUTHOR_POOL[rng.gen_range(0..AUTHOR_POOL.len())];
                let price = (rng.gen_range(0.01..200.0f64) * 100.0).round() / 100.0;
                // Spread creation times over the trailing 90 days
                let age_secs = rng.gen_range(0..90 * 24 * 3600);
                Product {
                    id: i as u64 + 1,
                    title: format!("{} #{}", title_base, i + 1),
                    category: CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string(),
                    price,
                    tier: Tier::ALL[rng.gen_range(0..Tier::ALL.len())],
                    theme: Theme::ALL[rng.gen_range(0..Theme::ALL.len())],
                    created_at: now - Duration::seconds(age_secs),
                    author: Author {
                        name: author_name.to_string(),
                        avatar: format!(
                            "https://robohash.org/{}.png?size=100x100",
                            author_name.to_lowercase().replace(' ', "-")
                        ),
                        online_status: if rng.gen_bool(0.5) {
                            OnlineStatus::Online
                        } else {
                            OnlineStatus::Offline
                        },
                    },
                    is_favorite: rng.gen_bool(0.3),
                }
            })
            .collect();
        Self { products }
    }

    /// Load a fixture catalog from a TOML document with a `[[products]]` table
    /// per entry.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let fixture: CatalogFixture =
            toml::from_str(s).context("Failed to parse catalog fixture")?;
        Ok(Self {
            products: fixture.products,
        })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[derive(Deserialize)]
struct CatalogFixture {
    products: Vec<Product>,
}
