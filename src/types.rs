use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single catalog listing. Generated once at startup and read-only after
/// that; the query pipeline works on borrowed slices and clones into pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub price: f64,
    pub tier: Tier,
    pub theme: Theme,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub author: Author,
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub name: String,
    pub avatar: String,
    #[serde(rename = "onlineStatus")]
    pub online_status: OnlineStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Tier {
    Basic,
    Premium,
    Deluxe,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
    Colorful,
    Halloween,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Premium, Tier::Deluxe];
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Dark, Theme::Light, Theme::Colorful, Theme::Halloween];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Basic => write!(f, "Basic"),
            Tier::Premium => write!(f, "Premium"),
            Tier::Deluxe => write!(f, "Deluxe"),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "Dark"),
            Theme::Light => write!(f, "Light"),
            Theme::Colorful => write!(f, "Colorful"),
            Theme::Halloween => write!(f, "Halloween"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Tier::Basic),
            "premium" => Ok(Tier::Premium),
            "deluxe" => Ok(Tier::Deluxe),
            _ => Err(anyhow::anyhow!(
                "Invalid tier '{s}'. Valid options: basic, premium, deluxe"
            )),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            "colorful" => Ok(Theme::Colorful),
            "halloween" => Ok(Theme::Halloween),
            _ => Err(anyhow::anyhow!(
                "Invalid theme '{s}'. Valid options: dark, light, colorful, halloween"
            )),
        }
    }
}

/// One page of query results plus paging metadata, exactly as it goes over
/// the wire from `GET /api/products`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductPage {
    pub data: Vec<Product>,
    /// Total match count across the whole filtered set, before slicing.
    pub counts: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
    #[serde(rename = "currentPage")]
    pub current_page: usize,
}

impl ProductPage {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            counts: 0,
            total_pages: 1,
            current_page: 1,
        }
    }
}

/// Events delivered from spawned fetch tasks back to the controller.
/// `generation` identifies which criteria commit the fetch belonged to;
/// the controller drops events from superseded generations.
#[derive(Debug)]
pub enum FetchEvent {
    PageLoaded { generation: u64, page: ProductPage },
    FetchFailed { generation: u64, error: String },
}
