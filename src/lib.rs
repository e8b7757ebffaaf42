//! marketx - marketplace catalog service and terminal client
//!
//! An in-memory product catalog behind a small HTTP API, plus the filter
//! state controller the client drives against it: debounced search,
//! stale-request cancellation, incremental load-more pagination, and a
//! shareable-link projection of the current filters.

// Data model and events
pub mod types;

// Mock data store
pub mod catalog;

// Filter/sort/paginate pipeline (shared by server and offline mode)
pub mod query;

// Criteria value object + share-link codec
pub mod criteria;

// Fetcher seam (HTTP and in-process)
pub mod fetch;

// Filter state controller
pub mod controller;

// HTTP API surface
pub mod server;

// CLI configuration
pub mod config;

// Display helpers
pub mod util_text;

pub use controller::{ControllerConfig, FilterController};
pub use criteria::{Criteria, PriceOrder, TimeOrder};
pub use types::{Product, ProductPage};
