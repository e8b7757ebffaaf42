//! Filter state controller
//!
//! Owns the current `Criteria` and the accumulated result list. Every
//! committed change bumps a fetch generation, aborts the previous in-flight
//! request and spawns a new one; responses carrying a superseded generation
//! are dropped on receipt, so the list always reflects the most recent
//! criteria. The share link is a derived projection, rewritten on every
//! commit except page-only load-more changes.

use crate::criteria::{Criteria, PriceOrder, TimeOrder, DEFAULT_PAGE_SIZE};
use crate::fetch::ProductFetcher;
use crate::types::{FetchEvent, Product};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Debouncer for the free-text search box. Deadlines are checked against a
/// caller-supplied instant so the timer can be driven deterministically.
pub struct Debounce {
    last_text: String,
    last_change: Instant,
    delay: Duration,
    pending: bool,
}

impl Debounce {
    pub fn new(ms: u64) -> Self {
        Self {
            last_text: String::new(),
            last_change: Instant::now(),
            delay: Duration::from_millis(ms),
            pending: false,
        }
    }

    pub fn set(&mut self, s: &str, now: Instant) {
        if s != self.last_text {
            self.last_text.clear();
            self.last_text.push_str(s);
            self.last_change = now;
            self.pending = true;
        }
    }

    /// Cancel a pending deadline; a later `ready` is then a no-op.
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        if self.pending {
            let elapsed = now.saturating_duration_since(self.last_change);
            if elapsed < self.delay {
                return Some(self.delay - elapsed);
            }
            return Some(Duration::ZERO);
        }
        None
    }

    pub fn ready(&mut self, now: Instant) -> Option<String> {
        if self.pending && now.saturating_duration_since(self.last_change) >= self.delay {
            self.pending = false;
            return Some(self.last_text.clone());
        }
        None
    }
}

#[derive(Clone, Debug)]
pub struct ControllerConfig {
    pub debounce_ms: u64,
    pub refresh_interval_ms: u64,
    pub page_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            refresh_interval_ms: 60_000,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

pub struct FilterController {
    criteria: Criteria,
    cfg: ControllerConfig,
    fetcher: Arc<dyn ProductFetcher>,

    // Accumulated results
    items: Vec<Product>,
    counts: usize,
    has_more: bool,
    last_error: Option<String>,

    // Fetch plumbing
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    events_tx: UnboundedSender<FetchEvent>,
    events_rx: UnboundedReceiver<FetchEvent>,

    search_debounce: Debounce,
    last_spawn: Instant,
    share_query: String,
}

impl FilterController {
    pub fn new(fetcher: Arc<dyn ProductFetcher>, cfg: ControllerConfig) -> Self {
        Self::from_criteria(fetcher, cfg, Criteria::default())
    }

    /// Hydrate from a pasted share link. The link is read exactly once here;
    /// from then on the criteria object is the source of truth and the link
    /// is write-only.
    pub fn from_link(fetcher: Arc<dyn ProductFetcher>, cfg: ControllerConfig, link: &str) -> Self {
        Self::from_criteria(fetcher, cfg, Criteria::from_query_string(link))
    }

    pub fn from_criteria(
        fetcher: Arc<dyn ProductFetcher>,
        cfg: ControllerConfig,
        mut criteria: Criteria,
    ) -> Self {
        if criteria.page_size == DEFAULT_PAGE_SIZE {
            criteria.page_size = cfg.page_size;
        }
        let (events_tx, events_rx) = unbounded_channel();
        let debounce_ms = cfg.debounce_ms;
        let mut ctl = Self {
            share_query: criteria.to_query_string(),
            criteria,
            cfg,
            fetcher,
            items: Vec::new(),
            counts: 0,
            has_more: true,
            last_error: None,
            generation: 0,
            in_flight: None,
            events_tx,
            events_rx,
            search_debounce: Debounce::new(debounce_ms),
            last_spawn: Instant::now(),
        };
        ctl.spawn_fetch();
        ctl
    }

    // --- accessors -------------------------------------------------------

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn products(&self) -> &[Product] {
        &self.items
    }

    pub fn counts(&self) -> usize {
        self.counts
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The derived share-link query string ("" right after a reset).
    pub fn share_query(&self) -> &str {
        &self.share_query
    }

    // --- intents ---------------------------------------------------------

    /// Search box edit. Debounced: nothing is fetched until the text has
    /// been stable for `debounce_ms`, checked on `tick`.
    pub fn set_search(&mut self, text: &str) {
        self.search_debounce.set(text, Instant::now());
    }

    pub fn set_tier(&mut self, tier: Option<String>) {
        self.criteria.tier = tier;
        self.commit();
    }

    pub fn set_theme(&mut self, theme: Option<String>) {
        self.criteria.theme = theme;
        self.commit();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.criteria.category = category;
        self.commit();
    }

    pub fn set_time(&mut self, time: Option<TimeOrder>) {
        self.criteria.time = time;
        self.commit();
    }

    pub fn set_price_order(&mut self, order: Option<PriceOrder>) {
        self.criteria.price_order = order;
        self.commit();
    }

    pub fn set_price_range(&mut self, range: Option<(f64, f64)>) {
        match range {
            Some((a, b)) => self.criteria.set_price_range(a, b),
            None => self.criteria.price_range = None,
        }
        self.commit();
    }

    /// Fetch the next page without resetting any other criteria. Page-only
    /// change: the share link keeps its previous value.
    pub fn load_more(&mut self) {
        // No-op while exhausted or still loading, so the page counter can
        // never run ahead of the accumulated list
        if !self.has_more || self.in_flight.is_some() {
            return;
        }
        self.criteria.page += 1;
        self.spawn_fetch();
    }

    /// Restore the documented defaults: all filters cleared, page 1.
    pub fn reset(&mut self) {
        self.search_debounce.cancel();
        self.criteria = Criteria {
            page_size: self.cfg.page_size,
            ..Criteria::default()
        };
        self.items.clear();
        self.counts = 0;
        self.has_more = true;
        self.last_error = None;
        self.share_query = self.criteria.to_query_string();
        self.spawn_fetch();
    }

    /// Drive the debounce deadline and the periodic background refresh.
    pub fn tick(&mut self, now: Instant) {
        if let Some(text) = self.search_debounce.ready(now) {
            let trimmed = text.trim();
            self.criteria.search = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
            self.commit();
        }

        let refresh = Duration::from_millis(self.cfg.refresh_interval_ms);
        if !refresh.is_zero()
            && self.in_flight.is_none()
            && now.saturating_duration_since(self.last_spawn) >= refresh
        {
            log::debug!("Background refresh of current query");
            self.spawn_fetch();
        }
    }

    // --- fetch plumbing --------------------------------------------------

    /// A filter changed: back to page 1, rewrite the share link, refetch.
    fn commit(&mut self) {
        self.criteria.page = 1;
        self.share_query = self.criteria.to_query_string();
        self.spawn_fetch();
    }

    fn spawn_fetch(&mut self) {
        self.generation += 1;
        // One canonical in-flight request per criteria value: anything older
        // is superseded, abort it
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }

        let generation = self.generation;
        let criteria = self.criteria.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.events_tx.clone();
        self.last_spawn = Instant::now();

        self.in_flight = Some(tokio::spawn(async move {
            let event = match fetcher.fetch(&criteria).await {
                Ok(page) => FetchEvent::PageLoaded { generation, page },
                Err(e) => FetchEvent::FetchFailed {
                    generation,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(event);
        }));
    }

    /// Apply one fetch event. Events from superseded generations are
    /// dropped; the latest criteria always wins.
    pub fn on_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::PageLoaded { generation, page } => {
                if generation != self.generation {
                    log::debug!("Dropping stale page (generation {generation})");
                    return;
                }
                self.in_flight = None;
                self.last_error = None;
                self.counts = page.counts;
                self.has_more = page.current_page < page.total_pages;
                if page.current_page <= 1 {
                    self.items = page.data;
                } else {
                    // Pages land in order, so page p always owns the slice
                    // starting at (p-1)*page_size; a refresh of that page
                    // overwrites it in place instead of appending a duplicate
                    let start = (page.current_page - 1)
                        .saturating_mul(self.criteria.page_size)
                        .min(self.items.len());
                    self.items.truncate(start);
                    self.items.extend(page.data);
                }
            }
            FetchEvent::FetchFailed { generation, error } => {
                if generation != self.generation {
                    return;
                }
                self.in_flight = None;
                log::error!("Fetch failed: {error}");
                // Keep showing the stale list; record the failure
                self.last_error = Some(error);
            }
        }
    }

    /// Drain any already-delivered events without blocking.
    pub fn pump(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.on_event(event);
        }
    }

    /// Wait for the in-flight fetch (if any) to resolve and apply it.
    pub async fn settle(&mut self) {
        while self.in_flight.is_some() {
            match self.events_rx.recv().await {
                Some(event) => self.on_event(event),
                None => break,
            }
        }
    }
}

impl Drop for FilterController {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let mut db = Debounce::new(500);
        let t0 = Instant::now();
        db.set("upper", t0);
        assert!(db.ready(t0 + Duration::from_millis(100)).is_none());
        db.set("upper body", t0 + Duration::from_millis(400)); // edit restarts the clock
        assert!(db.ready(t0 + Duration::from_millis(700)).is_none());
        assert_eq!(
            db.ready(t0 + Duration::from_millis(950)).as_deref(),
            Some("upper body")
        );
        // Fires once
        assert!(db.ready(t0 + Duration::from_millis(2000)).is_none());
    }

    #[test]
    fn test_debounce_cancel_prevents_fire() {
        let mut db = Debounce::new(100);
        let t0 = Instant::now();
        db.set("shoes", t0);
        db.cancel();
        assert!(db.ready(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_debounce_deadline_shrinks() {
        let mut db = Debounce::new(500);
        let t0 = Instant::now();
        assert!(db.next_deadline(t0).is_none());
        db.set("x", t0);
        let d = db.next_deadline(t0 + Duration::from_millis(200)).unwrap();
        assert!(d <= Duration::from_millis(300));
    }
}
