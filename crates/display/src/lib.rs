//! Cached, filtered, paginated view over parsed testimonial records.
//!
//! The controller sits between the store and whatever renders cards. It
//! holds one snapshot of parsed records behind a `RwLock`, refreshes it
//! when the TTL lapses, and answers filter and page queries from memory.
//!
//! A fetch failure never empties the page: while a last-good snapshot
//! exists the controller keeps serving it and logs the failure. Only a
//! cold cache plus a failed fetch surfaces an error.
//!
//! Locks are held for in-memory work only, never across an await.

mod error;
mod render;

use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use parser::{parse_all, ParserConfig, TestimonialRecord};
use store::{fetch_documents, DocumentBackend, StoreConfig};

pub use crate::error::DisplayError;
pub use crate::render::{escape_html, render_card};

/// Controller settings.
///
/// | Field | Meaning | Default |
/// |-------|---------|---------|
/// | `cache_ttl_secs` | Snapshot lifetime before a reload fetches again | `300` |
/// | `page_size` | Records revealed per page | `9` |
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub cache_ttl_secs: u64,
    pub page_size: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            cache_ttl_secs: 300,
            page_size: 9,
        }
    }
}

impl DisplayConfig {
    /// Short-TTL preset for local and preview hosts.
    pub fn development() -> Self {
        DisplayConfig {
            cache_ttl_secs: 30,
            ..DisplayConfig::default()
        }
    }
}

/// Where the controller currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Loading,
    Ready,
    Filtering,
    Error,
}

/// Pagination summary for the current filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_records: usize,
    pub has_more: bool,
}

struct CacheState {
    records: Vec<TestimonialRecord>,
    filtered: Vec<TestimonialRecord>,
    fetched_at: Option<Instant>,
    destination: Option<String>,
    search: Option<String>,
    page: usize,
    phase: Phase,
}

/// Read-side controller over the document store.
pub struct DisplayController<B: DocumentBackend> {
    store_cfg: StoreConfig,
    parser_cfg: ParserConfig,
    cfg: DisplayConfig,
    backend: B,
    state: RwLock<CacheState>,
}

impl<B: DocumentBackend> DisplayController<B> {
    pub fn new(
        store_cfg: StoreConfig,
        parser_cfg: ParserConfig,
        cfg: DisplayConfig,
        backend: B,
    ) -> Self {
        DisplayController {
            store_cfg,
            parser_cfg,
            cfg,
            backend,
            state: RwLock::new(CacheState {
                records: Vec::new(),
                filtered: Vec::new(),
                fetched_at: None,
                destination: None,
                search: None,
                page: 1,
                phase: Phase::Loading,
            }),
        }
    }

    /// Loads records, serving the snapshot while the TTL holds.
    ///
    /// `force` skips the TTL check. On a fetch failure the last-good
    /// snapshot is returned instead; with no snapshot the failure
    /// surfaces and the controller enters [`Phase::Error`].
    pub async fn load(&self, force: bool) -> Result<Vec<TestimonialRecord>, DisplayError> {
        let start = Instant::now();

        if !force {
            let state = self.read_state()?;
            if let Some(fetched_at) = state.fetched_at {
                if fetched_at.elapsed() < Duration::from_secs(self.cfg.cache_ttl_secs) {
                    info!(
                        record_count = state.records.len(),
                        source = "cache",
                        elapsed_micros = start.elapsed().as_micros() as u64,
                        "display_load_success"
                    );
                    return Ok(state.records.clone());
                }
            }
        }

        self.write_state(|state| state.phase = Phase::Loading)?;

        match fetch_documents(&self.store_cfg, &self.backend).await {
            Ok(documents) => {
                let records = parse_all(&documents, &self.parser_cfg);
                self.write_state(|state| {
                    state.records = records.clone();
                    state.fetched_at = Some(Instant::now());
                    state.phase = Phase::Ready;
                    refilter(state);
                })?;
                info!(
                    record_count = records.len(),
                    source = "fetch",
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "display_load_success"
                );
                Ok(records)
            }
            Err(err) => {
                let stale = {
                    let state = self.read_state()?;
                    state.fetched_at.map(|_| state.records.clone())
                };
                match stale {
                    Some(records) => {
                        warn!(error = %err, record_count = records.len(), "display_load_stale");
                        self.write_state(|state| state.phase = Phase::Ready)?;
                        Ok(records)
                    }
                    None => {
                        warn!(
                            error = %err,
                            elapsed_micros = start.elapsed().as_micros() as u64,
                            "display_load_failure"
                        );
                        self.write_state(|state| state.phase = Phase::Error)?;
                        Err(DisplayError::Fetch(err.to_string()))
                    }
                }
            }
        }
    }

    /// Filters the in-memory set and resets to page 1.
    ///
    /// `destination` matches exactly; `search` is a case-insensitive
    /// substring over name, trip, content and destination.
    pub fn apply_filters(
        &self,
        destination: Option<&str>,
        search: Option<&str>,
    ) -> Result<usize, DisplayError> {
        let mut matched = 0;
        self.write_state(|state| {
            state.phase = Phase::Filtering;
            state.destination = destination.map(str::to_string);
            state.search = search.map(str::to_string);
            state.page = 1;
            refilter(state);
            matched = state.filtered.len();
            state.phase = Phase::Ready;
        })?;
        info!(
            destination = destination.unwrap_or(""),
            matched, "display_filters_applied"
        );
        Ok(matched)
    }

    /// Reveals the next page; a no-op on the last page.
    pub fn load_more(&self) -> Result<bool, DisplayError> {
        let mut advanced = false;
        self.write_state(|state| {
            if state.page * self.cfg.page_size < state.filtered.len() {
                state.page += 1;
                advanced = true;
            }
        })?;
        Ok(advanced)
    }

    /// The filtered records revealed so far, at most `page * page_size`.
    pub fn visible(&self) -> Result<Vec<TestimonialRecord>, DisplayError> {
        let state = self.read_state()?;
        let end = (state.page * self.cfg.page_size).min(state.filtered.len());
        Ok(state.filtered[..end].to_vec())
    }

    pub fn page_info(&self) -> Result<PageInfo, DisplayError> {
        let state = self.read_state()?;
        Ok(PageInfo {
            page: state.page,
            page_size: self.cfg.page_size,
            total_records: state.filtered.len(),
            has_more: state.page * self.cfg.page_size < state.filtered.len(),
        })
    }

    pub fn phase(&self) -> Result<Phase, DisplayError> {
        Ok(self.read_state()?.phase)
    }

    /// Records cleared for the public site.
    pub fn verified_testimonials(&self) -> Result<Vec<TestimonialRecord>, DisplayError> {
        let state = self.read_state()?;
        Ok(state
            .records
            .iter()
            .filter(|r| r.verified)
            .cloned()
            .collect())
    }

    /// Records still waiting on moderator review.
    pub fn testimonials_for_review(&self) -> Result<Vec<TestimonialRecord>, DisplayError> {
        let state = self.read_state()?;
        Ok(state
            .records
            .iter()
            .filter(|r| r.needs_review)
            .cloned()
            .collect())
    }

    fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, CacheState>, DisplayError> {
        self.state
            .read()
            .map_err(|_| DisplayError::State("poisoned lock".into()))
    }

    fn write_state(&self, apply: impl FnOnce(&mut CacheState)) -> Result<(), DisplayError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| DisplayError::State("poisoned lock".into()))?;
        apply(&mut state);
        Ok(())
    }
}

fn refilter(state: &mut CacheState) {
    let destination = state.destination.as_deref();
    let search = state.search.as_deref().map(str::to_lowercase);

    let mut filtered: Vec<TestimonialRecord> = state
        .records
        .iter()
        .filter(|record| {
            destination.map_or(true, |d| record.destination == d)
                && search
                    .as_deref()
                    .map_or(true, |needle| record_matches(record, needle))
        })
        .cloned()
        .collect();

    sort_for_display(&mut filtered);
    state.filtered = filtered;
}

fn record_matches(record: &TestimonialRecord, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
        || record.trip.to_lowercase().contains(needle)
        || record.content.to_lowercase().contains(needle)
        || record.destination.to_lowercase().contains(needle)
}

/// Featured records first, newest first within each group.
fn sort_for_display(records: &mut [TestimonialRecord]) {
    records.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};
    use store::{DocumentPayload, Label, MemoryBackend, RawDocument, StoreError};

    struct CountingBackend {
        inner: MemoryBackend,
        lists: AtomicUsize,
        fail_lists: AtomicBool,
    }

    impl CountingBackend {
        fn with_documents(documents: Vec<RawDocument>) -> Self {
            CountingBackend {
                inner: MemoryBackend::with_documents(documents),
                lists: AtomicUsize::new(0),
                fail_lists: AtomicBool::new(false),
            }
        }

        fn list_count(&self) -> usize {
            self.lists.load(Ordering::SeqCst)
        }
    }

    impl DocumentBackend for CountingBackend {
        async fn create(&self, payload: &DocumentPayload) -> Result<RawDocument, StoreError> {
            self.inner.create(payload).await
        }

        async fn list(&self, label: &str) -> Result<Vec<RawDocument>, StoreError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            if self.fail_lists.load(Ordering::SeqCst) {
                return Err(StoreError::Transport("connection reset".into()));
            }
            self.inner.list(label).await
        }
    }

    fn document(number: u64, name: &str, trip: &str, featured: bool, labels: &[&str], ymd: (i32, u32, u32)) -> RawDocument {
        RawDocument {
            id: 1000 + number,
            number,
            title: format!("Testimonio de {name} - {trip}"),
            body: Some(format!(
                "---\nname: \"{name}\"\ntrip: \"{trip}\"\nfeatured: {featured}\n---\n\nA story about {trip} long enough to keep.\n"
            )),
            labels: labels
                .iter()
                .map(|l| Label {
                    name: l.to_string(),
                })
                .collect(),
            html_url: format!("https://documents.example/testimonies/{number}"),
            created_at: Utc.with_ymd_and_hms(ymd.0, ymd.1, ymd.2, 12, 0, 0).unwrap(),
        }
    }

    fn store_cfg() -> StoreConfig {
        StoreConfig {
            owner: "romeria-travel".into(),
            repo: "testimonies".into(),
            token: None,
            ..Default::default()
        }
    }

    fn controller(backend: CountingBackend, cfg: DisplayConfig) -> DisplayController<CountingBackend> {
        DisplayController::new(store_cfg(), ParserConfig::default(), cfg, backend)
    }

    fn seeded_backend() -> CountingBackend {
        CountingBackend::with_documents(vec![
            document(1, "Ana", "Camino", false, &["testimony", "verified"], (2024, 1, 1)),
            document(2, "Juan", "Fatima", true, &["testimony", "needs-review"], (2023, 1, 1)),
            document(3, "Marta", "Lourdes", false, &["testimony", "verified"], (2024, 6, 1)),
        ])
    }

    #[tokio::test]
    async fn load_within_ttl_hits_the_cache_once() {
        let controller = controller(seeded_backend(), DisplayConfig::default());
        controller.load(false).await.unwrap();
        controller.load(false).await.unwrap();
        assert_eq!(controller.backend.list_count(), 1);
    }

    #[tokio::test]
    async fn expired_ttl_fetches_again() {
        let cfg = DisplayConfig {
            cache_ttl_secs: 0,
            ..DisplayConfig::default()
        };
        let controller = controller(seeded_backend(), cfg);
        controller.load(false).await.unwrap();
        controller.load(false).await.unwrap();
        assert_eq!(controller.backend.list_count(), 2);
    }

    #[tokio::test]
    async fn force_bypasses_a_valid_cache() {
        let controller = controller(seeded_backend(), DisplayConfig::default());
        controller.load(false).await.unwrap();
        controller.load(true).await.unwrap();
        assert_eq!(controller.backend.list_count(), 2);
    }

    #[tokio::test]
    async fn featured_sorts_first_then_recency() {
        let controller = controller(seeded_backend(), DisplayConfig::default());
        controller.load(false).await.unwrap();
        controller.apply_filters(None, None).unwrap();

        let visible = controller.visible().unwrap();
        let names: Vec<&str> = visible.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Juan", "Marta", "Ana"]);
    }

    #[tokio::test]
    async fn destination_filter_is_exact_and_search_is_substring() {
        let controller = controller(seeded_backend(), DisplayConfig::default());
        controller.load(false).await.unwrap();

        assert_eq!(controller.apply_filters(Some("Camino"), None).unwrap(), 1);
        assert_eq!(controller.apply_filters(Some("camino"), None).unwrap(), 0);
        assert_eq!(controller.apply_filters(None, Some("LOURDES")).unwrap(), 1);
        assert_eq!(controller.apply_filters(None, Some("story about")).unwrap(), 3);
    }

    #[tokio::test]
    async fn pagination_reveals_nine_then_stops_at_the_end() {
        let documents: Vec<RawDocument> = (1..=12)
            .map(|n| {
                document(
                    n,
                    &format!("Pilgrim{n}"),
                    "Camino",
                    false,
                    &["testimony"],
                    (2024, 1, n as u32),
                )
            })
            .collect();
        let controller = controller(
            CountingBackend::with_documents(documents),
            DisplayConfig::default(),
        );
        controller.load(false).await.unwrap();
        controller.apply_filters(None, None).unwrap();

        assert_eq!(controller.visible().unwrap().len(), 9);
        assert!(controller.page_info().unwrap().has_more);

        assert!(controller.load_more().unwrap());
        assert_eq!(controller.visible().unwrap().len(), 12);

        assert!(!controller.load_more().unwrap());
        assert_eq!(controller.visible().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn filters_reset_to_page_one() {
        let documents: Vec<RawDocument> = (1..=12)
            .map(|n| {
                document(
                    n,
                    &format!("Pilgrim{n}"),
                    "Camino",
                    false,
                    &["testimony"],
                    (2024, 1, n as u32),
                )
            })
            .collect();
        let controller = controller(
            CountingBackend::with_documents(documents),
            DisplayConfig::default(),
        );
        controller.load(false).await.unwrap();
        controller.apply_filters(None, None).unwrap();
        controller.load_more().unwrap();

        controller.apply_filters(None, Some("pilgrim")).unwrap();
        assert_eq!(controller.page_info().unwrap().page, 1);
        assert_eq!(controller.visible().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn visibility_splits_on_labels() {
        let controller = controller(seeded_backend(), DisplayConfig::default());
        controller.load(false).await.unwrap();

        let public: Vec<String> = controller
            .verified_testimonials()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        let review: Vec<String> = controller
            .testimonials_for_review()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();

        assert!(public.contains(&"Ana".to_string()));
        assert!(!public.contains(&"Juan".to_string()));
        assert_eq!(review, vec!["Juan".to_string()]);
    }

    #[tokio::test]
    async fn fetch_failure_serves_the_stale_snapshot() {
        let controller = controller(seeded_backend(), DisplayConfig::default());
        controller.load(false).await.unwrap();

        controller.backend.fail_lists.store(true, Ordering::SeqCst);
        let records = controller.load(true).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(controller.phase().unwrap(), Phase::Ready);
    }

    #[tokio::test]
    async fn cold_cache_fetch_failure_is_an_error() {
        let backend = seeded_backend();
        backend.fail_lists.store(true, Ordering::SeqCst);
        let controller = controller(backend, DisplayConfig::default());

        let err = controller.load(false).await.unwrap_err();
        assert!(matches!(err, DisplayError::Fetch(_)));
        assert_eq!(controller.phase().unwrap(), Phase::Error);
    }
}
