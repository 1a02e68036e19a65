//! Resource Store
//!
//! One generic cache-and-fetch engine, instantiated once per resource kind.
//! A store owns:
//!
//! - the observable [`StoreState`] (list, detail, loading, error, list-loaded)
//! - a detail cache keyed by canonical URL, filled by single-ID and batch
//!   fetches and never evicted
//! - the set of URLs a batch resolution is currently fetching, so overlapping
//!   batches never request the same URL twice
//!
//! Failures never reach the caller as errors: they are normalized into the
//! `error` cell and the operation returns an empty list, `None`, or nothing.

use super::model::{ListResponse, Resource};
use super::state::{lock, StoreState};
use crate::swapi::{format_error, FetchError, SwapiClient, Transport};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Behavior switches shared by every store
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Follow `next` links so `list_all` returns every page
    pub follow_pages: bool,
}

/// Cache-and-fetch engine for one resource kind
pub struct ResourceStore<T, C> {
    http: Arc<C>,
    /// Base endpoint, always ending with '/'
    base_url: String,
    options: StoreOptions,
    state: StoreState<T>,
    cache: Mutex<HashMap<String, T>>,
    resolving: Mutex<HashSet<String>>,
}

impl<T: Resource, C: Transport> ResourceStore<T, C> {
    /// Store for `T::KIND` under the client's API root
    pub fn new(client: &SwapiClient<C>, options: StoreOptions) -> Self {
        Self::with_base_url(
            Arc::clone(&client.http),
            &client.resource_url(T::KIND),
            options,
        )
    }

    pub fn with_base_url(http: Arc<C>, base_url: &str, options: StoreOptions) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Self {
            http,
            base_url,
            options,
            state: StoreState::default(),
            cache: Mutex::new(HashMap::new()),
            resolving: Mutex::new(HashSet::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Canonical URL of the entity with route id `id`
    pub fn canonical_url(&self, id: &str) -> String {
        format!("{}{}/", self.base_url, urlencoding::encode(id.trim_matches('/')))
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Load the full list unless it has been loaded already
    pub async fn list_all(&self) -> Vec<T> {
        self.state.clear_error();

        if *self.state.list_loaded.borrow() {
            return self.list();
        }

        let _loading = self.state.begin_loading();
        self.state.list.send_replace(Vec::new());

        match self.fetch_list().await {
            Ok(mut items) => {
                sort_entities(&mut items);
                tracing::debug!("Loaded {} {}", items.len(), T::KIND);
                self.state.list.send_replace(items.clone());
                self.state.list_loaded.send_replace(true);
                items
            }
            Err(err) => {
                self.record_failure(&self.base_url, &err);
                Vec::new()
            }
        }
    }

    /// Load one entity by route id and select it as the current detail
    pub async fn get_by_id(&self, id: &str) -> Option<T> {
        self.state.clear_error();
        let wanted = self.canonical_url(id);

        if let Some(hit) = self.cached(&wanted) {
            tracing::trace!("Detail cache hit: {}", wanted);
            self.state.detail.send_replace(Some(hit.clone()));
            return Some(hit);
        }

        let _loading = self.state.begin_loading();
        self.state.detail.send_replace(None);

        match self.fetch_one(&wanted).await {
            Ok(entity) => {
                self.state.detail.send_replace(Some(entity.clone()));
                self.remember(&entity);
                Some(entity)
            }
            Err(err) => {
                self.record_failure(&wanted, &err);
                None
            }
        }
    }

    /// Fetch every URL not yet cached, at most `concurrency` at a time,
    /// merging each result into the list as it arrives. Cached entities
    /// missing from the list are merged back without a request.
    pub async fn resolve_many<I, S>(&self, urls: I, concurrency: usize)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (claim, cached) = self.claim(urls);
        self.restore(cached);
        if claim.urls.is_empty() {
            return;
        }

        self.state.clear_error();
        let _loading = self.state.begin_loading();
        tracing::debug!(
            "Resolving {} {} (concurrency {})",
            claim.urls.len(),
            T::KIND,
            concurrency.max(1)
        );

        stream::iter(claim.urls.clone())
            .map(|url: String| async move {
                let result = self.fetch_one(&url).await;
                (url, result)
            })
            .buffer_unordered(concurrency.max(1))
            .for_each(|(url, result)| {
                match result {
                    Ok(entity) => {
                        self.state
                            .list
                            .send_modify(|list| merge_by_url(list, entity.clone()));
                        self.remember(&entity);
                    }
                    Err(err) => self.record_failure(&url, &err),
                }
                futures::future::ready(())
            })
            .await;
    }

    /// Make sure a single referenced entity is cached
    pub async fn ensure(&self, url: Option<&str>) {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return;
        };
        self.resolve_many([url], 1).await;
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the list
    pub fn list(&self) -> Vec<T> {
        self.state.list.borrow().clone()
    }

    pub fn detail(&self) -> Option<T> {
        self.state.detail.borrow().clone()
    }

    pub fn loading(&self) -> bool {
        *self.state.loading.borrow()
    }

    pub fn error(&self) -> Option<String> {
        self.state.error.borrow().clone()
    }

    pub fn list_loaded(&self) -> bool {
        *self.state.list_loaded.borrow()
    }

    pub fn subscribe_list(&self) -> watch::Receiver<Vec<T>> {
        self.state.list.subscribe()
    }

    pub fn subscribe_detail(&self) -> watch::Receiver<Option<T>> {
        self.state.detail.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.state.loading.subscribe()
    }

    pub fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        self.state.error.subscribe()
    }

    pub fn subscribe_list_loaded(&self) -> watch::Receiver<bool> {
        self.state.list_loaded.subscribe()
    }

    /// Entity from the detail cache
    pub fn cached(&self, url: &str) -> Option<T> {
        lock(&self.cache).get(url).cloned()
    }

    /// Entities of `list` matching `urls`, in the order of `urls`;
    /// unresolved URLs are skipped
    pub fn select(&self, urls: &[String]) -> Vec<T> {
        let list = self.state.list.borrow();
        let index: HashMap<&str, &T> = list.iter().map(|e| (e.url(), e)).collect();
        urls.iter()
            .filter_map(|u| index.get(u.as_str()).map(|e| (*e).clone()))
            .collect()
    }

    /// Display label of a referenced entity
    pub fn label_for(&self, url: Option<&str>) -> String {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return "-".to_string();
        };
        let list = self.state.list.borrow();
        match list.iter().find(|e| e.url() == url) {
            Some(entity) => entity.display_name().to_string(),
            None => "Loading...".to_string(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn fetch_one(&self, url: &str) -> Result<T, FetchError> {
        let value = self.http.get_json(url).await?;
        serde_json::from_value(value).map_err(FetchError::decode)
    }

    async fn fetch_list(&self) -> Result<Vec<T>, FetchError> {
        let mut items = Vec::new();
        let mut page_url = Some(self.base_url.clone());
        let mut visited = HashSet::new();

        while let Some(url) = page_url.take() {
            if !visited.insert(url.clone()) {
                tracing::warn!("Pagination loop at {}, stopping", url);
                break;
            }

            let value = self.http.get_json(&url).await?;
            let page: ListResponse<T> =
                serde_json::from_value(value).map_err(FetchError::decode)?;
            items.extend(page.results);

            if self.options.follow_pages {
                page_url = page.next;
            }
        }

        Ok(items)
    }

    /// First write wins per URL
    fn remember(&self, entity: &T) {
        lock(&self.cache)
            .entry(entity.url().to_string())
            .or_insert_with(|| entity.clone());
    }

    fn record_failure(&self, url: &str, err: &FetchError) {
        tracing::warn!("{} fetch failed for {}: {}", T::KIND, url, err);
        self.state.set_error(format_error(err));
    }

    /// Dedupe `urls`, set aside cached ones, skip ones another batch is
    /// fetching, and mark the rest as being fetched
    fn claim<I, S>(&self, urls: I) -> (Claim<'_>, Vec<T>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cache = lock(&self.cache);
        let mut resolving = lock(&self.resolving);
        let mut claimed = Vec::new();
        let mut cached = Vec::new();

        for url in urls {
            let url = url.into();
            if let Some(hit) = cache.get(&url) {
                cached.push(hit.clone());
                continue;
            }
            if resolving.contains(&url) {
                continue;
            }
            resolving.insert(url.clone());
            claimed.push(url);
        }

        let claim = Claim {
            resolving: &self.resolving,
            urls: claimed,
        };
        (claim, cached)
    }

    /// Append cached entities the list lost or never had; notifies only
    /// when something was added
    fn restore(&self, cached: Vec<T>) {
        if cached.is_empty() {
            return;
        }
        self.state.list.send_if_modified(|list| {
            let mut added = false;
            for entity in cached {
                if !list.iter().any(|e| e.url() == entity.url()) {
                    list.push(entity);
                    added = true;
                }
            }
            added
        });
    }
}

impl<T: Resource, C: Transport> ResourceStore<T, C> {
    /// Run [`resolve_many`](Self::resolve_many) as a background task
    pub fn spawn_resolve_many(self: &Arc<Self>, urls: Vec<String>, concurrency: usize) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move { store.resolve_many(urls, concurrency).await })
    }

    /// Run [`ensure`](Self::ensure) as a background task
    pub fn spawn_ensure(self: &Arc<Self>, url: String) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move { store.ensure(Some(&url)).await })
    }
}

/// URLs a batch is fetching; released when the batch ends or is dropped
struct Claim<'a> {
    resolving: &'a Mutex<HashSet<String>>,
    urls: Vec<String>,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let mut resolving = lock(self.resolving);
        for url in &self.urls {
            resolving.remove(url);
        }
    }
}

/// Replace the entry with the same URL in place, or append
pub fn merge_by_url<T: Resource>(list: &mut Vec<T>, entity: T) {
    match list.iter_mut().find(|e| e.url() == entity.url()) {
        Some(slot) => *slot = entity,
        None => list.push(entity),
    }
}

/// Stable sort by [`Resource::sequence`]; unkeyed entities keep their
/// relative order after the keyed ones
pub fn sort_entities<T: Resource>(items: &mut [T]) {
    items.sort_by_key(|e| match e.sequence() {
        Some(n) => (0, n),
        None => (1, 0),
    });
}
