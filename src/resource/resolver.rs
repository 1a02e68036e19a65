//! Cross-reference resolution
//!
//! [`Stores`] is the composition root for the four resource stores. After a
//! detail entity is fetched, its reference fields are handed to the stores of
//! the kinds they point at, each as an independent background task.

use super::model::{Film, Person, Planet, Reference, Resource, Vehicle};
use super::registry::ResourceKind;
use super::store::{ResourceStore, StoreOptions};
use crate::swapi::{SwapiClient, SwapiHttpClient, Transport};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Default number of parallel requests per reference field
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Background resolutions started for one detail entity
#[derive(Debug, Default)]
pub struct Resolution {
    handles: Vec<JoinHandle<()>>,
}

impl Resolution {
    /// Number of reference fields being resolved
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every resolution to finish
    pub async fn settled(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::warn!("Reference resolution task failed: {}", e);
            }
        }
    }
}

/// The four resource stores, shared by every consumer
pub struct Stores<C = SwapiHttpClient> {
    pub films: Arc<ResourceStore<Film, C>>,
    pub people: Arc<ResourceStore<Person, C>>,
    pub planets: Arc<ResourceStore<Planet, C>>,
    pub vehicles: Arc<ResourceStore<Vehicle, C>>,
}

impl<C> Clone for Stores<C> {
    fn clone(&self) -> Self {
        Self {
            films: Arc::clone(&self.films),
            people: Arc::clone(&self.people),
            planets: Arc::clone(&self.planets),
            vehicles: Arc::clone(&self.vehicles),
        }
    }
}

impl<C: Transport> Stores<C> {
    pub fn new(client: &SwapiClient<C>, options: StoreOptions) -> Self {
        Self {
            films: Arc::new(ResourceStore::new(client, options)),
            people: Arc::new(ResourceStore::new(client, options)),
            planets: Arc::new(ResourceStore::new(client, options)),
            vehicles: Arc::new(ResourceStore::new(client, options)),
        }
    }

    /// Fetch a detail entity and start resolving its references.
    /// Returns `None` (and no resolution) when the fetch fails.
    pub async fn load_detail<T: Resource>(
        &self,
        store: &ResourceStore<T, C>,
        id: &str,
        concurrency: usize,
    ) -> (Option<T>, Resolution) {
        match store.get_by_id(id).await {
            Some(entity) => {
                let resolution = self.resolve_references(&entity, concurrency);
                (Some(entity), resolution)
            }
            None => (None, Resolution::default()),
        }
    }

    /// Hand every reference field of `entity` to the store of its kind
    pub fn resolve_references<T: Resource>(&self, entity: &T, concurrency: usize) -> Resolution {
        let handles = entity
            .references()
            .into_iter()
            .filter_map(|reference| self.spawn_reference(reference, concurrency))
            .collect();

        Resolution { handles }
    }

    fn spawn_reference(&self, reference: Reference<'_>, concurrency: usize) -> Option<JoinHandle<()>> {
        match reference {
            Reference::Many { kind, urls, .. } => {
                if urls.is_empty() {
                    return None;
                }
                let urls = urls.to_vec();
                Some(match kind {
                    ResourceKind::Film => self.films.spawn_resolve_many(urls, concurrency),
                    ResourceKind::Person => self.people.spawn_resolve_many(urls, concurrency),
                    ResourceKind::Planet => self.planets.spawn_resolve_many(urls, concurrency),
                    ResourceKind::Vehicle => self.vehicles.spawn_resolve_many(urls, concurrency),
                })
            }
            Reference::One { kind, url, .. } => {
                let url = url.filter(|u| !u.is_empty())?.to_string();
                Some(match kind {
                    ResourceKind::Film => self.films.spawn_ensure(url),
                    ResourceKind::Person => self.people.spawn_ensure(url),
                    ResourceKind::Planet => self.planets.spawn_ensure(url),
                    ResourceKind::Vehicle => self.vehicles.spawn_ensure(url),
                })
            }
        }
    }

    /// Display labels of a reference field's targets, in reference order
    pub fn labels(&self, reference: &Reference<'_>) -> Vec<String> {
        reference
            .urls()
            .iter()
            .map(|url| self.label_for(reference.kind(), url))
            .collect()
    }

    pub fn label_for(&self, kind: ResourceKind, url: &str) -> String {
        match kind {
            ResourceKind::Film => self.films.label_for(Some(url)),
            ResourceKind::Person => self.people.label_for(Some(url)),
            ResourceKind::Planet => self.planets.label_for(Some(url)),
            ResourceKind::Vehicle => self.vehicles.label_for(Some(url)),
        }
    }

    pub fn error(&self, kind: ResourceKind) -> Option<String> {
        match kind {
            ResourceKind::Film => self.films.error(),
            ResourceKind::Person => self.people.error(),
            ResourceKind::Planet => self.planets.error(),
            ResourceKind::Vehicle => self.vehicles.error(),
        }
    }

    /// First error among `kinds`, in the given order
    pub fn first_error(&self, kinds: &[ResourceKind]) -> Option<String> {
        kinds.iter().find_map(|kind| self.error(*kind))
    }

    /// True while any store has a request in flight
    pub fn any_loading(&self) -> bool {
        self.films.loading() || self.people.loading() || self.planets.loading() || self.vehicles.loading()
    }
}
