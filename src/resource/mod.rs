//! Resource abstraction layer
//!
//! This module provides the cache-and-fetch engine shared by the four SWAPI
//! resource kinds. One generic [`ResourceStore`] is instantiated per kind;
//! [`Stores`] wires the four together and resolves cross-references.
//!
//! # Architecture
//!
//! - [`registry`] - Resource kinds and their endpoint paths
//! - [`model`] - Entity types and the [`Resource`] trait
//! - [`state`] - Observable state cells (`tokio::sync::watch`)
//! - [`store`] - List cache, detail cache, bounded batch resolution
//! - [`resolver`] - Composition root and cross-reference resolution
//!
//! # Example
//!
//! ```ignore
//! use holonet::resource::{StoreOptions, Stores};
//! use holonet::swapi::SwapiClient;
//!
//! async fn film_cast(client: &SwapiClient) -> Vec<String> {
//!     let stores = Stores::new(client, StoreOptions::default());
//!     let (film, resolution) = stores.load_detail(&stores.films, "1", 5).await;
//!     resolution.settled().await;
//!     film.map(|f| stores.people.select(&f.characters))
//!         .unwrap_or_default()
//!         .into_iter()
//!         .map(|p| p.name)
//!         .collect()
//! }
//! ```

pub mod model;
pub mod registry;
pub mod resolver;
pub mod state;
pub mod store;

pub use model::{resource_id, Film, ListResponse, Person, Planet, Reference, Resource, Vehicle};
pub use registry::{get_all_resource_keys, get_resource, ResourceDef, ResourceKind};
pub use resolver::{Resolution, Stores, DEFAULT_CONCURRENCY};
pub use state::StoreState;
pub use store::{merge_by_url, sort_entities, ResourceStore, StoreOptions};
