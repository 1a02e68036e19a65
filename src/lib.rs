//! holonet - Star Wars API client with a caching, reference-resolving data layer
//!
//! The library holds the data-access core: four resource stores (films,
//! people, planets, vehicles) built from one generic engine, each with a list
//! cache, a detail cache, bounded-concurrency batch resolution of referenced
//! URLs, and observable loading/error/data state. The `holonet` binary is a
//! thin command-line front end over it.

pub mod config;
pub mod resource;
pub mod swapi;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use resource::{ResourceKind, ResourceStore, StoreOptions, Stores};
pub use swapi::{format_error, FetchError, SwapiClient};
