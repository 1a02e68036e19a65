//! Entity models mirroring SWAPI JSON
//!
//! Every entity is keyed by its canonical `url`. Reference fields hold URLs of
//! other entities; [`Resource::references`] exposes the ones holonet can
//! resolve through a store.

use super::registry::ResourceKind;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A reference field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    /// An ordered list of URLs (a film's characters)
    Many {
        label: &'static str,
        kind: ResourceKind,
        urls: &'a [String],
    },
    /// A single URL (a person's homeworld)
    One {
        label: &'static str,
        kind: ResourceKind,
        url: Option<&'a str>,
    },
}

impl Reference<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Many { label, .. } | Self::One { label, .. } => label,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Many { kind, .. } | Self::One { kind, .. } => *kind,
        }
    }

    /// All URLs of this field, in order
    pub fn urls(&self) -> Vec<String> {
        match self {
            Self::Many { urls, .. } => urls.to_vec(),
            Self::One { url, .. } => url.iter().map(|u| u.to_string()).collect(),
        }
    }
}

/// An entity type a store can hold
pub trait Resource:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ResourceKind;

    /// Canonical URL, the identity key
    fn url(&self) -> &str;

    /// Title for films, name for everything else
    fn display_name(&self) -> &str;

    /// Numeric key the list endpoint is ordered by
    fn sequence(&self) -> Option<u64> {
        resource_id(self.url())
    }

    /// Reference fields pointing at kinds that have a store
    fn references(&self) -> Vec<Reference<'_>> {
        Vec::new()
    }
}

/// Trailing numeric path segment of an entity URL
/// e.g. "https://swapi.dev/api/people/12/" -> 12
pub fn resource_id(url: &str) -> Option<u64> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

/// Film as returned by `/films/:id/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub episode_id: u32,
    #[serde(default)]
    pub opening_crawl: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub planets: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub edited: Option<DateTime<Utc>>,
    pub url: String,
}

impl Resource for Film {
    const KIND: ResourceKind = ResourceKind::Film;

    fn url(&self) -> &str {
        &self.url
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    /// Episode number; a record without one is unkeyed
    fn sequence(&self) -> Option<u64> {
        (self.episode_id > 0).then_some(u64::from(self.episode_id))
    }

    fn references(&self) -> Vec<Reference<'_>> {
        vec![
            Reference::Many {
                label: "Characters",
                kind: ResourceKind::Person,
                urls: &self.characters,
            },
            Reference::Many {
                label: "Planets",
                kind: ResourceKind::Planet,
                urls: &self.planets,
            },
            Reference::Many {
                label: "Vehicles",
                kind: ResourceKind::Vehicle,
                urls: &self.vehicles,
            },
        ]
    }
}

/// Person as returned by `/people/:id/`
/// Numeric-looking fields (height, mass) are strings in SWAPI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub mass: String,
    #[serde(default)]
    pub hair_color: String,
    #[serde(default)]
    pub skin_color: String,
    #[serde(default)]
    pub eye_color: String,
    #[serde(default)]
    pub birth_year: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub homeworld: Option<String>,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub edited: Option<DateTime<Utc>>,
    pub url: String,
}

impl Resource for Person {
    const KIND: ResourceKind = ResourceKind::Person;

    fn url(&self) -> &str {
        &self.url
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn references(&self) -> Vec<Reference<'_>> {
        vec![
            Reference::Many {
                label: "Films",
                kind: ResourceKind::Film,
                urls: &self.films,
            },
            Reference::Many {
                label: "Vehicles",
                kind: ResourceKind::Vehicle,
                urls: &self.vehicles,
            },
            Reference::One {
                label: "Homeworld",
                kind: ResourceKind::Planet,
                url: self.homeworld.as_deref(),
            },
        ]
    }
}

/// Planet as returned by `/planets/:id/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rotation_period: String,
    #[serde(default)]
    pub orbital_period: String,
    #[serde(default)]
    pub diameter: String,
    #[serde(default)]
    pub climate: String,
    #[serde(default)]
    pub gravity: String,
    #[serde(default)]
    pub terrain: String,
    #[serde(default)]
    pub surface_water: String,
    #[serde(default)]
    pub population: String,
    #[serde(default)]
    pub residents: Vec<String>,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub edited: Option<DateTime<Utc>>,
    pub url: String,
}

impl Resource for Planet {
    const KIND: ResourceKind = ResourceKind::Planet;

    fn url(&self) -> &str {
        &self.url
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn references(&self) -> Vec<Reference<'_>> {
        vec![
            Reference::Many {
                label: "Residents",
                kind: ResourceKind::Person,
                urls: &self.residents,
            },
            Reference::Many {
                label: "Films",
                kind: ResourceKind::Film,
                urls: &self.films,
            },
        ]
    }
}

/// Vehicle as returned by `/vehicles/:id/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub cost_in_credits: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub max_atmosphering_speed: String,
    #[serde(default)]
    pub crew: String,
    #[serde(default)]
    pub passengers: String,
    #[serde(default)]
    pub cargo_capacity: String,
    #[serde(default)]
    pub consumables: String,
    #[serde(default)]
    pub vehicle_class: String,
    #[serde(default)]
    pub pilots: Vec<String>,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub edited: Option<DateTime<Utc>>,
    pub url: String,
}

impl Resource for Vehicle {
    const KIND: ResourceKind = ResourceKind::Vehicle;

    fn url(&self) -> &str {
        &self.url
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn references(&self) -> Vec<Reference<'_>> {
        vec![
            Reference::Many {
                label: "Pilots",
                kind: ResourceKind::Person,
                urls: &self.pilots,
            },
            Reference::Many {
                label: "Films",
                kind: ResourceKind::Film,
                urls: &self.films,
            },
        ]
    }
}
