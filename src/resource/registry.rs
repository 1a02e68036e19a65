//! Resource Registry - the four SWAPI resource kinds
//!
//! Each kind is described by a static definition: the endpoint path under
//! the API root, a display name, and the names it can be looked up by.

use std::fmt;
use std::str::FromStr;

/// Resource kinds that have a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Film,
    Person,
    Planet,
    Vehicle,
}

/// Static definition of a resource kind
#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    pub kind: ResourceKind,
    pub display_name: &'static str,
    /// Endpoint path under the API root
    pub path: &'static str,
    /// Lookup keys (plural first)
    pub keys: &'static [&'static str],
}

const RESOURCE_DEFS: &[ResourceDef] = &[
    ResourceDef {
        kind: ResourceKind::Film,
        display_name: "Films",
        path: "films",
        keys: &["films", "film"],
    },
    ResourceDef {
        kind: ResourceKind::Person,
        display_name: "People",
        path: "people",
        keys: &["people", "person"],
    },
    ResourceDef {
        kind: ResourceKind::Planet,
        display_name: "Planets",
        path: "planets",
        keys: &["planets", "planet"],
    },
    ResourceDef {
        kind: ResourceKind::Vehicle,
        display_name: "Vehicles",
        path: "vehicles",
        keys: &["vehicles", "vehicle"],
    },
];

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Film,
        ResourceKind::Person,
        ResourceKind::Planet,
        ResourceKind::Vehicle,
    ];

    pub fn def(self) -> &'static ResourceDef {
        // Every kind has exactly one entry in RESOURCE_DEFS
        &RESOURCE_DEFS[self as usize]
    }

    pub fn path(self) -> &'static str {
        self.def().path
    }

    pub fn display_name(self) -> &'static str {
        self.def().display_name
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        get_resource(s).map(|def| def.kind).ok_or_else(|| {
            format!(
                "unknown resource '{}' (expected one of: {})",
                s,
                get_all_resource_keys().join(", ")
            )
        })
    }
}

/// Get a resource definition by any of its keys (case-insensitive)
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    let key = key.trim().to_lowercase();
    RESOURCE_DEFS
        .iter()
        .find(|def| def.keys.iter().any(|k| *k == key))
}

/// Get the primary key of every resource kind (for help output)
pub fn get_all_resource_keys() -> Vec<&'static str> {
    RESOURCE_DEFS.iter().map(|def| def.keys[0]).collect()
}
