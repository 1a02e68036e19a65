//! SWAPI Client
//!
//! Combines the API root with a transport and builds endpoint URLs.

use super::http::{SwapiHttpClient, Transport};
use crate::resource::ResourceKind;
use anyhow::Result;
use std::sync::Arc;

/// Main SWAPI client
pub struct SwapiClient<C = SwapiHttpClient> {
    pub http: Arc<C>,
    api_uri: String,
}

impl<C> Clone for SwapiClient<C> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            api_uri: self.api_uri.clone(),
        }
    }
}

impl SwapiClient {
    /// Create a client over the default reqwest transport
    pub fn new(api_uri: &str) -> Result<Self> {
        Ok(Self::with_transport(api_uri, SwapiHttpClient::new()?))
    }
}

impl<C: Transport> SwapiClient<C> {
    /// Create a client over any transport
    pub fn with_transport(api_uri: &str, http: C) -> Self {
        Self {
            http: Arc::new(http),
            api_uri: api_uri.trim_end_matches('/').to_string(),
        }
    }

    /// API root, without a trailing slash
    pub fn api_uri(&self) -> &str {
        &self.api_uri
    }

    /// Build an absolute endpoint from the API root.
    /// `path` must not start with a slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_uri, path)
    }

    /// Base endpoint of one resource kind, e.g. `https://swapi.dev/api/films`
    pub fn resource_url(&self, kind: ResourceKind) -> String {
        self.endpoint(kind.path())
    }
}
