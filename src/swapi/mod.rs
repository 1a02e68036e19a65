//! SWAPI interaction module
//!
//! This module provides the HTTP side of holonet: the transport seam the
//! resource stores fetch through, the reqwest-backed client, and the error
//! taxonomy every store normalizes failures with.
//!
//! # Module Structure
//!
//! - [`client`] - API root plus transport, endpoint URL helpers
//! - [`http`] - `Transport` trait and the reqwest implementation
//! - [`error`] - `FetchError` and user-facing messages
//!
//! # Example
//!
//! ```ignore
//! use holonet::swapi::{SwapiClient, Transport};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = SwapiClient::new("https://swapi.dev/api")?;
//!     let film = client.http.get_json(&client.endpoint("films/1/")).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;

pub use client::SwapiClient;
pub use error::{format_error, FetchError};
pub use http::{SwapiHttpClient, Transport};
