//! In-memory transport for unit tests
//!
//! Serves canned JSON per URL after an optional delay and records the order
//! requests start and finish in, plus the peak number in flight.

use crate::resource::state::lock;
use crate::swapi::{FetchError, Transport};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, Result<Value, FetchError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    default_delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    events: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            default_delay: delay,
            ..Self::default()
        }
    }

    pub fn respond(&self, url: &str, body: Value) {
        lock(&self.responses).insert(url.to_string(), Ok(body));
    }

    pub fn fail(&self, url: &str, error: FetchError) {
        lock(&self.responses).insert(url.to_string(), Err(error));
    }

    pub fn delay(&self, url: &str, delay: Duration) {
        lock(&self.delays).insert(url.to_string(), delay);
    }

    /// "start <url>" / "end <url>" in the order they happened
    pub fn events(&self) -> Vec<String> {
        lock(&self.events).clone()
    }

    /// Number of requests issued for `url`
    pub fn hits(&self, url: &str) -> usize {
        let start = format!("start {}", url);
        lock(&self.events).iter().filter(|e| **e == start).count()
    }

    pub fn total_requests(&self) -> usize {
        lock(&self.events)
            .iter()
            .filter(|e| e.starts_with("start "))
            .count()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Transport for FakeTransport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        lock(&self.events).push(format!("start {}", url));

        let delay = lock(&self.delays)
            .get(url)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        let response = lock(&self.responses)
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::Status {
                    status: 404,
                    message: Some("Not found".to_string()),
                })
            });

        lock(&self.events).push(format!("end {}", url));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}
