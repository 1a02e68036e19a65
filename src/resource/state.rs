//! Observable store state
//!
//! Every field is a `tokio::sync::watch` cell: any number of readers can
//! subscribe, and a reader attached late sees the current value immediately.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Observable state of one resource store
pub struct StoreState<T> {
    pub(crate) list: watch::Sender<Vec<T>>,
    pub(crate) detail: watch::Sender<Option<T>>,
    pub(crate) loading: watch::Sender<bool>,
    pub(crate) error: watch::Sender<Option<String>>,
    pub(crate) list_loaded: watch::Sender<bool>,
    /// Operations currently holding a [`LoadingGuard`]
    in_flight: Mutex<usize>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            list: watch::Sender::new(Vec::new()),
            detail: watch::Sender::new(None),
            loading: watch::Sender::new(false),
            error: watch::Sender::new(None),
            list_loaded: watch::Sender::new(false),
            in_flight: Mutex::new(0),
        }
    }
}

impl<T> StoreState<T> {
    /// Mark one operation as in flight until the guard drops
    pub(crate) fn begin_loading(&self) -> LoadingGuard<'_, T> {
        let mut count = lock(&self.in_flight);
        *count += 1;
        if *count == 1 {
            self.loading.send_replace(true);
        }
        LoadingGuard { state: self }
    }

    pub(crate) fn clear_error(&self) {
        self.error.send_if_modified(|current| current.take().is_some());
    }

    pub(crate) fn set_error(&self, message: String) {
        self.error.send_replace(Some(message));
    }
}

/// Keeps `loading` raised while alive; lowers it when the last one drops
pub(crate) struct LoadingGuard<'a, T> {
    state: &'a StoreState<T>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        let mut count = lock(&self.state.in_flight);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.state.loading.send_replace(false);
        }
    }
}
