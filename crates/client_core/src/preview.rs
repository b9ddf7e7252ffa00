//! Preview references: transient `preview://` URLs resolving to the bytes of
//! the selected file.
//!
//! Every acquisition is owned by a [`PreviewGuard`] that releases the
//! reference exactly once when dropped.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::selected_file::SelectedFile;

pub const PREVIEW_SCHEME: &str = "preview";

pub trait PreviewBackend: Send + Sync {
    fn acquire(&self, file: &SelectedFile) -> String;
    fn release(&self, url: &str);
}

pub struct PreviewGuard {
    url: String,
    backend: Arc<dyn PreviewBackend>,
}

impl PreviewGuard {
    pub fn acquire(backend: Arc<dyn PreviewBackend>, file: &SelectedFile) -> Self {
        let url = backend.acquire(file);
        Self { url, backend }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewGuard {
    fn drop(&mut self) {
        self.backend.release(&self.url);
    }
}

impl std::fmt::Debug for PreviewGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewGuard").field("url", &self.url).finish()
    }
}

/// Process-local preview store, the analogue of a browser object URL table.
#[derive(Default)]
pub struct InMemoryPreviews {
    entries: Mutex<HashMap<String, Arc<[u8]>>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    release_calls: AtomicUsize,
}

impl InMemoryPreviews {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    pub fn live_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        urls.sort();
        urls
    }

    pub fn live_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn acquired_count(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Every `release` call, including ones for unknown or already released
    /// URLs. Equal to [`Self::released_count`] when nothing is released twice.
    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }
}

impl PreviewBackend for InMemoryPreviews {
    fn acquire(&self, file: &SelectedFile) -> String {
        let url = format!("{PREVIEW_SCHEME}://{}", Uuid::new_v4());
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), file.bytes());
        self.acquired.fetch_add(1, Ordering::SeqCst);
        debug!(%url, file_name = file.file_name(), "preview: acquired");
        url
    }

    fn release(&self, url: &str) {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url);
        if removed.is_some() {
            self.released.fetch_add(1, Ordering::SeqCst);
            debug!(%url, "preview: released");
        } else {
            warn!(%url, "preview: release of unknown reference");
        }
    }
}

#[cfg(test)]
#[path = "tests/preview_tests.rs"]
mod tests;
