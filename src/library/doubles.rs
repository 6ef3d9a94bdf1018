//! Listers for exercising the load pipeline without touching the disk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use super::model::{DirectoryLister, FolderId, Track};

/// `count` tracks named `track-00.mp3`, `track-01.mp3`, ... under `folder`.
pub(crate) fn tracks(folder: &str, count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| {
            let name = format!("track-{i:02}.mp3");
            Track::new(format!("{folder}/{name}"), name)
        })
        .collect()
}

/// Fixed listings, counting how often each folder is listed.
#[derive(Debug, Default)]
pub(crate) struct StaticLister {
    listings: HashMap<FolderId, Vec<Track>>,
    calls: Mutex<HashMap<FolderId, usize>>,
}

impl StaticLister {
    pub fn with(mut self, folder: &str, tracks: Vec<Track>) -> Self {
        self.listings.insert(FolderId::new(folder), tracks);
        self
    }

    pub fn calls(&self, folder: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.get(&FolderId::new(folder)).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl DirectoryLister for StaticLister {
    fn list(&self, folder: &FolderId) -> Vec<Track> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(folder.clone()).or_default() += 1;
        }
        self.listings.get(folder).cloned().unwrap_or_default()
    }
}

/// Wraps a lister; listing `gated` blocks until `open` is called.
pub(crate) struct GateLister {
    inner: StaticLister,
    gated: FolderId,
    open: Mutex<bool>,
    cond: Condvar,
    entered: AtomicUsize,
}

impl GateLister {
    pub fn new(inner: StaticLister, gated: &str) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gated: FolderId::new(gated),
            open: Mutex::new(false),
            cond: Condvar::new(),
            entered: AtomicUsize::new(0),
        })
    }

    /// How many listings of the gated folder have started.
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    pub fn open(&self) {
        if let Ok(mut open) = self.open.lock() {
            *open = true;
        }
        self.cond.notify_all();
    }

    pub fn calls(&self, folder: &str) -> usize {
        self.inner.calls(folder)
    }
}

impl DirectoryLister for GateLister {
    fn list(&self, folder: &FolderId) -> Vec<Track> {
        if folder == &self.gated {
            self.entered.fetch_add(1, Ordering::SeqCst);
            let mut open = self.open.lock().unwrap_or_else(|p| p.into_inner());
            while !*open {
                open = self.cond.wait(open).unwrap_or_else(|p| p.into_inner());
            }
        }
        self.inner.list(folder)
    }
}
