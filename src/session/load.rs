//! The cancellable folder-load pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, warn};

use crate::library::{Catalog, DirectoryLister, FolderId};
use crate::store::PlaybackStore;

/// Issues load generations; only the most recently issued one is current.
#[derive(Debug, Clone, Default)]
pub(super) struct LoadGenerations(Arc<AtomicU64>);

impl LoadGenerations {
    /// Supersede every outstanding ticket and hand out a new current one.
    pub fn issue(&self) -> LoadTicket {
        let generation = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket {
            generation,
            current: Arc::clone(&self.0),
        }
    }

    /// Supersede every outstanding ticket without issuing a new one.
    pub fn cancel_all(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == generation
    }
}

#[derive(Debug, Clone)]
pub(super) struct LoadTicket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// Where to start once the catalog is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct LoadTarget {
    pub start_index: i64,
    pub start_position_ms: i64,
    pub play_when_ready: bool,
}

/// A finished listing on its way back to the coordinator.
#[derive(Debug)]
pub(super) struct LoadOutcome {
    pub generation: u64,
    pub catalog: Catalog,
    pub target: LoadTarget,
}

/// Produce the catalog for `folder`, from the cache unless `force_refresh`.
///
/// Returns `None` when the ticket was superseded while listing; in that case
/// nothing is written back.
pub(super) fn resolve_catalog(
    store: &PlaybackStore,
    lister: &dyn DirectoryLister,
    ticket: &LoadTicket,
    folder: &FolderId,
    force_refresh: bool,
) -> Option<Catalog> {
    if !force_refresh {
        let cached = store.load_tracks(folder);
        if !cached.is_empty() {
            debug!("using {} cached tracks for {folder}", cached.len());
            return Some(Catalog::new(folder.clone(), cached));
        }
    }

    let tracks = lister.list(folder);
    if !ticket.is_current() {
        debug!("listing of {folder} superseded; dropping {} tracks", tracks.len());
        return None;
    }
    if !tracks.is_empty() {
        if let Err(e) = store.save_tracks(folder, &tracks) {
            warn!("failed to cache track list for {folder}: {e:#}");
        }
    }
    Some(Catalog::new(folder.clone(), tracks))
}

/// Pull a stored or requested index into `[0, len - 1]`.
pub fn clamp_index(index: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    usize::try_from(index).unwrap_or(0).min(len - 1)
}

/// Negative offsets start from the beginning.
pub fn clamp_position(position_ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(position_ms).unwrap_or(0))
}
