//! What the coordinator publishes: a readable player snapshot and a
//! notification channel clients subscribe to.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audio::{PlaybackStatus, Player, PlayerEvent};
use crate::library::{Catalog, FolderId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Player(PlayerEvent),
    /// A load finished and its tracks are now in the player.
    CatalogLoaded(Catalog),
    /// A load finished with nothing to play; the player was cleared.
    CatalogEmpty(FolderId),
}

/// Player state as of the coordinator's last step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub item_count: usize,
    pub current_index: Option<usize>,
    pub current_title: Option<String>,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub is_playing: bool,
    pub play_intent: bool,
    pub status: PlaybackStatus,
}

impl PlayerSnapshot {
    pub(super) fn of(player: &dyn Player) -> Self {
        Self {
            item_count: player.item_count(),
            current_index: player.current_index(),
            current_title: player.current_item().map(|i| i.title.clone()),
            position: player.position(),
            duration: player.duration(),
            is_playing: player.is_playing(),
            play_intent: player.play_intent(),
            status: player.status(),
        }
    }
}

pub type SnapshotHandle = Arc<Mutex<PlayerSnapshot>>;

pub(super) fn publish_snapshot(handle: &SnapshotHandle, snapshot: PlayerSnapshot) {
    if let Ok(mut s) = handle.lock() {
        *s = snapshot;
    }
}

pub(super) fn read_snapshot(handle: &SnapshotHandle) -> PlayerSnapshot {
    handle.lock().map(|s| s.clone()).unwrap_or_default()
}

/// One subscriber's end of the notification channel.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: Receiver<SessionEvent>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn try_iter(&self) -> mpsc::TryIter<'_, SessionEvent> {
        self.rx.try_iter()
    }
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    subscribers: Vec<(u64, Sender<SessionEvent>)>,
}

/// Fan-out of session events to any number of subscribers.
#[derive(Debug, Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl EventHub {
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.push((id, tx));
        Subscription { id, rx }
    }

    pub fn unsubscribe(&self, id: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Deliver to every live subscriber; dropped receivers are forgotten.
    pub(super) fn publish(&self, event: &SessionEvent) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner
            .subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub(super) fn close(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.subscribers.clear();
    }
}
