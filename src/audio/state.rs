//! Playlist bookkeeping shared by every `Player` implementation.

use super::types::{LoopMode, MediaItem, PlaybackStatus, PlayerEvent};

/// Items, cursor, intent and status, plus the events their changes produce.
#[derive(Debug, Default)]
pub(crate) struct PlaylistState {
    items: Vec<MediaItem>,
    index: Option<usize>,
    pub play_intent: bool,
    status: PlaybackStatus,
    pub loop_mode: LoopMode,
    was_playing: bool,
    events: Vec<PlayerEvent>,
}

impl PlaylistState {
    pub fn new(loop_mode: LoopMode) -> Self {
        Self {
            loop_mode,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current_item(&self) -> Option<&MediaItem> {
        self.index.and_then(|i| self.items.get(i))
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Audio is wanted and there is something ready to produce it.
    pub fn is_playing(&self) -> bool {
        self.play_intent && self.status == PlaybackStatus::Ready && self.index.is_some()
    }

    pub fn load(&mut self, items: Vec<MediaItem>, start_index: usize) {
        self.items = items;
        if self.items.is_empty() {
            self.clear_index();
        } else {
            self.set_index(start_index.min(self.items.len() - 1));
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.clear_index();
        self.set_status(PlaybackStatus::Idle);
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = Some(index);
        self.events.push(PlayerEvent::ItemTransition { index: Some(index) });
    }

    fn clear_index(&mut self) {
        if self.index.take().is_some() {
            self.events.push(PlayerEvent::ItemTransition { index: None });
        }
    }

    pub fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            self.status = status;
            self.events.push(PlayerEvent::PlaybackStateChanged(status));
        }
    }

    /// Record a `PlayingChanged` if `is_playing` flipped since the last call.
    pub fn sync_playing(&mut self) -> bool {
        let playing = self.is_playing();
        if playing != self.was_playing {
            self.was_playing = playing;
            self.events.push(PlayerEvent::PlayingChanged(playing));
        }
        playing
    }

    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }
}
