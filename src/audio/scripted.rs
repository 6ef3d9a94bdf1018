//! In-memory `Player` for exercising the session without an output device.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::engine::Player;
use super::queue::following_index;
use super::state::PlaylistState;
use super::types::{LoopMode, MediaItem, PlaybackStatus, PlayerEvent};

/// Every track lasts this long.
pub(crate) const TRACK_LENGTH: Duration = Duration::from_secs(180);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadCall {
    pub titles: Vec<String>,
    pub start_index: usize,
    pub start_position: Duration,
}

/// What the test can still see after the player moved into the coordinator.
#[derive(Debug, Clone, Default)]
pub(crate) struct PlayerProbe {
    loads: Arc<Mutex<Vec<LoadCall>>>,
    released: Arc<Mutex<bool>>,
}

impl PlayerProbe {
    pub fn loads(&self) -> Vec<LoadCall> {
        self.loads.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn released(&self) -> bool {
        self.released.lock().map(|r| *r).unwrap_or(false)
    }
}

/// Advances `step` of position per `tick` while playing.
pub(crate) struct ScriptedPlayer {
    state: PlaylistState,
    position: Duration,
    step: Duration,
    probe: PlayerProbe,
}

impl ScriptedPlayer {
    pub fn new(step: Duration) -> (Self, PlayerProbe) {
        let probe = PlayerProbe::default();
        let player = Self {
            state: PlaylistState::new(LoopMode::LoopAll),
            position: Duration::ZERO,
            step,
            probe: probe.clone(),
        };
        (player, probe)
    }

    fn prepare(&mut self, position: Duration) {
        self.position = position.min(TRACK_LENGTH);
        self.state.set_status(if self.state.is_empty() {
            PlaybackStatus::Idle
        } else {
            PlaybackStatus::Ready
        });
        self.state.sync_playing();
    }
}

impl Player for ScriptedPlayer {
    fn load_items(&mut self, items: Vec<MediaItem>, start_index: usize, start_position: Duration) {
        if let Ok(mut loads) = self.probe.loads.lock() {
            loads.push(LoadCall {
                titles: items.iter().map(|i| i.title.clone()).collect(),
                start_index,
                start_position,
            });
        }
        self.state.load(items, start_index);
        self.prepare(start_position);
    }

    fn clear_items(&mut self) {
        self.position = Duration::ZERO;
        self.state.clear();
        self.state.sync_playing();
    }

    fn set_play_intent(&mut self, play: bool) {
        self.state.play_intent = play;
        self.state.sync_playing();
    }

    fn play(&mut self) {
        if self.state.status() != PlaybackStatus::Ready && !self.state.is_empty() {
            self.prepare(self.position);
        }
        self.set_play_intent(true);
    }

    fn stop(&mut self) {
        self.state.play_intent = false;
        if !self.state.is_empty() {
            self.state.set_status(PlaybackStatus::Idle);
        }
        self.state.sync_playing();
    }

    fn seek_to(&mut self, position: Duration) {
        if self.state.index().is_some() {
            self.position = position.min(TRACK_LENGTH);
        }
    }

    fn seek_to_index(&mut self, index: usize, position: Duration) {
        if self.state.is_empty() {
            return;
        }
        self.state.set_index(index.min(self.state.len() - 1));
        self.prepare(position);
    }

    fn next_item(&mut self) {
        let Some(current) = self.state.index() else {
            return;
        };
        if let Some(next) = following_index(current, self.state.len(), self.state.loop_mode, false)
        {
            self.state.set_index(next);
            self.prepare(Duration::ZERO);
        }
    }

    fn item_count(&self) -> usize {
        self.state.len()
    }

    fn current_index(&self) -> Option<usize> {
        self.state.index()
    }

    fn current_item(&self) -> Option<&MediaItem> {
        self.state.current_item()
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        self.state.index().map(|_| TRACK_LENGTH)
    }

    fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    fn play_intent(&self) -> bool {
        self.state.play_intent
    }

    fn status(&self) -> PlaybackStatus {
        self.state.status()
    }

    fn tick(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.position = (self.position + self.step).min(TRACK_LENGTH);
        if self.position < TRACK_LENGTH {
            return;
        }
        let Some(current) = self.state.index() else {
            return;
        };
        match following_index(current, self.state.len(), self.state.loop_mode, true) {
            Some(next) => {
                self.state.set_index(next);
                self.prepare(Duration::ZERO);
            }
            None => {
                self.state.set_status(PlaybackStatus::Ended);
                self.state.sync_playing();
            }
        }
    }

    fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.state.drain_events()
    }

    fn release(&mut self) {
        self.state.play_intent = false;
        self.state.clear();
        self.state.sync_playing();
        if let Ok(mut released) = self.probe.released.lock() {
            *released = true;
        }
    }
}
