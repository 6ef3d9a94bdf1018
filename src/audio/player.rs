use std::time::Duration;

use log::{debug, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::clock::PlaybackClock;
use super::engine::{Player, PlayerError};
use super::queue::following_index;
use super::sink::{create_sink_at, probe_duration};
use super::state::PlaylistState;
use super::types::{LoopMode, MediaItem, PlaybackStatus, PlayerEvent};

/// `Player` backed by the default output device: one paused-or-running sink
/// for the current item, rebuilt on every seek or track change.
pub struct RodioPlayer {
    stream: OutputStream,
    sink: Option<Sink>,
    state: PlaylistState,
    clock: PlaybackClock,
    duration: Option<Duration>,
}

impl RodioPlayer {
    /// Open the default output device. Must run on the thread that will own the player.
    pub fn open(loop_mode: LoopMode) -> Result<Self, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::NoOutput(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            state: PlaylistState::new(loop_mode),
            clock: PlaybackClock::default(),
            duration: None,
        })
    }

    fn drop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    /// Open the current item at `position`. Items that fail to open are
    /// skipped in playlist order; if none opens the player ends.
    fn prepare(&mut self, position: Duration) {
        self.drop_sink();
        let mut position = position;

        for _ in 0..self.state.len() {
            let (Some(index), Some(item)) = (self.state.index(), self.state.current_item().cloned())
            else {
                break;
            };

            match create_sink_at(&self.stream, &item, position) {
                Ok(sink) => {
                    debug!("prepared {:?} at {position:?}", item.locator);
                    self.sink = Some(sink);
                    self.clock.reset(position);
                    self.duration = probe_duration(&item.locator);
                    self.state.set_status(PlaybackStatus::Ready);
                    self.apply_intent();
                    return;
                }
                Err(e) => {
                    warn!("skipping {}: {e}", item.title);
                    let Some(next) =
                        following_index(index, self.state.len(), self.state.loop_mode, false)
                    else {
                        break;
                    };
                    self.state.set_index(next);
                    position = Duration::ZERO;
                }
            }
        }

        self.clock.reset(Duration::ZERO);
        self.duration = None;
        self.state.set_status(if self.state.is_empty() {
            PlaybackStatus::Idle
        } else {
            PlaybackStatus::Ended
        });
        self.apply_intent();
    }

    /// Bring the sink and clock in line with `is_playing`.
    fn apply_intent(&mut self) {
        let playing = self.state.is_playing();
        if let Some(sink) = self.sink.as_ref() {
            if playing {
                sink.play();
                self.clock.resume();
            } else {
                sink.pause();
                self.clock.pause();
            }
        }
        self.state.sync_playing();
    }
}

impl Player for RodioPlayer {
    fn load_items(&mut self, items: Vec<MediaItem>, start_index: usize, start_position: Duration) {
        self.state.load(items, start_index);
        self.prepare(start_position);
    }

    fn clear_items(&mut self) {
        self.drop_sink();
        self.clock.reset(Duration::ZERO);
        self.duration = None;
        self.state.clear();
        self.apply_intent();
    }

    fn set_play_intent(&mut self, play: bool) {
        self.state.play_intent = play;
        self.apply_intent();
    }

    fn play(&mut self) {
        match self.state.status() {
            PlaybackStatus::Idle if !self.state.is_empty() => self.prepare(self.clock.elapsed()),
            PlaybackStatus::Ended if !self.state.is_empty() => self.prepare(Duration::ZERO),
            _ => {}
        }
        self.set_play_intent(true);
    }

    fn stop(&mut self) {
        let position = self.position();
        self.drop_sink();
        self.clock.reset(position);
        self.state.play_intent = false;
        if !self.state.is_empty() {
            self.state.set_status(PlaybackStatus::Idle);
        }
        self.apply_intent();
    }

    fn seek_to(&mut self, position: Duration) {
        if self.state.index().is_none() {
            return;
        }
        let position = self.duration.map_or(position, |d| position.min(d));
        if self.state.status() == PlaybackStatus::Ready {
            self.prepare(position);
        } else {
            self.clock.reset(position);
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
        let elapsed = self.clock.elapsed();
        self.duration.map_or(elapsed, |d| elapsed.min(d))
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
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
        if !self.state.is_playing() || !self.sink.as_ref().is_some_and(|s| s.empty()) {
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
                self.drop_sink();
                self.state.set_status(PlaybackStatus::Ended);
                self.apply_intent();
            }
        }
    }

    fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.state.drain_events()
    }

    fn release(&mut self) {
        self.drop_sink();
        self.state.play_intent = false;
        self.state.clear();
        self.state.sync_playing();
    }
}
