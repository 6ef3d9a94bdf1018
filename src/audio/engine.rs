use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::types::{MediaItem, PlaybackStatus, PlayerEvent};

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no audio output available: {0}")]
    NoOutput(String),
    #[error("failed to open {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// The single media engine the session coordinator drives.
///
/// Implementations are owned by one thread and never shared. Mutators queue
/// `PlayerEvent`s which the owner collects with `drain_events`.
pub trait Player {
    /// Replace the playlist and position the player at `start_index`.
    /// `start_index` must be in range; the play intent is left unchanged.
    fn load_items(&mut self, items: Vec<MediaItem>, start_index: usize, start_position: Duration);

    fn clear_items(&mut self);

    /// Whether audio should run as soon as it can.
    fn set_play_intent(&mut self, play: bool);

    /// Re-prepare if stopped or ended, then run.
    fn play(&mut self);

    fn pause(&mut self) {
        self.set_play_intent(false);
    }

    /// Drop the decoded stream and stay idle until the next `play`.
    fn stop(&mut self);

    fn seek_to(&mut self, position: Duration);

    /// `index` is clamped into the playlist.
    fn seek_to_index(&mut self, index: usize, position: Duration);

    fn next_item(&mut self);

    fn item_count(&self) -> usize;
    fn current_index(&self) -> Option<usize>;
    fn current_item(&self) -> Option<&MediaItem>;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn is_playing(&self) -> bool;
    fn play_intent(&self) -> bool;
    fn status(&self) -> PlaybackStatus;

    /// Give the engine a chance to notice a finished track.
    fn tick(&mut self);

    fn drain_events(&mut self) -> Vec<PlayerEvent>;

    /// Stop audio and let go of the playlist. The player is not used afterwards.
    fn release(&mut self);
}
