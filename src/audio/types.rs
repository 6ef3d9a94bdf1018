//! Audio-related small types.
//!
//! This module defines the items a player is loaded with, the loop mode and
//! the events a player reports back to its owner.

use std::path::PathBuf;

use crate::config::LoopModeSetting;
use crate::library::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Do not wrap at the end of the playlist.
    NoLoop,
    /// Wrap around to the start of the playlist.
    #[default]
    LoopAll,
    /// Repeat the current song when it ends.
    LoopOne,
}

impl From<LoopModeSetting> for LoopMode {
    fn from(setting: LoopModeSetting) -> Self {
        match setting {
            LoopModeSetting::NoLoop => LoopMode::NoLoop,
            LoopModeSetting::LoopAll => LoopMode::LoopAll,
            LoopModeSetting::LoopOne => LoopMode::LoopOne,
        }
    }
}

/// One entry of the player's playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub locator: PathBuf,
    pub title: String,
}

impl From<&Track> for MediaItem {
    fn from(track: &Track) -> Self {
        Self {
            locator: track.locator.clone(),
            title: track.name.clone(),
        }
    }
}

/// Coarse engine state, independent of whether audio is wanted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Nothing prepared: empty playlist or stopped.
    #[default]
    Idle,
    /// The current item is open and can produce audio.
    Ready,
    /// The playlist ran out (no-loop mode) or no item could be opened.
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The current item changed, including to or from "no item".
    ItemTransition { index: Option<usize> },
    /// Audio started or stopped coming out.
    PlayingChanged(bool),
    PlaybackStateChanged(PlaybackStatus),
}
