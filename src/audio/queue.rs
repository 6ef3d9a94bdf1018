//! Playlist stepping rules shared by the engines.

use super::types::LoopMode;

/// Where to go after `current` in a playlist of `len` items, or `None` to stop.
///
/// A finished track repeats under `LoopOne`; a manual skip never does. Both
/// wrap to the start only under `LoopAll`.
pub(crate) fn following_index(
    current: usize,
    len: usize,
    loop_mode: LoopMode,
    track_ended: bool,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if track_ended && loop_mode == LoopMode::LoopOne {
        return Some(current.min(len - 1));
    }
    if current + 1 < len {
        Some(current + 1)
    } else if loop_mode == LoopMode::LoopAll {
        Some(0)
    } else {
        None
    }
}
