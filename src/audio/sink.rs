//! Utilities for creating `rodio` sinks from playlist items.
//!
//! The helpers here encapsulate opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::engine::PlayerError;
use super::types::MediaItem;

/// Create a paused `Sink` for `item` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    item: &MediaItem,
    start_at: Duration,
) -> Result<Sink, PlayerError> {
    let file = File::open(&item.locator).map_err(|source| PlayerError::Open {
        path: item.locator.clone(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| PlayerError::Decode {
            path: item.locator.clone(),
            reason: e.to_string(),
        })?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

/// Track length from the container headers, when they carry one.
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
