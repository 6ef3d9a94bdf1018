use std::time::{Duration, Instant};

use crate::config::ProgressSettings;
use crate::session::PlayerSnapshot;

/// What the progress line shows. Never written back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub position: Duration,
    pub duration: Option<Duration>,
    pub is_playing: bool,
}

impl From<&PlayerSnapshot> for Progress {
    fn from(snapshot: &PlayerSnapshot) -> Self {
        let position = snapshot
            .duration
            .map_or(snapshot.position, |d| snapshot.position.min(d));
        Self {
            position,
            duration: snapshot.duration,
            is_playing: snapshot.is_playing,
        }
    }
}

/// Decides when the progress line is due for a refresh: faster while audio runs.
#[derive(Debug, Clone)]
pub struct ProgressSampler {
    playing: Duration,
    idle: Duration,
    last: Option<Instant>,
}

impl ProgressSampler {
    pub fn new(settings: &ProgressSettings) -> Self {
        Self {
            playing: Duration::from_millis(settings.playing_interval_ms),
            idle: Duration::from_millis(settings.idle_interval_ms),
            last: None,
        }
    }

    pub fn interval(&self, is_playing: bool) -> Duration {
        if is_playing { self.playing } else { self.idle }
    }

    /// True (and the sample is recorded) when a refresh is due at `now`.
    pub fn due(&mut self, now: Instant, is_playing: bool) -> bool {
        let due = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval(is_playing));
        if due {
            self.last = Some(now);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// `m:ss`, or `h:mm:ss` from an hour up.
pub fn format_time(d: Duration) -> String {
    let total = d.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
