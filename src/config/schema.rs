use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/folio/config.toml` or `~/.config/folio/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `FOLIO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub session: SessionSettings,
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub progress: ProgressSettings,
    pub store: StoreSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// How often the resume point is flushed while a playlist is loaded (milliseconds).
    pub persist_interval_ms: u64,
    /// How long the coordinator waits for a command before polling the engine (milliseconds).
    pub tick_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            persist_interval_ms: 5_000,
            tick_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// The one file extension treated as a track (case-insensitive, without dot).
    pub extension: String,
    /// Whether to list dotfiles.
    pub include_hidden: bool,
    /// Whether symlinked files count as tracks.
    pub follow_links: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extension: "mp3".to_string(),
            include_hidden: false,
            follow_links: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// What happens when a track ends or `next` runs past the last one.
    pub loop_mode: LoopModeSetting,
}

#[derive(Debug, Copy, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopModeSetting {
    #[serde(alias = "no_loop", alias = "no-loop")]
    NoLoop,
    #[default]
    #[serde(
        alias = "loopall",
        alias = "loop_all",
        alias = "loop-all",
        alias = "loop-around"
    )]
    LoopAll,
    #[serde(
        alias = "loopone",
        alias = "loop_one",
        alias = "loop-one",
        alias = "repeat-one"
    )]
    LoopOne,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    /// Sampling cadence for the progress line while audio is playing (milliseconds).
    pub playing_interval_ms: u64,
    /// Sampling cadence while paused or idle (milliseconds).
    pub idle_interval_ms: u64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            playing_interval_ms: 500,
            idle_interval_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Where the resume record lives. Defaults to the XDG state directory.
    pub state_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogSettings {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
