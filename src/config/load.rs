use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `FOLIO__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("FOLIO")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Reject values that would stall the coordinator or the progress sampler.
    pub fn validate(&self) -> Result<(), String> {
        if self.session.persist_interval_ms == 0 {
            return Err("session.persist_interval_ms must be >= 1".to_string());
        }
        if self.session.tick_ms == 0 {
            return Err("session.tick_ms must be >= 1".to_string());
        }
        if self.progress.playing_interval_ms == 0 || self.progress.idle_interval_ms == 0 {
            return Err("progress intervals must be >= 1".to_string());
        }
        if self.library.extension.trim().trim_start_matches('.').is_empty() {
            return Err("library.extension must not be empty".to_string());
        }
        Ok(())
    }

    /// The resume record path: explicit setting, else the XDG state directory.
    pub fn state_path(&self) -> Option<PathBuf> {
        self.store.state_path.clone().or_else(default_state_path)
    }
}

/// Resolve the config path from `FOLIO_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("FOLIO_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/folio/config.toml`
/// or `~/.config/folio/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("folio").join("config.toml"))
}

/// `$XDG_STATE_HOME/folio/playback.json` or `~/.local/state/folio/playback.json`.
pub fn default_state_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("folio").join("playback.json"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
