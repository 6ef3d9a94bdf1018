use crate::config;

/// Load and validate settings. Config is optional: callers fall back to the
/// defaults and report the message once logging is up.
pub fn load_settings() -> Result<config::Settings, String> {
    let settings =
        config::Settings::load().map_err(|e| format!("failed to load config, using defaults: {e}"))?;
    settings
        .validate()
        .map_err(|msg| format!("invalid config, using defaults: {msg}"))?;
    Ok(settings)
}
