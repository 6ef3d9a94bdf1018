use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use crate::audio::{LoopMode, Player, RodioPlayer};
use crate::config::Settings;
use crate::controller::ControllerClient;
use crate::library::{DirectoryLister, FolderId, FsLister};
use crate::session::{PlayerFactory, SessionHost};
use crate::store::PlaybackStore;

mod event_loop;
mod settings;

pub use settings::load_settings;

#[cfg(test)]
mod tests;

pub fn run(settings: Settings) -> Result<()> {
    let store = Arc::new(match settings.state_path() {
        Some(path) => PlaybackStore::open(path),
        None => {
            warn!("no state directory available; playback state will not survive a restart");
            PlaybackStore::in_memory()
        }
    });
    if let Some(path) = store.path() {
        info!("playback state at {}", path.display());
    }

    let lister: Arc<dyn DirectoryLister> = Arc::new(FsLister::new(&settings.library));
    let loop_mode = LoopMode::from(settings.playback.loop_mode);
    let factory: PlayerFactory = Arc::new(move || {
        RodioPlayer::open(loop_mode).map(|p| Box::new(p) as Box<dyn Player>)
    });
    let host = SessionHost::new(store, lister, factory, settings.session.clone());
    let mut client = ControllerClient::new(host.clone(), &settings.progress);

    if let Some(dir) = env::args().nth(1) {
        client.select_folder(folder_id(PathBuf::from(dir)));
    }
    client.on_visible();
    if !client.pump_until_connected(Duration::from_secs(2)) {
        warn!("playback session not ready yet; commands will be queued");
    }

    let result = event_loop::run(&mut client, &host);
    client.on_hidden();
    host.shutdown();
    result
}

/// Absolute, symlink-free spelling so the same directory always maps to the
/// same folder identity.
fn folder_id(path: PathBuf) -> FolderId {
    let path = fs::canonicalize(&path).unwrap_or(path);
    FolderId::from(path.as_path())
}
