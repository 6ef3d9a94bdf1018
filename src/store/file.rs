use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::library::{FolderId, Track};

use super::record::{ResumePoint, StoreRecord, TrackCache};

/// Durable resume state shared by the coordinator and, read-only, the UI.
///
/// Every setter writes the whole record through to disk. Without a path the
/// store lives in memory only.
pub struct PlaybackStore {
    path: Option<PathBuf>,
    record: Mutex<StoreRecord>,
}

impl PlaybackStore {
    /// Open the record at `path`. A missing file starts empty; an unreadable
    /// or unparsable one is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match read_record(&path) {
            Ok(record) => record,
            Err(e) => {
                warn!("ignoring saved playback state: {e:#}");
                StoreRecord::default()
            }
        };
        Self {
            path: Some(path),
            record: Mutex::new(record),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            record: Mutex::new(StoreRecord::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load_folder(&self) -> Option<FolderId> {
        self.lock().folder.clone()
    }

    pub fn save_folder(&self, folder: Option<&FolderId>) -> Result<()> {
        self.update(|r| r.folder = folder.cloned())
    }

    pub fn load_state(&self) -> ResumePoint {
        self.lock().resume_point()
    }

    pub fn save_state(&self, state: ResumePoint) -> Result<()> {
        self.update(|r| {
            r.index = state.index;
            r.position_ms = state.position_ms;
            r.play_when_ready = state.play_when_ready;
        })
    }

    /// Cached tracks for `folder`, or empty when the cache belongs to another
    /// folder or cannot be decoded.
    pub fn load_tracks(&self, folder: &FolderId) -> Vec<Track> {
        let record = self.lock();
        let Some(cache) = record.track_cache.as_ref() else {
            return Vec::new();
        };
        if &cache.folder != folder {
            return Vec::new();
        }
        match serde_json::from_value::<Vec<Track>>(cache.tracks.clone()) {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("cached track list for {folder} is unreadable: {e}");
                Vec::new()
            }
        }
    }

    pub fn save_tracks(&self, folder: &FolderId, tracks: &[Track]) -> Result<()> {
        let tracks = serde_json::to_value(tracks).context("failed to encode track list")?;
        self.update(|r| {
            r.track_cache = Some(TrackCache {
                folder: folder.clone(),
                tracks,
            })
        })
    }

    pub fn clear_tracks(&self) -> Result<()> {
        self.update(|r| r.track_cache = None)
    }

    fn lock(&self) -> MutexGuard<'_, StoreRecord> {
        // A panic mid-update leaves a record that is still structurally valid.
        self.record.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn update(&self, f: impl FnOnce(&mut StoreRecord)) -> Result<()> {
        let mut record = self.lock();
        f(&mut record);
        match &self.path {
            Some(path) => write_record(path, &record),
            None => Ok(()),
        }
    }
}

fn read_record(path: &Path) -> Result<StoreRecord> {
    if !path.exists() {
        return Ok(StoreRecord::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    let record = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse state file {}", path.display()))?;
    Ok(record)
}

fn write_record(path: &Path, record: &StoreRecord) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(record)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    debug!("playback state written to {}", path.display());
    Ok(())
}
