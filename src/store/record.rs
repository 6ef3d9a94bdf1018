use serde::{Deserialize, Serialize};

use crate::library::FolderId;

/// What should be resumed: an index into the loaded catalog, an offset into
/// that track and whether audio should be running.
///
/// Values are stored as written; consumers clamp them against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResumePoint {
    pub index: i64,
    pub position_ms: i64,
    pub play_when_ready: bool,
}

/// On-disk layout of the state file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct StoreRecord {
    pub folder: Option<FolderId>,
    pub track_cache: Option<TrackCache>,
    pub index: i64,
    pub position_ms: i64,
    pub play_when_ready: bool,
}

/// Track list kept as raw JSON so a damaged list only costs a cache miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct TrackCache {
    pub folder: FolderId,
    pub tracks: serde_json::Value,
}

impl StoreRecord {
    pub fn resume_point(&self) -> ResumePoint {
        ResumePoint {
            index: self.index,
            position_ms: self.position_ms,
            play_when_ready: self.play_when_ready,
        }
    }
}
