use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Identity of the one folder the player is pointed at.
///
/// Compared verbatim: two spellings of the same directory are two folders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl From<&Path> for FolderId {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub locator: PathBuf,
    pub name: String,
}

impl Track {
    pub fn new(locator: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            name: name.into(),
        }
    }
}

/// An ordered track list together with the folder it was listed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub folder: FolderId,
    pub tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(folder: FolderId, tracks: Vec<Track>) -> Self {
        Self { folder, tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Turns a folder into its ordered track list.
///
/// Implementations must not fail: a missing, unreadable or empty folder
/// lists as an empty `Vec`. Listing may block on I/O; callers run it off the
/// coordinator thread.
pub trait DirectoryLister: Send + Sync {
    fn list(&self, folder: &FolderId) -> Vec<Track>;
}
