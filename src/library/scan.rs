use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{DirectoryLister, FolderId, Track};

/// Lists the direct children of a folder that carry the configured extension.
pub struct FsLister {
    extension: String,
    include_hidden: bool,
    follow_links: bool,
}

impl FsLister {
    pub fn new(settings: &LibrarySettings) -> Self {
        Self {
            extension: settings
                .extension
                .trim()
                .trim_start_matches('.')
                .to_ascii_lowercase(),
            include_hidden: settings.include_hidden,
            follow_links: settings.follow_links,
        }
    }

    fn is_track(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.to_ascii_lowercase() == self.extension)
            .unwrap_or(false)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

impl DirectoryLister for FsLister {
    fn list(&self, folder: &FolderId) -> Vec<Track> {
        let root = folder.as_path();
        if !root.is_dir() {
            warn!("folder {folder} is not accessible; listing as empty");
            return Vec::new();
        }

        let mut tracks: Vec<Track> = Vec::new();

        // Only the folder itself, never its subdirectories.
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_links);

        for entry in walker.into_iter().filter_map(Result::ok) {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if (!self.include_hidden && is_hidden(path)) || !self.is_track(path) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            tracks.push(Track::new(path, name));
        }

        tracks.sort_by_key(|t| t.name.to_lowercase());
        debug!("listed {} tracks in {folder}", tracks.len());
        tracks
    }
}
