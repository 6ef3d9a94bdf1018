use std::fs;
use std::path::Path;

use tempfile::tempdir;

use super::*;
use crate::config::LibrarySettings;

fn names(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.name.as_str()).collect()
}

#[test]
fn list_sorts_case_insensitively_and_keeps_original_names() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("c.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("B.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("a.mp3"), b"not real").unwrap();

    let lister = FsLister::new(&LibrarySettings::default());
    let tracks = lister.list(&FolderId::from(dir.path()));

    assert_eq!(names(&tracks), vec!["a.mp3", "B.mp3", "c.mp3"]);
    assert_eq!(tracks[1].locator, dir.path().join("B.mp3"));
}

#[test]
fn list_filters_to_the_configured_extension_case_insensitive() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.MP3"), b"not real").unwrap();
    fs::write(dir.path().join("two.flac"), b"not real").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();
    fs::write(dir.path().join("mp3"), b"no extension").unwrap();

    let lister = FsLister::new(&LibrarySettings::default());
    assert_eq!(names(&lister.list(&FolderId::from(dir.path()))), vec!["one.MP3"]);

    let flac = FsLister::new(&LibrarySettings {
        extension: ".FLAC".to_string(),
        ..LibrarySettings::default()
    });
    assert_eq!(names(&flac.list(&FolderId::from(dir.path()))), vec!["two.flac"]);
}

#[test]
fn list_does_not_descend_into_subfolders() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
    let sub = dir.path().join("sub.mp3");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("child.mp3"), b"not real").unwrap();

    let lister = FsLister::new(&LibrarySettings::default());
    assert_eq!(names(&lister.list(&FolderId::from(dir.path()))), vec!["root.mp3"]);
}

#[test]
fn list_skips_hidden_files_unless_asked() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

    let lister = FsLister::new(&LibrarySettings::default());
    assert_eq!(names(&lister.list(&FolderId::from(dir.path()))), vec!["visible.mp3"]);

    let all = FsLister::new(&LibrarySettings {
        include_hidden: true,
        ..LibrarySettings::default()
    });
    assert_eq!(all.list(&FolderId::from(dir.path())).len(), 2);
}

#[test]
fn missing_folder_lists_as_empty() {
    let lister = FsLister::new(&LibrarySettings::default());
    let tracks = lister.list(&FolderId::from(Path::new("/definitely/not/here")));
    assert!(tracks.is_empty());
}

#[test]
fn folder_id_round_trips_through_paths_and_json() {
    let id = FolderId::from(Path::new("/music/jazz"));
    assert_eq!(id.as_str(), "/music/jazz");
    assert_eq!(id.as_path(), Path::new("/music/jazz"));
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"/music/jazz\"");
}
