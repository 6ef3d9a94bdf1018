use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crate::audio::Player;
use crate::audio::scripted::ScriptedPlayer;
use crate::config::{ProgressSettings, SessionSettings};
use crate::controller::ControllerClient;
use crate::library::FolderId;
use crate::library::doubles::{StaticLister, tracks};
use crate::session::{PlayerFactory, SessionHost};
use crate::store::PlaybackStore;

use super::event_loop::{Feed, Input, drive, parse_line, status_line};

fn scripted_host(store: Arc<PlaybackStore>) -> SessionHost {
    let factory: PlayerFactory =
        Arc::new(|| Ok(Box::new(ScriptedPlayer::new(Duration::ZERO).0) as Box<dyn Player>));
    let lister = Arc::new(StaticLister::default().with("/music/a", tracks("/music/a", 3)));
    let settings = SessionSettings {
        persist_interval_ms: 50,
        tick_ms: 5,
    };
    SessionHost::new(store, lister, factory, settings)
}

#[test]
fn blank_lines_are_ignored() {
    assert_eq!(parse_line("   "), Ok(None));
}

#[test]
fn play_takes_an_optional_one_based_track_number() {
    assert_eq!(parse_line("play"), Ok(Some(Input::Play(None))));
    assert_eq!(parse_line("p 3"), Ok(Some(Input::Play(Some(2)))));
    assert!(parse_line("play 0").is_err());
    assert!(parse_line("play third").is_err());
}

#[test]
fn folder_keeps_spaces_in_the_path() {
    assert_eq!(
        parse_line("folder /music/Live at Leeds "),
        Ok(Some(Input::Folder(PathBuf::from("/music/Live at Leeds"))))
    );
    assert!(parse_line("folder").is_err());
}

#[test]
fn seek_is_in_whole_seconds() {
    assert_eq!(
        parse_line("seek 95"),
        Ok(Some(Input::Seek(Duration::from_secs(95))))
    );
    assert!(parse_line("seek -1").is_err());
}

#[test]
fn unknown_words_are_reported() {
    assert_eq!(
        parse_line("shuffle"),
        Err("unknown command: shuffle".to_string())
    );
    assert_eq!(parse_line("q"), Ok(Some(Input::Quit)));
}

#[test]
fn interrupt_ends_the_loop_before_later_input() {
    let store = Arc::new(PlaybackStore::in_memory());
    let host = scripted_host(store.clone());
    let mut client = ControllerClient::new(host.clone(), &ProgressSettings::default());

    let (tx, rx) = mpsc::channel();
    tx.send(Feed::Line("status".to_string())).unwrap();
    tx.send(Feed::Interrupted).unwrap();
    tx.send(Feed::Line("folder /music/a".to_string())).unwrap();

    let mut out = Vec::new();
    drive(&rx, &mut client, &host, &mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "not connected\n");
    assert_eq!(client.folder(), None);
    assert!(!host.is_running());
    assert_eq!(store.load_folder(), None);
    drop(tx);
}

#[test]
fn end_of_input_ends_the_loop_while_senders_remain() {
    let host = scripted_host(Arc::new(PlaybackStore::in_memory()));
    let mut client = ControllerClient::new(host.clone(), &ProgressSettings::default());

    let (tx, rx) = mpsc::channel();
    let _interrupts = tx.clone();
    tx.send(Feed::EndOfInput).unwrap();

    let mut out = Vec::new();
    drive(&rx, &mut client, &host, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn idle_status_shows_connection_folder_and_queued_intents() {
    let host = scripted_host(Arc::new(PlaybackStore::in_memory()));
    let mut client = ControllerClient::new(host, &ProgressSettings::default());
    assert_eq!(status_line(&client, None), "not connected");

    client.select_folder(FolderId::new("/music/a"));
    client.play_track_at(1);
    assert_eq!(
        status_line(&client, None),
        "connecting (/music/a); queued: folder /music/a track 2"
    );

    assert!(client.pump_until_connected(Duration::from_secs(3)));
    assert!(!status_line(&client, None).contains("queued"));
}
