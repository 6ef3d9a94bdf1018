use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use super::clock::PlaybackClock;
use super::queue::following_index;
use super::scripted::{ScriptedPlayer, TRACK_LENGTH};
use super::*;

fn items(titles: &[&str]) -> Vec<MediaItem> {
    titles
        .iter()
        .map(|t| MediaItem {
            locator: PathBuf::from(format!("/m/{t}")),
            title: t.to_string(),
        })
        .collect()
}

#[test]
fn manual_next_wraps_only_in_loop_all() {
    assert_eq!(following_index(0, 3, LoopMode::NoLoop, false), Some(1));
    assert_eq!(following_index(2, 3, LoopMode::NoLoop, false), None);
    assert_eq!(following_index(2, 3, LoopMode::LoopAll, false), Some(0));
    assert_eq!(following_index(2, 3, LoopMode::LoopOne, false), None);
    assert_eq!(following_index(1, 3, LoopMode::LoopOne, false), Some(2));
}

#[test]
fn finished_track_repeats_under_loop_one() {
    assert_eq!(following_index(1, 3, LoopMode::LoopOne, true), Some(1));
    assert_eq!(following_index(2, 3, LoopMode::LoopAll, true), Some(0));
    assert_eq!(following_index(0, 0, LoopMode::LoopAll, true), None);
}

#[test]
fn clock_accumulates_only_while_running() {
    let mut clock = PlaybackClock::default();
    clock.reset(Duration::from_secs(10));
    assert_eq!(clock.elapsed(), Duration::from_secs(10));

    clock.resume();
    thread::sleep(Duration::from_millis(20));
    clock.pause();
    let paused_at = clock.elapsed();
    assert!(paused_at >= Duration::from_millis(10_020));

    thread::sleep(Duration::from_millis(20));
    assert_eq!(clock.elapsed(), paused_at);
}

#[test]
fn loading_reports_transition_and_playing_follows_intent() {
    let (mut player, probe) = ScriptedPlayer::new(Duration::from_secs(1));
    player.load_items(items(&["a", "b"]), 1, Duration::from_secs(5));

    assert_eq!(player.current_index(), Some(1));
    assert_eq!(player.position(), Duration::from_secs(5));
    assert!(!player.is_playing());
    assert_eq!(
        player.drain_events(),
        vec![
            PlayerEvent::ItemTransition { index: Some(1) },
            PlayerEvent::PlaybackStateChanged(PlaybackStatus::Ready),
        ]
    );

    player.set_play_intent(true);
    assert!(player.is_playing());
    assert_eq!(player.drain_events(), vec![PlayerEvent::PlayingChanged(true)]);

    player.pause();
    assert_eq!(player.drain_events(), vec![PlayerEvent::PlayingChanged(false)]);
    assert_eq!(probe.loads().len(), 1);
}

#[test]
fn clearing_reports_no_current_item() {
    let (mut player, _probe) = ScriptedPlayer::new(Duration::from_secs(1));
    player.load_items(items(&["a"]), 0, Duration::ZERO);
    player.play();
    player.drain_events();

    player.clear_items();
    assert_eq!(player.item_count(), 0);
    assert_eq!(
        player.drain_events(),
        vec![
            PlayerEvent::ItemTransition { index: None },
            PlayerEvent::PlaybackStateChanged(PlaybackStatus::Idle),
            PlayerEvent::PlayingChanged(false),
        ]
    );
}

#[test]
fn finished_track_advances_on_tick() {
    let (mut player, _probe) = ScriptedPlayer::new(TRACK_LENGTH);
    player.load_items(items(&["a", "b"]), 0, Duration::ZERO);
    player.play();
    player.drain_events();

    player.tick();
    assert_eq!(player.current_index(), Some(1));
    assert_eq!(player.position(), Duration::ZERO);
    assert!(player
        .drain_events()
        .contains(&PlayerEvent::ItemTransition { index: Some(1) }));
}

#[test]
fn seek_to_index_clamps_into_the_playlist() {
    let (mut player, _probe) = ScriptedPlayer::new(Duration::from_secs(1));
    player.load_items(items(&["a", "b", "c"]), 0, Duration::ZERO);
    player.seek_to_index(9, Duration::from_secs(2));
    assert_eq!(player.current_index(), Some(2));
    assert_eq!(player.current_item().map(|i| i.title.as_str()), Some("c"));
}

#[test]
fn media_item_takes_locator_and_name_from_track() {
    let track = crate::library::Track::new("/m/x.mp3", "x.mp3");
    let item = MediaItem::from(&track);
    assert_eq!(item.locator, PathBuf::from("/m/x.mp3"));
    assert_eq!(item.title, "x.mp3");
}

#[test]
fn loop_mode_follows_setting() {
    use crate::config::LoopModeSetting;
    assert_eq!(LoopMode::from(LoopModeSetting::NoLoop), LoopMode::NoLoop);
    assert_eq!(LoopMode::from(LoopModeSetting::LoopOne), LoopMode::LoopOne);
    assert_eq!(LoopMode::from(LoopModeSetting::default()), LoopMode::LoopAll);
}
