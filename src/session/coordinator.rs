use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::audio::{MediaItem, Player, PlayerEvent};
use crate::config::SessionSettings;
use crate::library::{Catalog, DirectoryLister, FolderId};
use crate::store::{PlaybackStore, ResumePoint};

use super::command::{SessionCommand, SessionRequest, SetFolderRequest, Transport};
use super::hub::{EventHub, PlayerSnapshot, SessionEvent, SnapshotHandle, publish_snapshot};
use super::load::{
    LoadGenerations, LoadOutcome, LoadTarget, clamp_index, clamp_position, resolve_catalog,
};
use super::ticker::Ticker;

/// Everything the coordinator thread reacts to.
#[derive(Debug)]
pub(super) enum Inbox {
    Command(SessionCommand),
    Transport(Transport),
    LoadFinished(LoadOutcome),
    PersistTick,
    BecomingNoisy,
    Shutdown,
}

/// Per-folder load progress.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading { folder: FolderId, generation: u64 },
    Loaded,
}

/// Owns the player and the resume point; every mutation happens on its thread.
pub(super) struct Coordinator {
    player: Box<dyn Player>,
    store: Arc<PlaybackStore>,
    lister: Arc<dyn DirectoryLister>,
    inbox: Sender<Inbox>,
    hub: EventHub,
    snapshot: SnapshotHandle,
    generations: LoadGenerations,
    load: LoadState,
    ticker: Option<Ticker>,
    torn_down: bool,
}

impl Coordinator {
    pub fn new(
        player: Box<dyn Player>,
        store: Arc<PlaybackStore>,
        lister: Arc<dyn DirectoryLister>,
        inbox: Sender<Inbox>,
        hub: EventHub,
        snapshot: SnapshotHandle,
    ) -> Self {
        Self {
            player,
            store,
            lister,
            inbox,
            hub,
            snapshot,
            generations: LoadGenerations::default(),
            load: LoadState::Idle,
            ticker: None,
            torn_down: false,
        }
    }

    /// Restore, then serve the inbox until shutdown. Tears down on the way out.
    pub fn run(mut self, rx: Receiver<Inbox>, settings: &SessionSettings) {
        let interval = Duration::from_millis(settings.persist_interval_ms);
        match Ticker::start("folio-persist", interval, self.inbox.clone(), || {
            Inbox::PersistTick
        }) {
            Ok(t) => self.ticker = Some(t),
            Err(e) => error!("failed to start persistence ticker: {e}"),
        }

        self.restore_from_store();
        self.after_step();

        let tick = Duration::from_millis(settings.tick_ms);
        loop {
            match rx.recv_timeout(tick) {
                Ok(Inbox::Shutdown) => break,
                Ok(msg) => self.handle(msg),
                Err(RecvTimeoutError::Timeout) => self.player.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.after_step();
        }

        self.teardown();
    }

    fn handle(&mut self, msg: Inbox) {
        match msg {
            Inbox::Command(cmd) => match SessionRequest::try_from(&cmd) {
                Ok(SessionRequest::SetFolder(req)) => self.set_folder(req),
                Ok(SessionRequest::RestoreIfEmpty) => self.restore_if_empty(),
                Err(e) => warn!("rejected command {:?}: {e}", cmd.action),
            },
            Inbox::Transport(t) => self.transport(t),
            Inbox::LoadFinished(outcome) => self.finish_load(outcome),
            Inbox::PersistTick => self.persist_now(),
            Inbox::BecomingNoisy => {
                debug!("audio output becoming noisy; pausing");
                self.player.pause();
            }
            Inbox::Shutdown => {}
        }
    }

    fn restore_from_store(&mut self) {
        let Some(folder) = self.store.load_folder() else {
            info!("no saved folder; waiting for one");
            return;
        };
        let state = self.store.load_state();
        info!(
            "resuming {folder} at track {} ({} ms)",
            state.index, state.position_ms
        );
        self.begin_load(folder, false, target_from(state, state.play_when_ready));
    }

    fn set_folder(&mut self, req: SetFolderRequest) {
        info!(
            "set folder {} (refresh: {}, start: {})",
            req.folder, req.force_refresh, req.start_index
        );
        if self.store.load_folder().as_ref() != Some(&req.folder) {
            if let Err(e) = self.store.clear_tracks() {
                warn!("failed to drop cached tracks: {e:#}");
            }
        }
        // Saved before listing so a restart mid-load comes back to this folder.
        if let Err(e) = self.store.save_folder(Some(&req.folder)) {
            warn!("failed to save folder selection: {e:#}");
        }
        self.begin_load(
            req.folder,
            req.force_refresh,
            LoadTarget {
                start_index: req.start_index,
                start_position_ms: req.start_position_ms,
                play_when_ready: req.play_when_ready,
            },
        );
    }

    fn restore_if_empty(&mut self) {
        if self.player.item_count() > 0 || matches!(self.load, LoadState::Loading { .. }) {
            return;
        }
        let Some(folder) = self.store.load_folder() else {
            return;
        };
        let state = self.store.load_state();
        debug!("player empty on attach; reloading {folder}");
        self.begin_load(folder, false, target_from(state, false));
    }

    /// Supersede any load in flight and list `folder` on a worker thread.
    fn begin_load(&mut self, folder: FolderId, force_refresh: bool, target: LoadTarget) {
        if let LoadState::Loading { folder: previous, .. } = &self.load {
            debug!("superseding load of {previous}");
        }
        let ticket = self.generations.issue();
        let generation = ticket.generation();
        self.load = LoadState::Loading {
            folder: folder.clone(),
            generation,
        };

        let store = Arc::clone(&self.store);
        let lister = Arc::clone(&self.lister);
        let inbox = self.inbox.clone();
        let worker_folder = folder.clone();
        let spawned = thread::Builder::new()
            .name("folio-load".to_string())
            .spawn(move || {
                let Some(catalog) =
                    resolve_catalog(&store, lister.as_ref(), &ticket, &worker_folder, force_refresh)
                else {
                    return;
                };
                let _ = inbox.send(Inbox::LoadFinished(LoadOutcome {
                    generation,
                    catalog,
                    target,
                }));
            });

        if let Err(e) = spawned {
            warn!("failed to spawn loader ({e}); listing {folder} inline");
            let ticket = self.generations.issue();
            if let Some(catalog) =
                resolve_catalog(&self.store, self.lister.as_ref(), &ticket, &folder, force_refresh)
            {
                self.load = LoadState::Loading {
                    folder,
                    generation: ticket.generation(),
                };
                self.finish_load(LoadOutcome {
                    generation: ticket.generation(),
                    catalog,
                    target,
                });
            }
        }
    }

    fn finish_load(&mut self, outcome: LoadOutcome) {
        let current = matches!(
            &self.load,
            LoadState::Loading { generation, .. } if *generation == outcome.generation
        );
        if !current || !self.generations.is_current(outcome.generation) {
            debug!(
                "discarding superseded load of {}",
                outcome.catalog.folder
            );
            return;
        }

        if outcome.catalog.is_empty() {
            let folder = outcome.catalog.folder;
            info!("{folder} has no tracks");
            self.player.clear_items();
            self.load = LoadState::Idle;
            self.hub.publish(&SessionEvent::CatalogEmpty(folder));
            return;
        }

        let Catalog { folder, tracks } = outcome.catalog;

        let LoadTarget {
            start_index,
            start_position_ms,
            play_when_ready,
        } = outcome.target;
        let index = clamp_index(start_index, tracks.len());
        let position = clamp_position(start_position_ms);
        info!(
            "loaded {} tracks from {folder}; starting at {index}",
            tracks.len()
        );

        let items: Vec<MediaItem> = tracks.iter().map(MediaItem::from).collect();
        self.player.load_items(items, index, position);
        self.player.set_play_intent(play_when_ready);
        self.load = LoadState::Loaded;
        self.hub
            .publish(&SessionEvent::CatalogLoaded(Catalog::new(folder, tracks)));
    }

    fn transport(&mut self, t: Transport) {
        if self.player.item_count() == 0 {
            debug!("ignoring {t:?}: nothing loaded");
            return;
        }
        match t {
            Transport::Play => self.player.play(),
            Transport::Pause => self.player.pause(),
            Transport::Stop => self.player.stop(),
            Transport::SeekTo(position) => self.player.seek_to(position),
            Transport::SeekToIndex(index, position) => self.player.seek_to_index(index, position),
            Transport::Next => self.player.next_item(),
        }
    }

    /// Collect engine events, persist on the ones that matter, then publish.
    fn after_step(&mut self) {
        let events = self.player.drain_events();
        let persist = events.iter().any(|e| {
            matches!(
                e,
                PlayerEvent::ItemTransition { .. } | PlayerEvent::PlayingChanged(_)
            )
        });
        if persist {
            self.persist_now();
        }
        publish_snapshot(&self.snapshot, PlayerSnapshot::of(self.player.as_ref()));
        for event in events {
            self.hub.publish(&SessionEvent::Player(event));
        }
    }

    /// Write the resume point, unless there is nothing to resume.
    fn persist_now(&self) {
        if self.player.item_count() == 0 {
            return;
        }
        let index = self.player.current_index().unwrap_or(0);
        let state = ResumePoint {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            position_ms: i64::try_from(self.player.position().as_millis()).unwrap_or(i64::MAX),
            play_when_ready: self.player.play_intent(),
        };
        if let Err(e) = self.store.save_state(state) {
            warn!("failed to persist resume point: {e:#}");
        }
    }

    /// Stop the ticker, flush once, release the player. Safe to call twice.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(t) = self.ticker.take() {
            t.stop();
        }
        self.generations.cancel_all();
        self.persist_now();
        self.player.release();
        publish_snapshot(&self.snapshot, PlayerSnapshot::default());
        self.hub.close();
        info!("playback session closed");
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn target_from(state: ResumePoint, play_when_ready: bool) -> LoadTarget {
    LoadTarget {
        start_index: state.index,
        start_position_ms: state.position_ms,
        play_when_ready,
    }
}
