use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::ProgressSettings;
use crate::library::{FolderId, Track};
use crate::session::{
    PendingConnect, PlayerSnapshot, SessionCommand, SessionConnection, SessionError, SessionEvent,
    SessionHost, SetFolderRequest,
};
use crate::store::PlaybackStore;

use super::progress::{Progress, ProgressSampler};

/// Intents raised while no connection exists. Each kind holds at most one
/// value; a newer intent replaces the older one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingIntents {
    pub folder: Option<FolderId>,
    pub play_index: Option<usize>,
}

impl PendingIntents {
    pub fn is_empty(&self) -> bool {
        self.folder.is_none() && self.play_index.is_none()
    }
}

enum Link {
    Disconnected,
    Connecting(PendingConnect),
    Connected(SessionConnection),
}

/// The UI's single handle on the playback session.
///
/// Drive it with `pump` from the UI loop: that is where a finished connect is
/// picked up and where session events update the views.
pub struct ControllerClient {
    host: SessionHost,
    store: Arc<PlaybackStore>,
    link: Link,
    pending: PendingIntents,
    folder: Option<FolderId>,
    catalog: Vec<Track>,
    now_playing: PlayerSnapshot,
    sampler: ProgressSampler,
}

impl ControllerClient {
    pub fn new(host: SessionHost, progress: &ProgressSettings) -> Self {
        let store = Arc::clone(host.store());
        let folder = store.load_folder();
        // Shown until the session reports what it actually loaded.
        let catalog = folder
            .as_ref()
            .map(|f| store.load_tracks(f))
            .unwrap_or_default();
        Self {
            host,
            store,
            link: Link::Disconnected,
            pending: PendingIntents::default(),
            folder,
            catalog,
            now_playing: PlayerSnapshot::default(),
            sampler: ProgressSampler::new(progress),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.link, Link::Connected(_))
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self.link, Link::Connecting(_))
    }

    pub fn pending(&self) -> &PendingIntents {
        &self.pending
    }

    pub fn folder(&self) -> Option<&FolderId> {
        self.folder.as_ref()
    }

    pub fn catalog(&self) -> &[Track] {
        &self.catalog
    }

    pub fn now_playing(&self) -> &PlayerSnapshot {
        &self.now_playing
    }

    pub fn on_visible(&mut self) {
        self.connect();
    }

    /// Detach and drop the connection. A connect still in flight is abandoned.
    pub fn on_hidden(&mut self) {
        match std::mem::replace(&mut self.link, Link::Disconnected) {
            Link::Connected(conn) => {
                debug!("controller detached");
                conn.release();
            }
            Link::Connecting(_) => debug!("abandoning connect attempt"),
            Link::Disconnected => {}
        }
        self.sampler.reset();
    }

    /// Pick up a finished connect, then fold in session events.
    /// Returns the events seen on this call.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        if let Link::Connecting(pending) = &self.link {
            match pending.try_complete() {
                None => {}
                Some(Ok(conn)) => self.attach(conn),
                Some(Err(e)) => {
                    warn!("could not reach the playback session: {e}");
                    self.link = Link::Disconnected;
                }
            }
        }

        let Link::Connected(conn) = &self.link else {
            return Vec::new();
        };
        let events = conn.poll_events();
        self.now_playing = conn.snapshot();
        for event in &events {
            self.observe(event);
        }
        events
    }

    /// Block up to `timeout` for a connect in flight, then pump.
    pub fn pump_until_connected(&mut self, timeout: Duration) -> bool {
        let finished = match &self.link {
            Link::Connecting(pending) => pending.wait_timeout(timeout),
            _ => None,
        };
        if let Some(result) = finished {
            match result {
                Ok(conn) => self.attach(conn),
                Err(e) => {
                    warn!("could not reach the playback session: {e}");
                    self.link = Link::Disconnected;
                }
            }
        }
        self.pump();
        self.is_connected()
    }

    /// Position for the progress line, when a refresh is due.
    pub fn sample_progress(&mut self, now: Instant) -> Option<Progress> {
        let Link::Connected(conn) = &self.link else {
            return None;
        };
        let snapshot = conn.snapshot();
        self.sampler
            .due(now, snapshot.is_playing)
            .then(|| Progress::from(&snapshot))
    }

    pub fn select_folder(&mut self, folder: FolderId) {
        info!("selected folder {folder}");
        if self.folder.as_ref() != Some(&folder) {
            self.catalog.clear();
        }
        self.folder = Some(folder.clone());
        self.request_folder(folder);
    }

    /// Re-list the current folder.
    pub fn refresh(&mut self) {
        match self.folder.clone() {
            Some(folder) => self.request_folder(folder),
            None => debug!("refresh ignored: no folder selected"),
        }
    }

    pub fn play_track_at(&mut self, index: usize) {
        if !self.is_connected() {
            self.pending.play_index = Some(index);
            self.connect();
            return;
        }
        self.play_index_now(index);
    }

    pub fn play(&mut self) {
        let Link::Connected(conn) = &self.link else {
            self.pending.play_index = None;
            self.connect();
            return;
        };
        let delivered = if conn.item_count() > 0 {
            let result = conn.play();
            self.check(result)
        } else {
            let Some(folder) = self.folder.clone() else {
                debug!("play ignored: no folder selected");
                return;
            };
            let resume = self.store.load_state();
            let req = SetFolderRequest {
                start_index: resume.index,
                start_position_ms: resume.position_ms,
                ..SetFolderRequest::new(folder)
            };
            self.send(req.to_command())
        };
        if !delivered {
            self.connect();
        }
    }

    pub fn pause(&mut self) {
        self.transport("pause", SessionConnection::pause);
    }

    pub fn stop(&mut self) {
        self.transport("stop", SessionConnection::stop);
    }

    pub fn next(&mut self) {
        self.transport("next", SessionConnection::next);
    }

    pub fn seek_to(&mut self, position: Duration) {
        self.transport("seek", |conn| conn.seek_to(position));
    }

    fn connect(&mut self) {
        if matches!(self.link, Link::Disconnected) {
            debug!("connecting to playback session");
            self.link = Link::Connecting(self.host.connect());
        }
    }

    fn attach(&mut self, mut conn: SessionConnection) {
        info!("controller attached");
        conn.subscribe();
        self.now_playing = conn.snapshot();
        self.sampler.reset();
        self.link = Link::Connected(conn);

        if let Some(folder) = self.pending.folder.take() {
            // A new folder starts from its top; a queued track index meant the old one.
            self.pending.play_index = None;
            self.request_folder(folder);
        } else if let Some(index) = self.pending.play_index.take() {
            self.play_index_now(index);
        } else {
            self.send(SessionCommand::restore_if_empty());
        }
    }

    /// Send a fresh listing of `folder`, or queue it and reconnect when the
    /// session is unreachable.
    fn request_folder(&mut self, folder: FolderId) {
        if !self.send(Self::fresh_listing(folder.clone())) {
            self.pending.folder = Some(folder);
            self.connect();
        }
    }

    fn play_index_now(&mut self, index: usize) {
        let Link::Connected(conn) = &self.link else {
            return;
        };
        let delivered = if conn.item_count() > 0 {
            let result = conn
                .seek_to_index(index, Duration::ZERO)
                .and_then(|()| conn.play());
            self.check(result)
        } else {
            let Some(folder) = self.folder.clone() else {
                debug!("play of track {index} ignored: no folder selected");
                return;
            };
            let req = SetFolderRequest {
                start_index: i64::try_from(index).unwrap_or(i64::MAX),
                ..SetFolderRequest::new(folder)
            };
            self.send(req.to_command())
        };
        if !delivered {
            self.pending.play_index = Some(index);
            self.connect();
        }
    }

    fn fresh_listing(folder: FolderId) -> SessionCommand {
        SetFolderRequest {
            force_refresh: true,
            ..SetFolderRequest::new(folder)
        }
        .to_command()
    }

    fn transport(
        &mut self,
        what: &str,
        op: impl FnOnce(&SessionConnection) -> Result<(), SessionError>,
    ) {
        let Link::Connected(conn) = &self.link else {
            debug!("{what} dropped: not connected");
            return;
        };
        let result = op(conn);
        self.check(result);
    }

    /// `false` when the command did not reach a session.
    fn send(&mut self, command: SessionCommand) -> bool {
        let result = match &self.link {
            Link::Connected(conn) => conn.send_command(command),
            _ => return false,
        };
        self.check(result)
    }

    fn check(&mut self, result: Result<(), SessionError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("lost the playback session: {e}");
                self.link = Link::Disconnected;
                false
            }
        }
    }

    fn observe(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::CatalogLoaded(catalog) => {
                self.folder = Some(catalog.folder.clone());
                self.catalog = catalog.tracks.clone();
            }
            SessionEvent::CatalogEmpty(folder) => {
                self.folder = Some(folder.clone());
                self.catalog.clear();
            }
            SessionEvent::Player(_) => {}
        }
    }
}
