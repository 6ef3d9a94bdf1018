use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use crate::audio::{Player, PlayerError};
use crate::config::SessionSettings;
use crate::library::DirectoryLister;
use crate::store::PlaybackStore;

use super::command::{SessionCommand, Transport};
use super::coordinator::{Coordinator, Inbox};
use super::hub::{EventHub, PlayerSnapshot, SessionEvent, SnapshotHandle, Subscription, read_snapshot};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("playback session unavailable: {0}")]
    Unavailable(String),
    #[error("playback session closed")]
    Closed,
}

/// Builds the player on the coordinator thread, which then owns it.
pub type PlayerFactory = Arc<dyn Fn() -> Result<Box<dyn Player>, PlayerError> + Send + Sync>;

struct RunningSession {
    tx: Sender<Inbox>,
    hub: EventHub,
    snapshot: SnapshotHandle,
    join: JoinHandle<()>,
}

enum Slot {
    Stopped,
    /// A start is in flight outside the lock.
    Starting,
    Running(RunningSession),
}

struct HostInner {
    store: Arc<PlaybackStore>,
    lister: Arc<dyn DirectoryLister>,
    factory: PlayerFactory,
    settings: SessionSettings,
    slot: Mutex<Slot>,
    /// Signalled whenever a start leaves `Slot::Starting`.
    settled: Condvar,
}

/// Starts the coordinator on first use and hands out connections to it.
///
/// Clones share one coordinator. It lives until `shutdown` or until the last
/// clone is dropped.
#[derive(Clone)]
pub struct SessionHost {
    inner: Arc<HostInner>,
}

impl SessionHost {
    pub fn new(
        store: Arc<PlaybackStore>,
        lister: Arc<dyn DirectoryLister>,
        factory: PlayerFactory,
        settings: SessionSettings,
    ) -> Self {
        Self {
            inner: Arc::new(HostInner {
                store,
                lister,
                factory,
                settings,
                slot: Mutex::new(Slot::Stopped),
                settled: Condvar::new(),
            }),
        }
    }

    pub fn store(&self) -> &Arc<PlaybackStore> {
        &self.inner.store
    }

    /// Start the coordinator if it is not running yet.
    #[cfg(test)]
    pub fn start(&self) -> Result<(), SessionError> {
        self.inner.ensure_running().map(|_| ())
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        matches!(&*self.inner.lock_slot(), Slot::Running(r) if !r.join.is_finished())
    }

    /// Connect without blocking; the result arrives on the returned handle.
    pub fn connect(&self) -> PendingConnect {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name("folio-connect".to_string())
            .spawn(move || {
                let result = inner.ensure_running().map(SessionConnection::new);
                // Nobody waiting any more: the connection is dropped unused.
                let _ = tx.send(result);
            });
        if let Err(e) = spawned {
            warn!("failed to spawn connect thread: {e}");
            let (tx, rx) = mpsc::channel();
            let _ = tx.send(Err(SessionError::Unavailable(e.to_string())));
            return PendingConnect { rx };
        }
        PendingConnect { rx }
    }

    /// The audio route is about to become loud (e.g. headphones unplugged).
    pub fn becoming_noisy(&self) {
        if let Slot::Running(running) = &*self.inner.lock_slot() {
            let _ = running.tx.send(Inbox::BecomingNoisy);
        }
    }

    /// Stop the coordinator and wait for its final flush.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl HostInner {
    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Block while another caller is starting the coordinator.
    fn settle<'a>(&self, mut slot: MutexGuard<'a, Slot>) -> MutexGuard<'a, Slot> {
        while matches!(*slot, Slot::Starting) {
            slot = self.settled.wait(slot).unwrap_or_else(|p| p.into_inner());
        }
        slot
    }

    /// Handles to a live coordinator, starting one if needed. Blocks until
    /// the player exists; the slot lock is not held meanwhile.
    fn ensure_running(&self) -> Result<Handles, SessionError> {
        let mut slot = self.settle(self.lock_slot());
        if let Slot::Running(r) = &*slot {
            if !r.join.is_finished() {
                return Ok(Handles::of(r));
            }
            warn!("playback session exited; starting a new one");
        }
        let stale = std::mem::replace(&mut *slot, Slot::Starting);
        drop(slot);

        if let Slot::Running(stale) = stale {
            let _ = stale.join.join();
        }
        let started = self.spawn();

        let mut slot = self.lock_slot();
        let result = match started {
            Ok(session) => {
                let handles = Handles::of(&session);
                *slot = Slot::Running(session);
                Ok(handles)
            }
            Err(e) => {
                *slot = Slot::Stopped;
                Err(e)
            }
        };
        self.settled.notify_all();
        result
    }

    fn spawn(&self) -> Result<RunningSession, SessionError> {
        let (tx, rx) = mpsc::channel::<Inbox>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let hub = EventHub::default();
        let snapshot = SnapshotHandle::default();

        let factory = Arc::clone(&self.factory);
        let store = Arc::clone(&self.store);
        let lister = Arc::clone(&self.lister);
        let settings = self.settings.clone();
        let coordinator_tx = tx.clone();
        let coordinator_hub = hub.clone();
        let coordinator_snapshot = Arc::clone(&snapshot);

        let join = thread::Builder::new()
            .name("folio-session".to_string())
            .spawn(move || {
                let player = match factory() {
                    Ok(p) => p,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                Coordinator::new(
                    player,
                    store,
                    lister,
                    coordinator_tx,
                    coordinator_hub,
                    coordinator_snapshot,
                )
                .run(rx, &settings);
            })
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("playback session started");
                Ok(RunningSession {
                    tx,
                    hub,
                    snapshot,
                    join,
                })
            }
            Ok(Err(reason)) => {
                let _ = join.join();
                Err(SessionError::Unavailable(reason))
            }
            Err(_) => {
                let _ = join.join();
                Err(SessionError::Unavailable(
                    "session thread exited during startup".to_string(),
                ))
            }
        }
    }

    fn shutdown(&self) {
        let mut slot = self.settle(self.lock_slot());
        let Slot::Running(running) = std::mem::replace(&mut *slot, Slot::Stopped) else {
            return;
        };
        drop(slot);
        debug!("shutting down playback session");
        let _ = running.tx.send(Inbox::Shutdown);
        let _ = running.join.join();
    }
}

impl Drop for HostInner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Handles {
    tx: Sender<Inbox>,
    hub: EventHub,
    snapshot: SnapshotHandle,
}

impl Handles {
    fn of(running: &RunningSession) -> Self {
        Self {
            tx: running.tx.clone(),
            hub: running.hub.clone(),
            snapshot: Arc::clone(&running.snapshot),
        }
    }
}

/// An in-flight `connect`. Resolves exactly once.
pub struct PendingConnect {
    rx: Receiver<Result<SessionConnection, SessionError>>,
}

impl PendingConnect {
    /// `None` while still connecting.
    pub fn try_complete(&self) -> Option<Result<SessionConnection, SessionError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SessionError::Closed)),
        }
    }

    #[cfg(test)]
    pub fn wait(self) -> Result<SessionConnection, SessionError> {
        self.rx.recv().unwrap_or(Err(SessionError::Closed))
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<SessionConnection, SessionError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(SessionError::Closed)),
        }
    }
}

/// A client's live attachment to the coordinator.
pub struct SessionConnection {
    tx: Sender<Inbox>,
    hub: EventHub,
    snapshot: SnapshotHandle,
    subscription: Option<Subscription>,
}

impl SessionConnection {
    fn new(handles: Handles) -> Self {
        Self {
            tx: handles.tx,
            hub: handles.hub,
            snapshot: handles.snapshot,
            subscription: None,
        }
    }

    pub fn subscribe(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.hub.subscribe());
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(sub) = self.subscription.take() {
            self.hub.unsubscribe(sub.id());
        }
    }

    /// Events published since the last poll. Empty when not subscribed.
    pub fn poll_events(&self) -> Vec<SessionEvent> {
        self.subscription
            .as_ref()
            .map(|s| s.try_iter().collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        read_snapshot(&self.snapshot)
    }

    pub fn item_count(&self) -> usize {
        self.snapshot().item_count
    }

    pub fn send_command(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.post(Inbox::Command(command))
    }

    pub fn transport(&self, transport: Transport) -> Result<(), SessionError> {
        self.post(Inbox::Transport(transport))
    }

    pub fn play(&self) -> Result<(), SessionError> {
        self.transport(Transport::Play)
    }

    pub fn pause(&self) -> Result<(), SessionError> {
        self.transport(Transport::Pause)
    }

    pub fn stop(&self) -> Result<(), SessionError> {
        self.transport(Transport::Stop)
    }

    pub fn seek_to(&self, position: Duration) -> Result<(), SessionError> {
        self.transport(Transport::SeekTo(position))
    }

    pub fn seek_to_index(&self, index: usize, position: Duration) -> Result<(), SessionError> {
        self.transport(Transport::SeekToIndex(index, position))
    }

    pub fn next(&self) -> Result<(), SessionError> {
        self.transport(Transport::Next)
    }

    /// Detach and drop the connection. The coordinator keeps running.
    pub fn release(mut self) {
        self.unsubscribe();
    }

    fn post(&self, msg: Inbox) -> Result<(), SessionError> {
        self.tx.send(msg).map_err(|_| SessionError::Closed)
    }
}

impl Drop for SessionConnection {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
