use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A repeating task that posts a message every `interval` until stopped.
pub(super) struct Ticker {
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

impl Ticker {
    pub fn start<T, F>(name: &str, interval: Duration, tx: Sender<T>, make: F) -> io::Result<Self>
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if tx.send(make()).is_err() {
                                break;
                            }
                        }
                        // Stop requested or the ticker handle was dropped.
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;
        Ok(Self { stop_tx, join })
    }

    /// Returns once the ticker thread has exited; no message is posted after that.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.join.join();
    }
}
