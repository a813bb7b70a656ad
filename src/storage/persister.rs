//! Background persistence worker
//!
//! The store hands serialized snapshots to a dedicated thread over a channel
//! and never waits for the write. Bursts of saves are coalesced so only the
//! newest payload is written, and failed writes are retried with doubling
//! backoff before being logged and dropped. The next successful save heals
//! durability.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::PersistenceGateway;

/// How hard the worker tries before giving up on a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per payload, including the first
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay after the given failed attempt (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1 << shift)
            .min(self.max_backoff)
    }
}

enum Message {
    Save(String),
    Flush(Sender<()>),
    Shutdown,
}

/// Handle to the persistence worker thread
///
/// Dropping the handle lets queued saves finish, then joins the thread.
pub struct Persister {
    tx: Sender<Message>,
    worker: Option<JoinHandle<()>>,
}

impl Persister {
    /// Move `gateway` onto a new worker thread
    pub fn spawn<G: PersistenceGateway>(gateway: G, policy: RetryPolicy) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || run(gateway, policy, rx));
        Self {
            tx,
            worker: Some(worker),
        }
    }

    /// Queue a payload for writing; returns immediately
    pub fn save(&self, data: String) {
        if self.tx.send(Message::Save(data)).is_err() {
            tracing::error!("Persistence worker has stopped; dropping save");
        }
    }

    /// Block until every save queued before this call has been attempted
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(Message::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl std::fmt::Debug for Persister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("running", &self.worker.is_some())
            .finish()
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        let _ = self.tx.send(Message::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Persistence worker panicked");
            }
        }
    }
}

fn run<G: PersistenceGateway>(mut gateway: G, policy: RetryPolicy, rx: Receiver<Message>) {
    let mut deferred: Option<Message> = None;

    loop {
        let message = match deferred.take() {
            Some(message) => message,
            None => match rx.recv() {
                Ok(message) => message,
                Err(_) => break,
            },
        };

        match message {
            Message::Save(mut data) => {
                // Only the newest of a burst of saves matters
                while let Ok(next) = rx.try_recv() {
                    match next {
                        Message::Save(newer) => data = newer,
                        other => {
                            deferred = Some(other);
                            break;
                        }
                    }
                }
                write_with_retry(&mut gateway, &policy, &data);
            }
            Message::Flush(ack) => {
                let _ = ack.send(());
            }
            Message::Shutdown => break,
        }
    }

    tracing::debug!("Persistence worker stopped");
}

fn write_with_retry<G: PersistenceGateway>(
    gateway: &mut G,
    policy: &RetryPolicy,
    data: &str,
) -> bool {
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        match gateway.save(data) {
            Ok(()) => {
                if attempt > 1 {
                    tracing::info!("Saved notebook after {} attempts", attempt);
                }
                return true;
            }
            Err(e) if attempt < attempts => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    "Failed to save notebook (attempt {}/{}): {}; retrying in {:?}",
                    attempt,
                    attempts,
                    e,
                    delay
                );
                thread::sleep(delay);
            }
            Err(e) => {
                tracing::error!("Giving up saving notebook after {} attempts: {}", attempts, e);
            }
        }
    }

    false
}
