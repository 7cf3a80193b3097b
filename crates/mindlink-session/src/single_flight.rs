//! Coalescing of concurrent calls into one in-flight operation.
//!
//! The first caller of [`SingleFlight::run`] becomes the leader and runs the
//! operation. Callers arriving while it is in flight subscribe to its
//! outcome instead of starting their own. Once the outcome is published the
//! slot is cleared, so the next call starts a fresh operation.
//!
//! If the leader is dropped before finishing (its task was cancelled), the
//! waiters wake up, see the channel closed, and one of them takes over.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

type Slot<T> = Option<watch::Receiver<Option<T>>>;

/// At most one operation in flight; everyone else waits for its result.
#[derive(Debug)]
pub struct SingleFlight<T> {
    slot: Mutex<Slot<T>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Waiter(watch::Receiver<Option<T>>),
}

/// Clears the slot when the leader finishes or is dropped.
struct ClearOnDrop<'a, T> {
    slot: &'a Mutex<Slot<T>>,
}

impl<T> Drop for ClearOnDrop<'_, T> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Clone + Send + Sync> SingleFlight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an operation is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// Runs `op`, or joins the operation already in flight.
    ///
    /// `op` is only invoked if this caller becomes the leader.
    pub async fn run<F, Fut>(&self, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        loop {
            let role = {
                let mut slot = lock(&self.slot);
                match slot.as_ref() {
                    Some(rx) => Role::Waiter(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        *slot = Some(rx);
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Leader(tx) => {
                    let _clear = ClearOnDrop { slot: &self.slot };
                    let outcome = op().await;
                    tx.send_replace(Some(outcome.clone()));
                    return outcome;
                }
                Role::Waiter(mut rx) => {
                    let published = rx
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|value| value.clone());
                    if let Some(outcome) = published {
                        return outcome;
                    }
                    tracing::debug!("in-flight leader dropped, retrying");
                }
            }
        }
    }
}
