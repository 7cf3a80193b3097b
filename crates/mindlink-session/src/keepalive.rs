//! Background keep-alive: refresh the access token on a fixed cadence
//! while a session is held.
//!
//! The timer is paused whenever the session becomes unauthenticated and
//! resumed (a full period away) when it becomes active again, so a
//! signed-out client never hits the refresh endpoint.

use std::sync::Arc;

use mindlink_tick::{TickConfig, TickScheduler};
use mindlink_transport::HttpTransport;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{KeyValueStore, SessionManager};

/// Handle to a running keep-alive task. Dropping it stops the task.
#[derive(Debug)]
pub struct KeepAlive {
    task: JoinHandle<()>,
}

impl KeepAlive {
    /// Stops the task.
    pub fn stop(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<T: HttpTransport, S: KeyValueStore> SessionManager<T, S> {
    /// Starts the keep-alive task with the configured cadence.
    pub fn spawn_keepalive(self: &Arc<Self>) -> KeepAlive {
        let config = self.config().keepalive.clone();
        self.spawn_keepalive_with(config)
    }

    /// Starts the keep-alive task with an explicit cadence.
    ///
    /// On each tick, if a still-valid access token is held, a refresh is attempted
    /// (sharing any refresh already in flight). Must be called from within
    /// a Tokio runtime.
    pub fn spawn_keepalive_with(self: &Arc<Self>, config: TickConfig) -> KeepAlive {
        let session = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticks = TickScheduler::new(config);
            let mut context = session.context();
            info!(period = ?ticks.period(), "session keep-alive started");

            loop {
                if context.state().is_active() {
                    ticks.resume();
                } else {
                    ticks.pause();
                }

                tokio::select! {
                    changed = context.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    tick = ticks.wait_for_tick() => {
                        // An expired token is left to the pipeline and guards,
                        // which refresh on demand.
                        if session.is_token_expired() {
                            debug!(tick = tick.tick, "keep-alive skipped, no live token");
                            continue;
                        }
                        let refreshed = session.refresh_token().await;
                        debug!(tick = tick.tick, refreshed, "keep-alive refresh");
                    }
                }
            }
        });
        KeepAlive { task }
    }
}
