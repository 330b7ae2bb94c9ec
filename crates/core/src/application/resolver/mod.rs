//! Maintenance Status Resolver
//!
//! Keeps "is this page under maintenance, and with what message?" fresh for
//! one mounted page:
//! - resolves on mount, on path change, on a fixed poll, on change events,
//!   and on manual refresh
//! - holds exactly one change-feed subscription and one poll timer, scoped
//!   to the current page key
//! - fails open: every fetch failure resolves to "not in maintenance"
//!
//! Each resolution carries a generation token and late results from
//! superseded requests are dropped. Path change and unmount abort the
//! in-flight request. Same-key triggers that land while a fetch is in flight
//! coalesce into a single follow-up fetch. The poll timer restarts whenever a
//! fetch starts, so it only fires after a full quiet period.

mod config;
mod resolve;
mod snapshot;

pub use config::{ResolverConfig, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
pub use resolve::{resolve, resolve_key, Resolution};
pub use snapshot::{gate, PageView, ResolverSnapshot};

use crate::domain::{ChangeEvent, PageKey};
use crate::port::{ChangeFeed, ChangeSubscription, MaintenanceStatusSource};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

enum Command {
    Refresh,
    Navigate(PageKey),
    Unmount,
}

/// Handle to a mounted resolver.
///
/// Dropping the handle stops the driver task; `unmount` does the same and
/// waits for teardown to finish.
pub struct MaintenanceResolver {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<ResolverSnapshot>,
    driver: Option<JoinHandle<()>>,
}

impl MaintenanceResolver {
    /// Mount a resolver for `path` and start resolving immediately
    pub fn mount(
        path: &str,
        source: Arc<dyn MaintenanceStatusSource>,
        feed: Arc<dyn ChangeFeed>,
        config: ResolverConfig,
    ) -> Self {
        let key = PageKey::from_path(path);
        let (snapshot_tx, snapshot_rx) = watch::channel(ResolverSnapshot::loading(key.clone()));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            source,
            feed,
            config,
            snapshot: snapshot_tx,
            commands: commands_rx,
            results_tx,
            results_rx,
            generation: 0,
            inflight: None,
            dirty: false,
        };

        Self {
            commands: commands_tx,
            snapshot: snapshot_rx,
            driver: Some(tokio::spawn(driver.run(key))),
        }
    }

    /// Current read surface
    pub fn snapshot(&self) -> ResolverSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified whenever the snapshot changes
    pub fn watch(&self) -> watch::Receiver<ResolverSnapshot> {
        self.snapshot.clone()
    }

    /// Gate decision for the current snapshot
    pub fn page_view(&self) -> PageView {
        gate(&self.snapshot.borrow())
    }

    /// Re-resolve now, outside the normal triggers
    pub fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    /// Follow router navigation to `path`
    pub fn navigate(&self, path: &str) {
        let _ = self
            .commands
            .send(Command::Navigate(PageKey::from_path(path)));
    }

    /// Tear down subscription, poll timer and in-flight request
    pub async fn unmount(mut self) {
        let _ = self.commands.send(Command::Unmount);
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for MaintenanceResolver {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

struct Completed {
    generation: u64,
    resolution: Resolution,
}

struct Driver {
    source: Arc<dyn MaintenanceStatusSource>,
    feed: Arc<dyn ChangeFeed>,
    config: ResolverConfig,
    snapshot: watch::Sender<ResolverSnapshot>,
    commands: mpsc::UnboundedReceiver<Command>,
    results_tx: mpsc::UnboundedSender<Completed>,
    results_rx: mpsc::UnboundedReceiver<Completed>,
    generation: u64,
    inflight: Option<JoinHandle<()>>,
    /// A same-key trigger arrived while a fetch was in flight
    dirty: bool,
}

impl Driver {
    async fn run(mut self, mut key: PageKey) {
        'scope: loop {
            info!(page_key = %key, "Maintenance resolver scope started");
            self.publish(ResolverSnapshot::loading(key.clone()));

            let mut subscription = match self.feed.subscribe(&key).await {
                Ok(subscription) => Some(subscription),
                Err(e) => {
                    warn!(
                        page_key = %key,
                        error = %e,
                        "Change feed unavailable, relying on polling"
                    );
                    None
                }
            };

            let period = self.config.poll_interval;
            let mut poll = interval_at(Instant::now() + period, period);
            poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

            self.dirty = false;
            self.start_resolution(&key);

            loop {
                tokio::select! {
                    command = self.commands.recv() => match command {
                        Some(Command::Refresh) => {
                            debug!(page_key = %key, "Manual refresh requested");
                            self.trigger(&key, &mut poll);
                        }
                        Some(Command::Navigate(next)) => {
                            if next == key {
                                continue;
                            }
                            debug!(from = %key, to = %next, "Page changed, rescoping resolver");
                            self.cancel_inflight();
                            key = next;
                            // subscription and poll timer drop here
                            continue 'scope;
                        }
                        Some(Command::Unmount) | None => break 'scope,
                    },
                    Some(completed) = self.results_rx.recv() => {
                        if self.apply(&key, completed) && std::mem::take(&mut self.dirty) {
                            debug!(page_key = %key, "Re-fetching for triggers received in flight");
                            self.trigger(&key, &mut poll);
                        }
                    }
                    _ = poll.tick() => {
                        debug!(page_key = %key, "Poll interval elapsed");
                        self.trigger(&key, &mut poll);
                    }
                    event = next_event(&mut subscription) => match event {
                        Some(event) => {
                            debug!(
                                page_key = %key,
                                kind = %event.kind,
                                "Change event received, re-fetching"
                            );
                            self.trigger(&key, &mut poll);
                        }
                        None => {
                            warn!(page_key = %key, "Change feed closed, relying on polling");
                            subscription = None;
                        }
                    },
                }
            }
        }

        self.cancel_inflight();
        info!("Maintenance resolver unmounted");
    }

    /// Same-key trigger: start a fetch, or coalesce into the one in flight
    fn trigger(&mut self, key: &PageKey, poll: &mut Interval) {
        if self.inflight.is_some() {
            self.dirty = true;
            return;
        }
        self.start_resolution(key);
        poll.reset();
    }

    fn start_resolution(&mut self, key: &PageKey) {
        self.cancel_inflight();
        self.generation += 1;

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let results = self.results_tx.clone();
        let key = key.clone();
        let timeout = self.config.request_timeout;

        self.inflight = Some(tokio::spawn(async move {
            let resolution = resolve_key(source.as_ref(), &key, timeout).await;
            let _ = results.send(Completed {
                generation,
                resolution,
            });
        }));
    }

    fn cancel_inflight(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
    }

    /// Publish a completed resolution. Returns false if it was superseded.
    fn apply(&mut self, key: &PageKey, completed: Completed) -> bool {
        if completed.generation != self.generation || &completed.resolution.key != key {
            debug!(
                page_key = %completed.resolution.key,
                generation = completed.generation,
                current = self.generation,
                "Discarding superseded resolution"
            );
            return false;
        }
        self.inflight = None;

        self.publish(ResolverSnapshot::from(completed.resolution));
        true
    }

    fn publish(&self, next: ResolverSnapshot) {
        self.snapshot.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.cancel_inflight();
    }
}

async fn next_event(subscription: &mut Option<ChangeSubscription>) -> Option<ChangeEvent> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests;
