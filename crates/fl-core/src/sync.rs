//! Polling synchronization of the remote request set into observer-local state.
//!
//! Every observer owns one task that runs fetch cycles strictly one after another: a
//! cycle starts on the interval tick (or an explicit refresh) and the next tick is not
//! considered until the fetch has completed. A successful fetch replaces the observer's
//! snapshot in one swap; a failed fetch leaves it alone and posts one error
//! notification. Stopping the observer drops any in-flight fetch, so a late response can
//! never be applied.

use crate::badge::BadgeAggregator;
use crate::lifecycle::validate_snapshot;
use crate::list_view::{FilterMode, filtered_sorted};
use crate::notifications::NotificationCenter;
use crate::remote::RequestStore;
use crate::types::{HelpRequest, HelpRequestId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The full request set as of one successful poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub requests: Vec<HelpRequest>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Number of successful cycles applied so far; 0 before the first.
    pub cycle: u64,
}

impl Snapshot {
    pub fn pending_count(&self) -> usize {
        crate::badge::pending_count(&self.requests)
    }

    pub fn view(&self, mode: FilterMode) -> Vec<HelpRequest> {
        filtered_sorted(&self.requests, mode)
    }

    pub fn get(&self, id: &HelpRequestId) -> Option<&HelpRequest> {
        self.requests.iter().find(|request| &request.id == id)
    }
}

/// Asks an observer for an immediate extra cycle, queued behind any cycle in flight.
#[derive(Clone, Default)]
pub struct RefreshTrigger(Arc<Notify>);

impl RefreshTrigger {
    pub fn request(&self) {
        self.0.notify_one();
    }
}

pub struct PollingSynchronizer<S> {
    name: String,
    store: Arc<S>,
    notifications: NotificationCenter,
    interval: Duration,
}

impl<S: RequestStore> PollingSynchronizer<S> {
    pub fn new(name: impl Into<String>, store: Arc<S>, notifications: NotificationCenter) -> Self {
        Self {
            name: name.into(),
            store,
            notifications,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Intervals below one millisecond are raised to one millisecond.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Activate the observer. The first cycle runs immediately.
    pub fn start(self) -> Observer {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::default()));
        let badge = BadgeAggregator::new();
        let badge_rx = badge.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let refresh = RefreshTrigger::default();

        let worker = Worker {
            name: self.name.clone(),
            store: self.store,
            notifications: self.notifications,
            interval: self.interval,
            snapshot: snapshot_tx,
            badge,
            refresh: refresh.clone(),
        };
        tracing::debug!(observer = %self.name, interval = ?self.interval, "observer started");
        let task = tokio::spawn(worker.run(shutdown_rx));

        Observer {
            name: self.name,
            snapshot: snapshot_rx,
            badge: badge_rx,
            refresh,
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }
}

struct Worker<S> {
    name: String,
    store: Arc<S>,
    notifications: NotificationCenter,
    interval: Duration,
    snapshot: watch::Sender<Arc<Snapshot>>,
    badge: BadgeAggregator,
    refresh: RefreshTrigger,
}

impl<S: RequestStore> Worker<S> {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = stopped(&mut shutdown) => break,
                () = self.refresh.0.notified() => ticker.reset(),
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                biased;
                () = stopped(&mut shutdown) => break,
                outcome = self.store.list_requests() => outcome,
            };
            if *shutdown.borrow() {
                break;
            }
            self.apply(outcome);
        }
        tracing::debug!(observer = %self.name, "observer stopped");
    }

    fn apply(&self, outcome: Result<Vec<HelpRequest>, crate::error::ClientError>) {
        let checked = outcome.and_then(|requests| {
            validate_snapshot(&requests)?;
            Ok(requests)
        });
        match checked {
            Ok(requests) => {
                let cycle = self.snapshot.borrow().cycle + 1;
                let snapshot = Arc::new(Snapshot {
                    requests,
                    fetched_at: Some(Utc::now()),
                    cycle,
                });
                self.snapshot.send_replace(snapshot.clone());
                // Derived views follow the list, never lead it.
                self.badge.update(&snapshot.requests);
                let pending = self.badge.current();
                tracing::debug!(observer = %self.name, cycle, pending, "snapshot synchronized");
            }
            Err(error) => {
                tracing::warn!(observer = %self.name, %error, "synchronization cycle failed");
                if error.is_reportable() {
                    self.notifications.error(format!("Error: {error}"));
                }
            }
        }
    }
}

async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender counts as a stop.
    let _ = shutdown.wait_for(|stopped| *stopped).await;
}

/// Handle to a running observer. Its state stays readable after [`Observer::stop`].
pub struct Observer {
    name: String,
    snapshot: watch::Receiver<Arc<Snapshot>>,
    badge: watch::Receiver<usize>,
    refresh: RefreshTrigger,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Observer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn pending_count(&self) -> usize {
        *self.badge.borrow()
    }

    pub fn list(&self, mode: FilterMode) -> Vec<HelpRequest> {
        self.snapshot.borrow().view(mode)
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.clone()
    }

    pub fn subscribe_badge(&self) -> watch::Receiver<usize> {
        self.badge.clone()
    }

    pub fn refresh_trigger(&self) -> RefreshTrigger {
        self.refresh.clone()
    }

    pub fn refresh(&self) {
        self.refresh.request();
    }

    /// False once stopped, or if the worker task has ended on its own.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Wait until at least `cycle` successful cycles have been applied. Returns `None`
    /// if the observer stops first.
    pub async fn wait_for_cycle(&self, cycle: u64) -> Option<Arc<Snapshot>> {
        let mut rx = self.snapshot.clone();
        let result = rx.wait_for(|snapshot| snapshot.cycle >= cycle).await;
        result.ok().map(|snapshot| snapshot.clone())
    }

    /// Deactivate. Once this returns no cycle runs and no state is written.
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
