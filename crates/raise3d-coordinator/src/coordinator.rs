//! Update coordinators
//!
//! Each coordinator owns one poll target. A fetch failure publishes `None`
//! so bound entities become unavailable until the next success; a 404
//! shuts the coordinator down for good, since it means this printer model
//! does not implement the endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use raise3d_core::ApiData;
use raise3d_entities::PollTarget;

use crate::fetcher::DataFetcher;

/// Polls one printer endpoint and fans its payload out
pub struct UpdateCoordinator {
    target: PollTarget,
    interval: Duration,
    fetcher: Arc<dyn DataFetcher>,
    tx: watch::Sender<Option<ApiData>>,
    shut_down: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl UpdateCoordinator {
    pub fn new(target: PollTarget, interval: Duration, fetcher: Arc<dyn DataFetcher>) -> Arc<Self> {
        let (tx, _) = watch::channel(None);
        Arc::new(Self {
            target,
            interval,
            fetcher,
            tx,
            shut_down: AtomicBool::new(false),
            task: Mutex::new(None),
        })
    }

    pub fn target(&self) -> PollTarget {
        self.target
    }

    /// Subscribe to payload updates; the initial value is None
    pub fn subscribe(&self) -> watch::Receiver<Option<ApiData>> {
        self.tx.subscribe()
    }

    /// The most recent payload, if the last fetch succeeded
    pub fn data(&self) -> Option<ApiData> {
        self.tx.borrow().clone()
    }

    /// Whether polling has been shut down permanently
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Fetch once and publish the result; returns true on success
    pub async fn refresh(&self) -> bool {
        if self.is_shut_down() {
            return false;
        }

        match self.fetcher.fetch(self.target).await {
            Ok(data) => {
                debug!(target = %self.target, "Coordinator refresh succeeded");
                self.tx.send_replace(Some(data));
                true
            }
            Err(err) if err.is_not_found() => {
                warn!(
                    target = %self.target,
                    "Printer does not support this endpoint, stopping updater"
                );
                self.shut_down.store(true, Ordering::SeqCst);
                self.tx.send_replace(None);
                false
            }
            Err(err) => {
                warn!(target = %self.target, error = %err, "Coordinator refresh failed");
                self.tx.send_replace(None);
                false
            }
        }
    }

    /// Start the interval polling loop
    ///
    /// The first refresh is expected to have happened already (see
    /// [`CoordinatorSet::refresh_all`]); the loop fires after each interval.
    pub async fn spawn(self: &Arc<Self>) {
        let coordinator = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(coordinator.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // consume the immediate first tick
            interval.tick().await;
            loop {
                interval.tick().await;
                if coordinator.is_shut_down() {
                    break;
                }
                coordinator.refresh().await;
            }
        });

        if let Some(old) = self.task.lock().await.replace(handle) {
            old.abort();
        }
    }

    /// Stop the polling loop
    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
    }
}

/// Lazily-created coordinators shared across platforms
pub struct CoordinatorSet {
    fetcher: Arc<dyn DataFetcher>,
    interval: Duration,
    coordinators: DashMap<PollTarget, Arc<UpdateCoordinator>>,
}

impl CoordinatorSet {
    pub fn new(fetcher: Arc<dyn DataFetcher>, interval: Duration) -> Self {
        Self {
            fetcher,
            interval,
            coordinators: DashMap::new(),
        }
    }

    /// Get the coordinator for a target, creating it on first use
    pub fn get_or_create(&self, target: PollTarget) -> Arc<UpdateCoordinator> {
        self.coordinators
            .entry(target)
            .or_insert_with(|| {
                UpdateCoordinator::new(target, self.interval, Arc::clone(&self.fetcher))
            })
            .clone()
    }

    /// Get an existing coordinator
    pub fn get(&self, target: PollTarget) -> Option<Arc<UpdateCoordinator>> {
        self.coordinators.get(&target).map(|c| c.clone())
    }

    /// Refresh every created coordinator concurrently
    pub async fn refresh_all(&self) {
        let coordinators: Vec<_> = self.coordinators.iter().map(|c| c.clone()).collect();
        join_all(coordinators.iter().map(|c| c.refresh())).await;
    }

    /// Start the polling loop of every created coordinator
    pub async fn start_all(&self) {
        let coordinators: Vec<_> = self.coordinators.iter().map(|c| c.clone()).collect();
        for coordinator in coordinators {
            coordinator.spawn().await;
        }
    }

    /// Stop all polling loops
    pub async fn stop_all(&self) {
        let coordinators: Vec<_> = self.coordinators.iter().map(|c| c.clone()).collect();
        for coordinator in coordinators {
            coordinator.stop().await;
        }
    }

    /// Number of coordinators created so far
    pub fn len(&self) -> usize {
        self.coordinators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinators.is_empty()
    }
}
