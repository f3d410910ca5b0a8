//! Replica Sync Agent
//!
//! A single background loop that keeps the mirror converged with the primary.
//!
//! ## Lifecycle
//! `Idle -> Fetching -> (Applying | Backoff) -> Idle`, until shutdown.
//! - **Fetching**: pull a snapshot through the `SnapshotSource`. The mirror lock is not held.
//! - **Applying**: reconcile the mirror with the snapshot, then wait `sync_interval`.
//! - **Backoff**: the fetch failed; the mirror is left as it was, wait `retry_delay` and retry.
//!
//! Failures are transient by policy: they are logged and counted, never fatal.
//! Passes never overlap; a slow pass simply delays the next one.

use super::store::{MirrorStore, ReconcileReport};
use super::transport::SnapshotSource;

use anyhow::Result;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

/// Default pause between successful passes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);
/// Default pause after a failed fetch.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
    Applying,
    Backoff,
}

/// Observable progress of the agent, served on the replica's status endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    pub passes: u64,
    pub failures: u64,
    pub consecutive_failures: u64,
    /// Timestamp (ms) of the last successful reconciliation.
    pub last_success_ms: Option<u64>,
    pub last_error: Option<String>,
    pub last_report: Option<ReconcileReport>,
}

pub struct SyncAgent {
    mirror: Arc<MirrorStore>,
    source: Arc<dyn SnapshotSource>,
    sync_interval: Duration,
    retry_delay: Duration,
    status: Mutex<SyncStatus>,
    /// Guards against two passes running at once.
    pass_lock: tokio::sync::Mutex<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl SyncAgent {
    pub fn new(
        mirror: Arc<MirrorStore>,
        source: Arc<dyn SnapshotSource>,
        sync_interval: Duration,
        retry_delay: Duration,
    ) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);

        Arc::new(Self {
            mirror,
            source,
            sync_interval,
            retry_delay,
            status: Mutex::new(SyncStatus::default()),
            pass_lock: tokio::sync::Mutex::new(()),
            shutdown_tx,
        })
    }

    pub fn status(&self) -> SyncStatus {
        self.status
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn update_status(&self, f: impl FnOnce(&mut SyncStatus)) {
        let mut status = self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut status);
    }

    /// Runs one fetch + reconcile pass.
    ///
    /// On a failed fetch the mirror is not touched and the error is returned.
    pub async fn sync_once(&self) -> Result<ReconcileReport> {
        let _pass = self.pass_lock.lock().await;

        self.update_status(|s| s.phase = SyncPhase::Fetching);
        tracing::debug!("Fetching snapshot from primary");

        let snapshot = match self.source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let message = e.to_string();
                self.update_status(|s| {
                    s.phase = SyncPhase::Backoff;
                    s.failures += 1;
                    s.consecutive_failures += 1;
                    s.last_error = Some(message);
                });
                return Err(e);
            }
        };

        self.update_status(|s| s.phase = SyncPhase::Applying);
        let snapshot_len = snapshot.len();
        let report = self.mirror.reconcile(snapshot).await;

        if report.is_noop() {
            tracing::debug!("Mirror already matches snapshot ({} users)", snapshot_len);
        } else {
            tracing::info!(
                "Reconciled mirror: +{} ~{} -{} ({} users)",
                report.added,
                report.updated,
                report.removed,
                snapshot_len
            );
        }

        self.update_status(|s| {
            s.phase = SyncPhase::Idle;
            s.passes += 1;
            s.consecutive_failures = 0;
            s.last_success_ms = Some(now_ms());
            s.last_report = Some(report);
        });

        Ok(report)
    }

    /// Loops until `shutdown()` is called.
    pub async fn run(&self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        tracing::info!(
            "Sync agent started (interval {:?}, retry {:?})",
            self.sync_interval,
            self.retry_delay
        );

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let pause = match self.sync_once().await {
                Ok(_) => self.sync_interval,
                Err(e) => {
                    tracing::warn!(
                        "Sync with primary failed, retrying in {:?}: {}",
                        self.retry_delay,
                        e
                    );
                    self.retry_delay
                }
            };

            tokio::select! {
                () = tokio::time::sleep(pause) => {
                    self.update_status(|s| s.phase = SyncPhase::Idle);
                }
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }

        tracing::info!("Sync agent shutting down");
    }

    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
