//! Refresh scheduling and cycle fan-out
//!
//! The scheduler owns the timer and all adapter concurrency. It cycles
//! `Idle → Fetching → Publishing → Idle` until a quit signal moves it to
//! `Stopped`. Each cycle spawns one task per enabled source, waits for every
//! task to settle (the barrier — the dashboard is consistent across sources
//! for one tick), and publishes a wholly new snapshot through a single-slot
//! watch channel. A failed or slow source contributes an empty panel for the
//! cycle; it never aborts the others.

use chrono::Utc;
use opsdash_core::{DashConfig, DashboardSnapshot, PanelBuilder};
use opsdash_sources::{SourceAdapter, SourceData};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Scheduler lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerState {
    /// Waiting for the next trigger
    Idle,
    /// A cycle's fetch tasks are in flight
    Fetching,
    /// Assembling and handing off the snapshot
    Publishing,
    /// Quit signal received; no further cycles start
    Stopped,
}

/// Handle held by the render loop: the latest-snapshot slot plus the
/// trigger/shutdown controls.
#[derive(Clone)]
pub struct SchedulerHandle {
    /// Single-slot snapshot handoff. The scheduler is the only writer; the
    /// render loop only ever reads the most recent value.
    pub snapshot_rx: watch::Receiver<Arc<DashboardSnapshot>>,
    refresh_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl SchedulerHandle {
    /// Request an on-demand refresh cycle.
    ///
    /// The request channel holds one pending trigger; anything beyond that is
    /// dropped, and requests arriving while a cycle is in flight are drained
    /// after it completes. That is the coalescing rule: at most one
    /// outstanding cycle, ever.
    pub fn request_refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }

    /// Signal the scheduler to stop. In-flight fetch tasks are abandoned;
    /// their timeouts resolve them cooperatively.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Spawn the scheduler task and return the handle the render loop uses.
pub fn spawn(sources: Vec<Arc<dyn SourceAdapter>>, config: Arc<DashConfig>) -> SchedulerHandle {
    let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(DashboardSnapshot::default()));
    let (refresh_tx, refresh_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(run_scheduler(
        sources,
        config,
        snapshot_tx,
        refresh_rx,
        shutdown_rx,
    ));

    SchedulerHandle {
        snapshot_rx,
        refresh_tx,
        shutdown_tx,
    }
}

async fn run_scheduler(
    sources: Vec<Arc<dyn SourceAdapter>>,
    config: Arc<DashConfig>,
    snapshot_tx: watch::Sender<Arc<DashboardSnapshot>>,
    mut refresh_rx: mpsc::Receiver<()>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(config.interval());
    // A tick missed while a cycle ran should not burst-fire afterwards.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut state = SchedulerState::Idle;
    let mut pending: Option<DashboardSnapshot> = None;

    loop {
        state = match state {
            SchedulerState::Idle => {
                tokio::select! {
                    _ = interval.tick() => SchedulerState::Fetching,
                    Some(()) = refresh_rx.recv() => SchedulerState::Fetching,
                    changed = shutdown_rx.changed() => {
                        match changed {
                            Ok(()) if *shutdown_rx.borrow() => SchedulerState::Stopped,
                            Ok(()) => SchedulerState::Idle,
                            // Handle dropped entirely; nothing left to serve
                            Err(_) => SchedulerState::Stopped,
                        }
                    }
                }
            }
            SchedulerState::Fetching => {
                pending = Some(run_cycle(&sources, &config).await);
                SchedulerState::Publishing
            }
            SchedulerState::Publishing => {
                if let Some(snapshot) = pending.take() {
                    let _ = snapshot_tx.send(Arc::new(snapshot));
                }
                // Triggers that arrived while Fetching/Publishing are
                // ignored; the next timer tick re-triggers naturally.
                while refresh_rx.try_recv().is_ok() {}
                SchedulerState::Idle
            }
            SchedulerState::Stopped => break,
        };
    }

    tracing::debug!("scheduler stopped");
}

/// Run one refresh cycle: fan out, barrier, assemble.
///
/// Every enabled source fetches in its own task under a per-adapter timeout
/// shorter than the refresh interval. Each task writes only its own result
/// slot; the slots are read only after all of them have settled, so there is
/// no shared mutable state between adapters. Panel order in the returned
/// snapshot is the configured source order, independent of completion order.
pub async fn run_cycle(
    sources: &[Arc<dyn SourceAdapter>],
    config: &DashConfig,
) -> DashboardSnapshot {
    let timeout = config.adapter_timeout();

    let tasks: Vec<_> = sources
        .iter()
        .map(|source| {
            if !source.enabled() {
                return None;
            }
            let source = Arc::clone(source);
            Some(tokio::spawn(async move {
                tokio::time::timeout(timeout, source.fetch()).await
            }))
        })
        .collect();

    // Cycle barrier: wait for every slot to settle before reading any.
    let mut slots: Vec<Option<SourceData>> = Vec::with_capacity(tasks.len());
    for (source, task) in sources.iter().zip(tasks) {
        let data = match task {
            None => None,
            Some(handle) => match handle.await {
                Ok(Ok(Ok(data))) => Some(data),
                Ok(Ok(Err(e))) => {
                    tracing::warn!("{}: fetch failed this cycle: {}", source.id(), e);
                    None
                }
                Ok(Err(_elapsed)) => {
                    tracing::warn!(
                        "{}: fetch exceeded {:?}, empty panel this cycle",
                        source.id(),
                        timeout
                    );
                    None
                }
                Err(join_err) => {
                    tracing::warn!("{}: fetch task aborted: {}", source.id(), join_err);
                    None
                }
            },
        };
        slots.push(data);
    }

    let mut panels = Vec::new();
    for (source, slot) in sources.iter().zip(slots) {
        let Some(data) = slot else { continue };
        let mut builder = PanelBuilder::new(source.id(), source.title(), config.show_all_builds);
        if let Some(active_users) = data.active_users {
            builder = builder.with_active_users(active_users);
        }
        builder.extend(data.rows);
        if let Some(panel) = builder.build() {
            panels.push(panel);
        }
    }

    DashboardSnapshot {
        panels,
        completed_at: Some(Utc::now()),
    }
}
