// Live-update watcher - detects newly arrived measurements for the active
// station without disrupting the current view
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::ReceiverStream;

use crate::application::gateway::MeasurementGateway;
use crate::application::measurement_store::MeasurementStore;
use crate::domain::measurement::Measurement;

#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    /// Fixed poll interval while in Watching.
    pub poll_interval: Duration,
    /// How long a notification stays outstanding before the watcher re-arms
    /// on its own (the UI snackbar's display duration).
    pub notify_ttl: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            notify_ttl: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WatcherEvent {
    /// One-shot "new data available" notification carrying the candidate
    /// record. Emitted at most once per distinct measurement id.
    NewMeasurement(Measurement),
}

#[derive(Debug)]
enum WatcherCommand {
    Dismiss,
    Sync { latest_id: Option<i64> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Watching,
    Notifying { id: i64, since: Instant },
}

struct WatcherState {
    last_known_id: Option<i64>,
    phase: Phase,
}

/// Disposal handle for a running watcher. Dropping it aborts the poll task,
/// releasing the timer and any push subscription deterministically.
pub struct WatcherHandle {
    commands: mpsc::Sender<WatcherCommand>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// User dismissed the outstanding notification.
    pub async fn dismiss(&self) {
        let _ = self.commands.send(WatcherCommand::Dismiss).await;
    }

    /// Resynchronize after the store was refreshed from a fresh query or the
    /// view switched station.
    pub async fn sync(&self, latest_id: Option<i64>) {
        let _ = self.commands.send(WatcherCommand::Sync { latest_id }).await;
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct LiveWatcher {
    gateway: Arc<dyn MeasurementGateway>,
    store: Arc<MeasurementStore>,
    config: WatcherConfig,
}

impl LiveWatcher {
    pub fn new(
        gateway: Arc<dyn MeasurementGateway>,
        store: Arc<MeasurementStore>,
        config: WatcherConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    /// Enter Watching for `station`. Polling is the primary detection
    /// channel; `push` (a decoded broker subscription) supplements it, and
    /// both feed the same duplicate-suppression gate so the two channels
    /// cannot double-notify. The watcher starts from the store's latest
    /// known id for the station.
    pub fn spawn(
        self,
        station: String,
        push: Option<mpsc::Receiver<Measurement>>,
    ) -> (WatcherHandle, ReceiverStream<WatcherEvent>) {
        let (event_tx, event_rx) = mpsc::channel(16);
        let (command_tx, command_rx) = mpsc::channel(16);

        let state = WatcherState {
            last_known_id: self.store.latest_id(),
            phase: Phase::Watching,
        };

        let task = tokio::spawn(self.watch_loop(station, state, push, command_rx, event_tx));

        (
            WatcherHandle {
                commands: command_tx,
                task,
            },
            ReceiverStream::new(event_rx),
        )
    }

    async fn watch_loop(
        self,
        station: String,
        mut state: WatcherState,
        mut push: Option<mpsc::Receiver<Measurement>>,
        mut commands: mpsc::Receiver<WatcherCommand>,
        events: mpsc::Sender<WatcherEvent>,
    ) {
        tracing::info!(%station, "watcher entering Watching");

        // First tick only after a full interval; the page the view just
        // loaded is current enough.
        let mut ticker = tokio::time::interval_at(
            Instant::now() + self.config.poll_interval,
            self.config.poll_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.gateway.fetch_latest(&station).await {
                        Ok(Some(candidate)) => self.consider(&mut state, candidate, &events).await,
                        Ok(None) => {}
                        // Swallowed: a failed poll degrades to "no
                        // notification" and the next tick retries.
                        Err(e) => tracing::warn!(%station, "latest-measurement poll failed: {e}"),
                    }
                }
                Some(candidate) = recv_push(&mut push) => {
                    self.consider(&mut state, candidate, &events).await;
                }
                command = commands.recv() => {
                    match command {
                        Some(WatcherCommand::Dismiss) => {
                            if let Phase::Notifying { id, .. } = state.phase {
                                tracing::debug!(id, "notification dismissed");
                            }
                            state.phase = Phase::Watching;
                        }
                        Some(WatcherCommand::Sync { latest_id }) => {
                            state.last_known_id = latest_id;
                            state.phase = Phase::Watching;
                        }
                        // Handle dropped: tear down.
                        None => break,
                    }
                }
            }
        }

        tracing::info!(%station, "watcher entering Idle");
    }

    async fn consider(
        &self,
        state: &mut WatcherState,
        candidate: Measurement,
        events: &mpsc::Sender<WatcherEvent>,
    ) {
        // Re-arm once the outstanding notification has been on screen long
        // enough.
        if let Phase::Notifying { since, .. } = state.phase {
            if since.elapsed() >= self.config.notify_ttl {
                state.phase = Phase::Watching;
            }
        }

        // Same id as the one already announced: stay silent.
        if state.last_known_id == Some(candidate.id) {
            return;
        }

        // A store refresh already brought this record in; record it without
        // an alert so the refresh does not read as new data.
        if self.store.latest_id() == Some(candidate.id) {
            state.last_known_id = Some(candidate.id);
            return;
        }

        tracing::info!(id = candidate.id, ts = %candidate.timestamp, "new measurement detected");
        state.last_known_id = Some(candidate.id);
        state.phase = Phase::Notifying {
            id: candidate.id,
            since: Instant::now(),
        };
        let _ = events.send(WatcherEvent::NewMeasurement(candidate)).await;
    }
}

async fn recv_push(push: &mut Option<mpsc::Receiver<Measurement>>) -> Option<Measurement> {
    match push {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
