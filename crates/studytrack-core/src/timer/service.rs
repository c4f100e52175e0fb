//! Async timer service.
//!
//! A spawned tokio task owns the [`TimerEngine`] exclusively and is the
//! only writer of its state. Front ends hold a cloneable [`TimerHandle`]:
//! commands go through a bounded queue and are applied one at a time in
//! arrival order; observers read the latest snapshot from a `watch`
//! channel without ever contending with the tick loop. An observer may
//! subscribe long after the session started and immediately sees the
//! accumulated state.
//!
//! The 1-second tick interval is polled only while the engine is
//! `Running` and is recreated on every transition into `Running`, so a
//! pause freezes elapsed time without dropping or duplicating ticks and a
//! resume fires its first tick a full period later. Because commands and
//! ticks run on the same task, no tick can fire after a Stop or Cancel
//! has been acknowledged.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Duration, Instant, Interval};
use tracing::{debug, warn};

use super::engine::{TimerCommand, TimerEngine, TimerSnapshot, TimerState};
use super::status::StatusSurface;
use crate::events::Event;

/// Tick period of a running timer.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Command queue depth. Senders suspend while the queue is full; they
/// never block on the tick loop itself.
const COMMAND_BUFFER: usize = 16;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service task has stopped and can no longer accept commands.
    #[error("timer service is no longer running")]
    Closed,
}

struct CommandEnvelope {
    command: TimerCommand,
    ack: Option<oneshot::Sender<TimerSnapshot>>,
}

/// Cloneable front-end handle to the timer service.
///
/// Dropping every handle shuts the service down; the session state lives
/// in the service task, not in any handle.
#[derive(Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<CommandEnvelope>,
    snapshots: watch::Receiver<TimerSnapshot>,
}

impl TimerHandle {
    /// Fire-and-forget command dispatch. Suspends only while the command
    /// queue is full.
    pub async fn dispatch(&self, command: TimerCommand) -> Result<(), ServiceError> {
        self.commands
            .send(CommandEnvelope { command, ack: None })
            .await
            .map_err(|_| ServiceError::Closed)
    }

    /// Apply a command and wait until the service has processed it.
    ///
    /// The returned snapshot reflects the post-command state; any
    /// `snapshot()` read after this resolves observes the transition, and
    /// for Stop/Cancel no further tick fires once it has resolved.
    pub async fn apply(&self, command: TimerCommand) -> Result<TimerSnapshot, ServiceError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(CommandEnvelope {
                command,
                ack: Some(ack_tx),
            })
            .await
            .map_err(|_| ServiceError::Closed)?;
        ack_rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Latest published snapshot. Never blocks on the tick loop; safe from
    /// any number of observers concurrently.
    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Attach an observer. The receiver immediately holds the current
    /// snapshot, however long the session has been running; dropping it
    /// detaches the observer without affecting the service.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }
}

/// Long-lived timer service owning the session state machine.
pub struct TimerService;

impl TimerService {
    /// Spawn the service task onto the current runtime and return a handle
    /// to it. `status` receives a formatted-time push on every accepted
    /// Start/Stop transition and every tick, and a clear on Cancel and on
    /// teardown.
    pub fn spawn(status: Arc<dyn StatusSurface>) -> TimerHandle {
        let engine = TimerEngine::new();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        tokio::spawn(run_service(engine, command_rx, snapshot_tx, status));
        TimerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        }
    }
}

async fn run_service(
    mut engine: TimerEngine,
    mut commands: mpsc::Receiver<CommandEnvelope>,
    snapshots: watch::Sender<TimerSnapshot>,
    status: Arc<dyn StatusSurface>,
) {
    debug!("timer service started");
    let mut ticker = new_ticker();

    loop {
        tokio::select! {
            envelope = commands.recv() => {
                let Some(CommandEnvelope { command, ack }) = envelope else {
                    break;
                };
                if let Some(event) = engine.apply(command) {
                    if matches!(event, Event::TimerStarted { .. }) {
                        // Discard any stale schedule; the first tick lands
                        // one full period after the transition.
                        ticker = new_ticker();
                    }
                    publish(&engine, &snapshots, status.as_ref(), &event);
                }
                if let Some(ack) = ack {
                    let _ = ack.send(engine.snapshot());
                }
            }
            _ = ticker.tick(), if engine.state() == TimerState::Running => {
                if let Some(event) = engine.tick() {
                    publish(&engine, &snapshots, status.as_ref(), &event);
                }
            }
        }
    }

    if let Err(error) = status.clear() {
        warn!(%error, "could not clear status surface on shutdown");
    }
    debug!("timer service stopped");
}

fn new_ticker() -> Interval {
    time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD)
}

/// Publish a snapshot for the given event, strictly after the mutation it
/// reflects, then mirror it onto the status surface.
fn publish(
    engine: &TimerEngine,
    snapshots: &watch::Sender<TimerSnapshot>,
    status: &dyn StatusSurface,
    event: &Event,
) {
    let snapshot = engine.snapshot();
    debug!(event = event.kind(), elapsed_secs = snapshot.elapsed_secs, "timer event");
    snapshots.send_replace(snapshot.clone());

    let pushed = match event {
        Event::TimerCancelled { .. } => status.clear(),
        _ => status.update(&snapshot.display.to_clock()),
    };
    if let Err(error) = pushed {
        warn!(%error, "status surface push failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::status::{NoStatus, StatusError};
    use std::sync::Mutex;

    /// Records every push so tests can assert on the status stream.
    #[derive(Default)]
    struct RecordingStatus {
        updates: Mutex<Vec<String>>,
        clears: Mutex<usize>,
    }

    impl StatusSurface for RecordingStatus {
        fn update(&self, text: &str) -> Result<(), StatusError> {
            self.updates.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn clear(&self) -> Result<(), StatusError> {
            *self.clears.lock().unwrap() += 1;
            Ok(())
        }
    }

    /// Advance paused time by one tick period and wait for the resulting
    /// snapshot publication.
    async fn tick_once(observer: &mut watch::Receiver<TimerSnapshot>) {
        time::advance(TICK_PERIOD).await;
        observer.changed().await.unwrap();
    }

    /// Let the service task drain anything runnable without advancing time.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_advance_elapsed_once_per_second() {
        let handle = TimerService::spawn(Arc::new(NoStatus));
        let mut observer = handle.subscribe();

        handle.apply(TimerCommand::Start).await.unwrap();
        observer.borrow_and_update();

        for _ in 0..3 {
            tick_once(&mut observer).await;
        }

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, TimerState::Running);
        assert_eq!(snapshot.elapsed_secs, 3);
        assert_eq!(snapshot.display.to_clock(), "00:00:03");
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_elapsed_and_resume_continues() {
        let handle = TimerService::spawn(Arc::new(NoStatus));
        let mut observer = handle.subscribe();

        handle.apply(TimerCommand::Start).await.unwrap();
        observer.borrow_and_update();
        for _ in 0..5 {
            tick_once(&mut observer).await;
        }

        let paused = handle.apply(TimerCommand::Stop).await.unwrap();
        assert_eq!(paused.state, TimerState::Paused);
        assert_eq!(paused.elapsed_secs, 5);
        observer.borrow_and_update();

        // The paused interval contributes nothing.
        time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(handle.snapshot().elapsed_secs, 5);

        handle.apply(TimerCommand::Start).await.unwrap();
        observer.borrow_and_update();
        for _ in 0..5 {
            tick_once(&mut observer).await;
        }

        assert_eq!(handle.snapshot().elapsed_secs, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_does_not_double_tick() {
        let handle = TimerService::spawn(Arc::new(NoStatus));
        let mut observer = handle.subscribe();

        handle.apply(TimerCommand::Start).await.unwrap();
        observer.borrow_and_update();
        for _ in 0..2 {
            tick_once(&mut observer).await;
        }

        // Second Start is a no-op: nothing published, nothing rescheduled.
        let snapshot = handle.apply(TimerCommand::Start).await.unwrap();
        assert_eq!(snapshot.state, TimerState::Running);
        assert_eq!(snapshot.elapsed_secs, 2);

        tick_once(&mut observer).await;
        assert_eq!(handle.snapshot().elapsed_secs, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_after_acknowledged_stop() {
        let handle = TimerService::spawn(Arc::new(NoStatus));
        let mut observer = handle.subscribe();

        handle.apply(TimerCommand::Start).await.unwrap();
        observer.borrow_and_update();
        for _ in 0..2 {
            tick_once(&mut observer).await;
        }
        handle.apply(TimerCommand::Stop).await.unwrap();

        time::advance(Duration::from_secs(30)).await;
        settle().await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, TimerState::Paused);
        assert_eq!(snapshot.elapsed_secs, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_zeroes_elapsed_and_clears_status() {
        let status = Arc::new(RecordingStatus::default());
        let handle = TimerService::spawn(status.clone());
        let mut observer = handle.subscribe();

        handle.apply(TimerCommand::Start).await.unwrap();
        observer.borrow_and_update();
        for _ in 0..2 {
            tick_once(&mut observer).await;
        }

        let snapshot = handle.apply(TimerCommand::Cancel).await.unwrap();
        assert_eq!(snapshot.state, TimerState::Idle);
        assert_eq!(snapshot.elapsed_secs, 0);

        let updates = status.updates.lock().unwrap().clone();
        assert_eq!(updates, vec!["00:00:00", "00:00:01", "00:00:02"]);
        assert_eq!(*status.clears.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_stop_and_cancel_are_noops() {
        let status = Arc::new(RecordingStatus::default());
        let handle = TimerService::spawn(status.clone());

        let snapshot = handle.apply(TimerCommand::Stop).await.unwrap();
        assert_eq!(snapshot.state, TimerState::Idle);
        let snapshot = handle.apply(TimerCommand::Cancel).await.unwrap();
        assert_eq!(snapshot.state, TimerState::Idle);
        assert_eq!(snapshot.elapsed_secs, 0);

        // No accepted transition, so nothing reached the surface.
        assert!(status.updates.lock().unwrap().is_empty());
        assert_eq!(*status.clears.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn late_subscriber_sees_accumulated_state() {
        let handle = TimerService::spawn(Arc::new(NoStatus));
        let mut observer = handle.subscribe();

        handle.apply(TimerCommand::Start).await.unwrap();
        observer.borrow_and_update();
        for _ in 0..4 {
            tick_once(&mut observer).await;
        }

        let late = handle.subscribe();
        let late_view = late.borrow().clone();
        assert_eq!(late_view.state, TimerState::Running);
        assert_eq!(late_view.elapsed_secs, 4);
        assert_eq!(late_view.elapsed_secs, observer.borrow().elapsed_secs);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_apply_in_arrival_order() {
        let handle = TimerService::spawn(Arc::new(NoStatus));

        handle.dispatch(TimerCommand::Start).await.unwrap();
        let snapshot = handle.apply(TimerCommand::Stop).await.unwrap();

        // Start was processed first, so the Stop landed on a running timer.
        assert_eq!(snapshot.state, TimerState::Paused);
        assert_eq!(snapshot.elapsed_secs, 0);
    }
}
