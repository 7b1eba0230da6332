//! Tokio-backed time source and the single-task run loop.
//!
//! Every armed timer is a small task that forwards its [`TimerId`] over one
//! unbounded channel. The run loop is the only place the engine is touched:
//! timer fires, settings changes and user commands are serialized through one
//! `select!`, so the engine sees them strictly one at a time.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::engine::{EngineInput, EngineStatus, ReminderEngine};
use crate::events::Event;
use crate::overlay::{DisplayProvider, OverlaySurface};
use crate::storage::ReminderConfig;
use crate::timer::{TimerId, TimerKind, TimerService};

/// [`TimerService`] on tokio intervals. Must be used inside a tokio runtime.
///
/// Ticks missed while the process was suspended are dropped, not replayed.
/// A fire may still be queued in the channel when its timer is cancelled;
/// the engine ignores ids it no longer recognises.
#[derive(Debug)]
pub struct TokioTimers {
    tx: mpsc::UnboundedSender<TimerId>,
    next_id: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioTimers {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timers = Self {
            tx,
            next_id: 0,
            tasks: HashMap::new(),
        };
        (timers, rx)
    }

    pub fn armed_count(&self) -> usize {
        self.tasks.len()
    }
}

impl TimerService for TokioTimers {
    fn arm(&mut self, kind: TimerKind, period: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId::new(self.next_id);
        let tx = self.tx.clone();
        let first = Instant::now() + period;
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(id).is_err() {
                    break;
                }
            }
        });
        trace!(%id, ?kind, ?period, "timer armed");
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
            trace!(%id, "timer cancelled");
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// User commands accepted by [`run`].
#[derive(Debug)]
pub enum Command {
    SkipNext(u32),
    Dismiss,
    Status(oneshot::Sender<EngineStatus>),
    Quit,
}

/// Drive `engine` until [`Command::Quit`] arrives or every command sender is
/// dropped. The engine is configured from the current settings value first,
/// and reconfigured on every settings change. `on_event` sees every event in
/// order. The engine is shut down and handed back on exit.
pub async fn run<T, D, S, F>(
    mut engine: ReminderEngine<T, D, S>,
    mut fired: mpsc::UnboundedReceiver<TimerId>,
    mut settings: watch::Receiver<ReminderConfig>,
    mut commands: mpsc::Receiver<Command>,
    mut on_event: F,
) -> ReminderEngine<T, D, S>
where
    T: TimerService,
    D: DisplayProvider,
    S: OverlaySurface,
    F: FnMut(&Event),
{
    let mut emit = |events: Vec<Event>| events.iter().for_each(&mut on_event);

    let initial = *settings.borrow_and_update();
    emit(engine.handle(EngineInput::Configure(initial)));
    info!("reminder loop running");

    let mut settings_open = true;
    loop {
        tokio::select! {
            Some(id) = fired.recv() => {
                emit(engine.handle(EngineInput::TimerFired(id)));
            }
            changed = settings.changed(), if settings_open => match changed {
                Ok(()) => {
                    let config = *settings.borrow_and_update();
                    emit(engine.handle(EngineInput::Configure(config)));
                }
                Err(_) => {
                    debug!("settings store closed, keeping current timing");
                    settings_open = false;
                }
            },
            command = commands.recv() => match command {
                Some(Command::SkipNext(n)) => emit(engine.handle(EngineInput::SkipNext(n))),
                Some(Command::Dismiss) => emit(engine.handle(EngineInput::Dismiss(None))),
                Some(Command::Status(reply)) => {
                    let _ = reply.send(engine.status());
                }
                Some(Command::Quit) | None => break,
            },
        }
    }

    emit(engine.shutdown());
    info!("reminder loop stopped");
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EndReason;
    use crate::overlay::{
        Display, OverlayCoordinator, OverlayHandle, OverlayView, Rect, StaticDisplays,
    };

    #[derive(Debug, Default)]
    struct NullSurface;

    impl OverlaySurface for NullSurface {
        fn open(&mut self, _: &OverlayHandle, _: &OverlayView) {}
        fn update(&mut self, _: &OverlayHandle, _: &OverlayView) {}
        fn close(&mut self, _: &OverlayHandle) {}
    }

    fn engine(
        timers: TokioTimers,
    ) -> ReminderEngine<TokioTimers, StaticDisplays, NullSurface> {
        let displays = StaticDisplays::new(vec![Display {
            id: "main".into(),
            work_area: Rect {
                x: 0.0,
                y: 0.0,
                width: 1280.0,
                height: 800.0,
            },
        }]);
        ReminderEngine::new(timers, OverlayCoordinator::new(displays, NullSurface, Some(3)))
    }

    async fn status(tx: &mpsc::Sender<Command>) -> EngineStatus {
        let (reply, rx) = oneshot::channel();
        tx.send(Command::Status(reply)).await.unwrap();
        rx.await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn interval_timer_fires_after_one_period() {
        let (mut timers, mut rx) = TokioTimers::new();
        let start = Instant::now();
        let id = timers.arm(TimerKind::Reminder, Duration::from_secs(60));

        assert_eq!(rx.recv().await, Some(id));
        let first = start.elapsed();
        assert!(first >= Duration::from_secs(60) && first < Duration::from_secs(61));
        assert_eq!(rx.recv().await, Some(id));
        let second = start.elapsed();
        assert!(second >= Duration::from_secs(120) && second < Duration::from_secs(121));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_stops_sending() {
        let (mut timers, mut rx) = TokioTimers::new();
        let old = timers.arm(TimerKind::Reminder, Duration::from_secs(60));
        timers.cancel(old);
        let new = timers.arm(TimerKind::Reminder, Duration::from_secs(90));

        assert_eq!(rx.recv().await, Some(new));
        assert_eq!(timers.armed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_breaks_then_dismisses() {
        let (timers, fired) = TokioTimers::new();
        let (_settings_tx, settings_rx) = watch::channel(ReminderConfig::default());
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let mut events = Vec::new();

        let driver = async {
            time::sleep(Duration::from_millis(120_500)).await;
            let during = status(&cmd_tx).await;
            cmd_tx.send(Command::Dismiss).await.unwrap();
            let after = status(&cmd_tx).await;
            cmd_tx.send(Command::Quit).await.unwrap();
            (during, after)
        };

        let (engine, (during, after)) = tokio::join!(
            run(engine(timers), fired, settings_rx, cmd_rx, |e| events.push(e.clone())),
            driver
        );

        assert_eq!(during.session.map(|s| s.total_seconds), Some(60));
        assert!(after.session.is_none());
        assert_eq!(engine.timers().armed_count(), 0);
        assert!(matches!(events.first(), Some(Event::SchedulerArmed { interval_secs: 120, .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::BreakEnded { reason: EndReason::Dismissed, .. }
        )));
        assert!(matches!(events.last(), Some(Event::SchedulerStopped { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn settings_change_restarts_period() {
        let (timers, fired) = TokioTimers::new();
        let (settings_tx, settings_rx) = watch::channel(ReminderConfig::default());
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let mut events = Vec::new();

        let driver = async {
            time::sleep(Duration::from_secs(100)).await;
            settings_tx.send_replace(ReminderConfig {
                interval_seconds: 300,
                break_seconds: 30,
            });
            // The old 120s timer would have fired at t=120.
            time::sleep(Duration::from_secs(250)).await;
            let quiet = status(&cmd_tx).await;
            // New period started at t=100, so the first break is at t=400.
            time::sleep(Duration::from_millis(50_500)).await;
            let active = status(&cmd_tx).await;
            cmd_tx.send(Command::Quit).await.unwrap();
            (quiet, active)
        };

        let (_engine, (quiet, active)) = tokio::join!(
            run(engine(timers), fired, settings_rx, cmd_rx, |e| events.push(e.clone())),
            driver
        );

        assert_eq!(quiet.interval_secs, Some(300));
        assert!(quiet.session.is_none());
        assert_eq!(active.session.map(|s| s.total_seconds), Some(30));
        let started = events
            .iter()
            .filter(|e| matches!(e, Event::BreakStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_command_sender_stops_loop() {
        let (timers, fired) = TokioTimers::new();
        let (_settings_tx, settings_rx) = watch::channel(ReminderConfig::default());
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        drop(cmd_tx);

        let engine = run(engine(timers), fired, settings_rx, cmd_rx, |_| {}).await;
        assert_eq!(engine.timers().armed_count(), 0);
    }
}
