use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Period of the countdown.
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Identifies one scheduled countdown so ticks from a cancelled one can be told apart
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One countdown period elapsed for the given timer.
    Tick { timer: TimerId },
    /// Nothing arrived within the redraw interval.
    Redraw,
}

/// Source of app events (keyboard, resize, countdown ticks)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm.
///
/// Countdown ticks are posted into the same queue through [`CrosstermEventSource::sender`],
/// so all state changes are handled one at a time by the loop that owns the receiver.
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(%err, "terminal event reader stopped");
                    break;
                }
            };

            if reader_tx.send(evt).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the ticker interval and returns the next event, or Redraw on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                AppEvent::Redraw
            }
        }
    }
}

/// Cancellation handle for a scheduled countdown. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn new(id: TimerId) -> (Self, Arc<AtomicBool>) {
        let cancelled = Arc::new(AtomicBool::new(false));
        (
            Self {
                id,
                cancelled: Arc::clone(&cancelled),
            },
            cancelled,
        )
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Schedules repeating countdown ticks
pub trait TickScheduler {
    /// Start posting `AppEvent::Tick { timer: id }` every `period` until the handle is dropped.
    fn schedule(&mut self, id: TimerId, period: Duration) -> TimerHandle;
}

/// Production scheduler: one sleeper thread per countdown
#[derive(Debug, Clone)]
pub struct ThreadTickScheduler {
    tx: Sender<AppEvent>,
}

impl ThreadTickScheduler {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl TickScheduler for ThreadTickScheduler {
    fn schedule(&mut self, id: TimerId, period: Duration) -> TimerHandle {
        let (handle, cancelled) = TimerHandle::new(id);
        let tx = self.tx.clone();

        thread::spawn(move || loop {
            thread::sleep(period);
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(AppEvent::Tick { timer: id }).is_err() {
                break;
            }
        });

        handle
    }
}

/// Scheduler that never fires on its own; tests deliver ticks by hand
#[derive(Debug, Default)]
pub struct ManualTickScheduler {
    timers: Vec<(TimerId, Arc<AtomicBool>)>,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of countdowns ever scheduled.
    pub fn scheduled(&self) -> usize {
        self.timers.len()
    }

    /// Ids of countdowns that have not been cancelled.
    pub fn live(&self) -> Vec<TimerId> {
        self.timers
            .iter()
            .filter(|(_, cancelled)| !cancelled.load(Ordering::SeqCst))
            .map(|(id, _)| *id)
            .collect()
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule(&mut self, id: TimerId, _period: Duration) -> TimerHandle {
        let (handle, cancelled) = TimerHandle::new(id);
        self.timers.push((id, cancelled));
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn step_returns_redraw_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        assert_matches!(runner.step(), AppEvent::Redraw);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        tx.send(AppEvent::Tick { timer: TimerId(3) }).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        assert_matches!(runner.step(), AppEvent::Resize);
        assert_matches!(runner.step(), AppEvent::Tick { timer: TimerId(3) });
    }

    #[test]
    fn dropping_handle_cancels() {
        let mut scheduler = ManualTickScheduler::new();

        let handle = scheduler.schedule(TimerId(1), COUNTDOWN_PERIOD);
        assert_eq!(scheduler.live(), vec![TimerId(1)]);
        assert!(!handle.is_cancelled());

        drop(handle);
        assert!(scheduler.live().is_empty());
        assert_eq!(scheduler.scheduled(), 1);
    }

    #[test]
    fn thread_scheduler_posts_ticks_until_cancelled() {
        let (tx, rx) = mpsc::channel();
        let mut scheduler = ThreadTickScheduler::new(tx);

        let handle = scheduler.schedule(TimerId(7), Duration::from_millis(5));
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_matches!(first, AppEvent::Tick { timer: TimerId(7) });

        drop(handle);
        // at most one tick can already be in flight when the flag flips
        thread::sleep(Duration::from_millis(30));
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }
}
