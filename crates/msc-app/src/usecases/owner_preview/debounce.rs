use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use super::lock;

type RunFn<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Coalesces rapid value changes into one run after a quiet period.
///
/// ## Behavior
/// - `schedule` cancels the pending timer (if any) and starts a new one.
/// - Only the last value scheduled before the quiet period elapses reaches the
///   run callback.
/// - Cancellation is synchronous: once `schedule`, `cancel` or `close` returns,
///   the superseded value can no longer be emitted. Every timer captures the
///   epoch it was scheduled under and re-checks it under the gate lock before
///   running, so a timer whose abort raced with its wake-up still stays silent.
///
/// The run callback is invoked while the gate lock is held; it must not call
/// back into the gate.
///
/// Timers are Tokio tasks, so `schedule` must be called within a Tokio runtime.
pub struct DebounceGate<T> {
    quiet_period: Duration,
    state: Arc<Mutex<GateState>>,
    on_run: RunFn<T>,
}

#[derive(Default)]
struct GateState {
    epoch: u64,
    pending: Option<AbortHandle>,
    closed: bool,
}

impl GateState {
    fn supersede(&mut self) -> bool {
        self.epoch += 1;
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl<T> DebounceGate<T>
where
    T: Send + 'static,
{
    pub fn new(quiet_period: Duration, on_run: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            quiet_period,
            state: Arc::new(Mutex::new(GateState::default())),
            on_run: Arc::new(on_run),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Restart the quiet period with `value` as the candidate to run.
    /// Ignored once the gate is closed.
    pub fn schedule(&self, value: T) {
        let mut state = lock(&self.state);
        if state.closed {
            return;
        }
        state.supersede();
        let epoch = state.epoch;

        let gate = Arc::clone(&self.state);
        let on_run = Arc::clone(&self.on_run);
        let deadline = Instant::now() + self.quiet_period;
        let task = tokio::spawn(async move {
            sleep_until(deadline).await;

            let mut state = lock(&gate);
            if state.closed || state.epoch != epoch {
                return;
            }
            state.pending = None;
            trace!(epoch, "debounce quiet period elapsed");
            on_run(value);
        });

        state.pending = Some(task.abort_handle());
    }

    /// Cancel the pending timer. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        lock(&self.state).supersede()
    }

    /// Cancel the pending timer and refuse every later `schedule`. Idempotent.
    pub fn close(&self) {
        let mut state = lock(&self.state);
        state.supersede();
        state.closed = true;
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

impl<T> Drop for DebounceGate<T> {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.supersede();
        state.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn recording_gate(quiet_ms: u64) -> (DebounceGate<&'static str>, Arc<Mutex<Vec<&'static str>>>) {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&runs);
        let gate = DebounceGate::new(Duration::from_millis(quiet_ms), move |value| {
            sink.lock().unwrap().push(value);
        });
        (gate, runs)
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_after_quiet_period() {
        let (gate, runs) = recording_gate(350);

        gate.schedule("A");
        advance(Duration::from_millis(349)).await;
        settle().await;
        assert!(runs.lock().unwrap().is_empty());
        assert!(gate.is_pending());

        advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(*runs.lock().unwrap(), vec!["A"]);
        assert!(!gate.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_coalesce_to_last_value() {
        let (gate, runs) = recording_gate(350);

        gate.schedule("A");
        advance(Duration::from_millis(200)).await;
        gate.schedule("B");
        advance(Duration::from_millis(200)).await;
        gate.schedule("C");
        advance(Duration::from_millis(200)).await;
        settle().await;
        assert!(runs.lock().unwrap().is_empty());

        advance(Duration::from_millis(150)).await;
        settle().await;
        assert_eq!(*runs.lock().unwrap(), vec!["C"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_synchronous() {
        let (gate, runs) = recording_gate(100);

        gate.schedule("A");
        assert!(gate.cancel());
        assert!(!gate.cancel());
        advance(Duration::from_secs(1)).await;
        settle().await;

        assert!(runs.lock().unwrap().is_empty());
        assert!(!gate.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_idempotent_and_rejects_new_values() {
        let (gate, runs) = recording_gate(100);

        gate.schedule("A");
        gate.close();
        gate.close();
        gate.schedule("B");
        assert!(gate.is_closed());
        assert!(!gate.is_pending());

        advance(Duration::from_secs(1)).await;
        settle().await;
        assert!(runs.lock().unwrap().is_empty());
    }
}
