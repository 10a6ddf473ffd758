//! Timer driver
//!
//! Runs the countdown and flight timers requested through `StartTimer` /
//! `StopTimer` page actions. Each timer kind is a singleton: starting one
//! aborts the previous task of the same kind first.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::assistant::Input;
use crate::events::{PageAction, TimerKind};

/// Spawns and cancels tick tasks that feed back into the assistant
pub struct TimerDriver {
    input_tx: mpsc::Sender<Input>,
    handles: HashMap<TimerKind, JoinHandle<()>>,
}

impl TimerDriver {
    pub fn new(input_tx: mpsc::Sender<Input>) -> Self {
        Self {
            input_tx,
            handles: HashMap::new(),
        }
    }

    /// Follow the action stream until it closes
    pub async fn run(mut self, mut action_rx: broadcast::Receiver<PageAction>) {
        loop {
            match action_rx.recv().await {
                Ok(action) => self.apply(&action),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "timer driver lagged behind actions");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        self.stop_all();
        info!("timer driver stopped");
    }

    /// React to a single page action; anything but timer actions is ignored
    pub fn apply(&mut self, action: &PageAction) {
        match action {
            PageAction::StartTimer {
                timer,
                generation,
                interval_ms,
            } => self.start(*timer, *generation, Duration::from_millis(*interval_ms)),
            PageAction::StopTimer { timer } => self.stop(*timer),
            _ => {}
        }
    }

    /// Start a timer, clearing any previous one of the same kind
    pub fn start(&mut self, timer: TimerKind, generation: u64, period: Duration) {
        self.stop(timer);

        let input_tx = self.input_tx.clone();
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if input_tx.send(Input::Tick { timer, generation }).await.is_err() {
                    break;
                }
            }
        });

        debug!(%timer, generation, period_ms = period.as_millis() as u64, "timer started");
        self.handles.insert(timer, handle);
    }

    pub fn stop(&mut self, timer: TimerKind) {
        if let Some(handle) = self.handles.remove(&timer) {
            handle.abort();
            debug!(%timer, "timer stopped");
        }
    }

    #[cfg(test)]
    pub fn is_running(&self, timer: TimerKind) -> bool {
        self.handles
            .get(&timer)
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    fn stop_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.stop_all();
    }
}
