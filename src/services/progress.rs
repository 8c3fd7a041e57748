//! Cosmetic progress for job creation.
//!
//! The ticker walks a fixed list of labelled steps on a timer. It knows
//! nothing about the backend job; callers stop it when the real requests
//! finish, whichever way they finish.

use crate::models::tryon_types::ProcessingProgress;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const INITIAL_STEP: &str = "Preparing your images...";

pub const PROGRESS_STEPS: [(&str, u8); 5] = [
    ("Downloading dress image...", 20),
    ("Processing your photo...", 40),
    ("Applying AI magic...", 60),
    ("Creating virtual try-on...", 80),
    ("Finalizing results...", 95),
];

pub struct ProgressTicker {
    tx: Arc<watch::Sender<ProcessingProgress>>,
    task: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProcessingProgress::default());
        Self {
            tx: Arc::new(tx),
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProcessingProgress> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ProcessingProgress {
        self.tx.borrow().clone()
    }

    /// True while the timer task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Must be called inside a tokio runtime.
    pub fn start(&mut self, tick: Duration) {
        self.stop();
        self.tx.send_replace(ProcessingProgress::new(INITIAL_STEP, 0));

        let tick = tick.max(Duration::from_millis(1));
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // first tick completes immediately
            interval.tick().await;
            for (label, percent) in PROGRESS_STEPS {
                interval.tick().await;
                tx.send_replace(ProcessingProgress::new(label, percent));
            }
        }));
    }

    /// Aborts the timer and returns progress to idle.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.tx.send_replace(ProcessingProgress::default());
    }
}

impl Default for ProgressTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
