use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::audio::FrequencyAnalyser;

/// Elapsed-time readout refresh interval
pub const TIMER_INTERVAL: Duration = Duration::from_millis(50);

/// Visualizer refresh interval (~60 fps)
pub const VISUALIZER_INTERVAL: Duration = Duration::from_millis(16);

/// Snapshot of the live recording feedback
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackFrame {
    /// Whether a recording is in progress
    pub active: bool,
    pub elapsed_ms: u64,
    /// Elapsed time as `MM:SS.hh`
    pub elapsed: String,
    /// Visualizer bar heights in `0.0..=1.0`
    pub bars: Vec<f32>,
}

impl FeedbackFrame {
    fn idle() -> Self {
        Self {
            elapsed: format_elapsed(0),
            ..Self::default()
        }
    }
}

pub fn format_elapsed(elapsed_ms: u64) -> String {
    format!(
        "{:02}:{:02}.{:02}",
        elapsed_ms / 60_000,
        (elapsed_ms / 1000) % 60,
        (elapsed_ms % 1000) / 10
    )
}

/// Timer and visualizer tasks for an active recording
pub struct LiveFeedback {
    tx: Arc<watch::Sender<FeedbackFrame>>,
    bar_count: usize,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveFeedback {
    pub fn new(bar_count: usize) -> Self {
        let (tx, _rx) = watch::channel(FeedbackFrame::idle());
        Self {
            tx: Arc::new(tx),
            bar_count,
            tasks: Vec::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedbackFrame> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> FeedbackFrame {
        self.tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Start the timer and visualizer; restarts them if already running
    pub fn start(&mut self, analyser: Arc<Mutex<FrequencyAnalyser>>) {
        self.stop();

        let started = Instant::now();
        let bar_count = self.bar_count;
        self.tx.send_replace(FeedbackFrame {
            active: true,
            elapsed_ms: 0,
            elapsed: format_elapsed(0),
            bars: vec![0.0; bar_count],
        });

        let tx = Arc::clone(&self.tx);
        let timer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TIMER_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tx.send_modify(|frame| {
                    frame.elapsed_ms = elapsed_ms;
                    frame.elapsed = format_elapsed(elapsed_ms);
                });
            }
        });

        let tx = Arc::clone(&self.tx);
        let visualizer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(VISUALIZER_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let bars = match analyser.lock() {
                    Ok(analyser) => analyser.bars(bar_count),
                    Err(_) => break,
                };
                tx.send_modify(|frame| frame.bars = bars);
            }
        });

        self.tasks = vec![timer, visualizer];
        debug!("Live feedback started");
    }

    /// Stop both tasks and reset the published frame
    pub fn stop(&mut self) {
        if self.tasks.is_empty() {
            return;
        }

        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.tx.send_replace(FeedbackFrame::idle());
        debug!("Live feedback stopped");
    }
}

impl Drop for LiveFeedback {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}
