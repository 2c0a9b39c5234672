//! Microphone recording lifecycle
//!
//! `RecordingController` owns the audio backend, collects captured frames
//! and runs the live feedback (elapsed timer + frequency visualizer) while a
//! recording is active.

mod controller;
mod feedback;

pub use controller::{CaptureLost, RecordingController, RecordingState, StopOutcome};
pub use feedback::{format_elapsed, FeedbackFrame, LiveFeedback, TIMER_INTERVAL, VISUALIZER_INTERVAL};
