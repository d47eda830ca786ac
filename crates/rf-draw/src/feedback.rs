//! Audio/visual feedback hooks
//!
//! Fire-and-forget: the engine never waits on or inspects the result of a
//! feedback call.

use rf_core::Participant;

/// Receiver of spin start/stop cues (sound, confetti, lights)
pub trait FeedbackSink: Send + Sync {
    /// Spin animation started (loop the spinning sound)
    fn spin_started(&self, _pool_size: usize) {}

    /// Spin animation stopped (stop the loop)
    fn spin_stopped(&self) {}

    /// Winner is on display (win sound, confetti)
    fn winner_revealed(&self, _winner: &Participant) {}

    /// Session cleared or torn down; stop anything still playing
    fn silence(&self) {}
}

/// Ignores every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {}

/// Writes cues to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn spin_started(&self, pool_size: usize) {
        log::info!("[Feedback] Spin started ({} candidates)", pool_size);
    }

    fn spin_stopped(&self) {
        log::info!("[Feedback] Spin stopped");
    }

    fn winner_revealed(&self, winner: &Participant) {
        log::info!("[Feedback] Winner: {}", winner);
    }

    fn silence(&self) {
        log::debug!("[Feedback] Silence");
    }
}
