//! Draw Session: async driver for the draw engine
//!
//! Owns the engine, runs the one-shot settle timer for each spin and
//! publishes [`DrawEvent`]s. Presentation layers hold a reference and call
//! `request_draw` / `reset`; they never touch the ledger directly.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use rf_core::{Participant, Roster};

use crate::config::DrawConfig;
use crate::engine::{DrawEngine, DrawOutcome, DrawState, DrawStats};
use crate::event::DrawEvent;
use crate::feedback::{FeedbackSink, NoFeedback};
use crate::spin::{SpinPlan, SpinTicket};
use crate::timing::ms_to_duration;

const EVENT_CAPACITY: usize = 256;

/// Settle timer for the in-flight spin
struct SpinTask {
    ticket: SpinTicket,
    cancel: CancellationToken,
    /// Cancelled by the task itself when it exits, on any path
    finished: CancellationToken,
}

/// Interactive draw session
pub struct DrawSession {
    engine: Arc<Mutex<DrawEngine>>,
    event_tx: broadcast::Sender<DrawEvent>,
    feedback: Arc<dyn FeedbackSink>,
    spin: Mutex<Option<SpinTask>>,
}

impl DrawSession {
    pub fn new(roster: Roster, config: DrawConfig) -> Self {
        Self::from_engine(DrawEngine::with_config(roster, config))
    }

    pub fn from_engine(engine: DrawEngine) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            event_tx,
            feedback: Arc::new(NoFeedback),
            spin: Mutex::new(None),
        }
    }

    /// Attach an audio/visual feedback sink
    pub fn with_feedback(mut self, feedback: Arc<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<DrawEvent> {
        self.event_tx.subscribe()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READ ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> DrawState {
        self.engine.lock().state()
    }

    /// Ledger snapshot in draw order. Safe mid-spin.
    pub fn winners(&self) -> Vec<Participant> {
        self.engine.lock().winners()
    }

    pub fn remaining(&self) -> Vec<Participant> {
        self.engine.lock().remaining()
    }

    pub fn current_winner(&self) -> Option<Participant> {
        self.engine.lock().current_winner().cloned()
    }

    pub fn status(&self) -> Option<String> {
        self.engine.lock().status().map(str::to_string)
    }

    pub fn stats(&self) -> DrawStats {
        self.engine.lock().stats().clone()
    }

    pub fn roster(&self) -> Roster {
        self.engine.lock().roster().clone()
    }

    /// Is a settle timer still outstanding?
    pub fn has_pending_spin(&self) -> bool {
        self.spin
            .lock()
            .as_ref()
            .is_some_and(|task| !task.finished.is_cancelled())
    }

    /// Run a closure against the engine (configuration changes)
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut DrawEngine) -> R) -> R {
        f(&mut self.engine.lock())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMMANDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Request a draw.
    ///
    /// Must be called from within a Tokio runtime: a timed spin schedules its
    /// settle on the current runtime.
    pub fn request_draw(&self) -> DrawOutcome {
        let outcome = self.engine.lock().request_draw();

        match &outcome {
            DrawOutcome::Busy => {
                self.emit(DrawEvent::DrawRejected);
            }
            DrawOutcome::Exhausted => {
                self.emit_status();
            }
            DrawOutcome::AutoSelected(winner) => {
                let draw_order = self.engine.lock().ledger().len();
                self.emit(DrawEvent::StateChanged {
                    state: DrawState::Settled,
                });
                self.emit(DrawEvent::WinnerRevealed {
                    winner: winner.clone(),
                    draw_order,
                    auto_selected: true,
                });
                self.emit_status();
                self.feedback.winner_revealed(winner);
            }
            DrawOutcome::Spinning(plan) => {
                self.emit(DrawEvent::StateChanged {
                    state: DrawState::Spinning,
                });
                self.emit(DrawEvent::SpinStarted {
                    pool_size: plan.pool_size(),
                    settle_delay_ms: plan.settle_delay_ms(),
                });
                self.feedback.spin_started(plan.pool_size());
                self.schedule_settle(plan.clone());
            }
        }

        outcome
    }

    /// Clear winners and return to idle. Cancels an in-flight spin.
    pub fn reset(&self) {
        self.cancel_spin();
        self.engine.lock().reset();
        self.feedback.silence();
        self.emit(DrawEvent::Cleared);
        self.emit(DrawEvent::StateChanged {
            state: DrawState::Idle,
        });
        self.emit_status();
    }

    /// Tear the session down: the pending settle, if any, never fires.
    pub fn close(&self) {
        if self.cancel_spin() {
            self.feedback.silence();
        }
    }

    /// Wait for the in-flight spin, if any, to settle or be cancelled
    pub async fn wait_settled(&self) {
        let finished = self.spin.lock().as_ref().map(|task| task.finished.clone());
        if let Some(finished) = finished {
            finished.cancelled().await;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════════

    fn schedule_settle(&self, plan: SpinPlan) {
        let cancel = CancellationToken::new();
        let finished = CancellationToken::new();
        let ticket = plan.ticket;

        let engine = Arc::clone(&self.engine);
        let event_tx = self.event_tx.clone();
        let feedback = Arc::clone(&self.feedback);
        let task_cancel = cancel.clone();
        let done = finished.clone().drop_guard();

        tokio::spawn(async move {
            let _done = done;
            let started = Instant::now();

            for frame in plan.candidate_frames() {
                let offset = ms_to_duration(frame.offset_ms);
                // Unrepresentable deadline: tokio clamps the sleep to its far future
                let wait = match started.checked_add(offset) {
                    Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                    None => offset,
                };
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        log::debug!("[DrawSession] Spin {:?} cancelled", ticket);
                        return;
                    }
                    _ = tokio::time::sleep(wait) => {}
                }
                if !frame.settles {
                    let _ = event_tx.send(DrawEvent::Candidate {
                        participant: frame.participant,
                        offset_ms: frame.offset_ms,
                    });
                }
            }

            // Engine rejects the ticket if a reset slipped in after the last sleep
            let settled = {
                let mut engine = engine.lock();
                engine
                    .settle(ticket)
                    .map(|winner| (winner, engine.ledger().len()))
            };

            if let Some((winner, draw_order)) = settled {
                feedback.spin_stopped();
                let _ = event_tx.send(DrawEvent::StateChanged {
                    state: DrawState::Settled,
                });
                let _ = event_tx.send(DrawEvent::WinnerRevealed {
                    winner: winner.clone(),
                    draw_order,
                    auto_selected: false,
                });
                feedback.winner_revealed(&winner);
            }
        });

        let previous = self.spin.lock().replace(SpinTask {
            ticket,
            cancel,
            finished,
        });
        if let Some(previous) = previous {
            // Only finished tasks can be left behind; the engine guard forbids overlap
            previous.cancel.cancel();
        }
    }

    /// Returns true if a live timer was cancelled
    fn cancel_spin(&self) -> bool {
        let Some(task) = self.spin.lock().take() else {
            return false;
        };
        let live = !task.finished.is_cancelled();
        task.cancel.cancel();
        if live {
            log::debug!("[DrawSession] Cancelled settle for {:?}", task.ticket);
        }
        live
    }

    fn emit(&self, event: DrawEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    fn emit_status(&self) {
        let status = self.engine.lock().status().map(str::to_string);
        if let Some(message) = status {
            self.emit(DrawEvent::status(message));
        }
    }
}

impl Drop for DrawSession {
    fn drop(&mut self) {
        if let Some(task) = self.spin.get_mut().take() {
            task.cancel.cancel();
        }
    }
}
