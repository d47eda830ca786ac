//! DrawEvent: notifications published to the presentation layer

use rf_core::Participant;
use serde::{Deserialize, Serialize};

use crate::engine::DrawState;

/// Event emitted by a draw session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawEvent {
    /// Engine moved to a new state
    StateChanged { state: DrawState },

    /// A timed spin began
    SpinStarted { pool_size: usize, settle_delay_ms: f64 },

    /// Name currently under the reel marker
    Candidate {
        participant: Participant,
        offset_ms: f64,
    },

    /// Winner committed to the ledger
    WinnerRevealed {
        winner: Participant,
        /// 1-based position in the ledger
        draw_order: usize,
        /// Selected without a spin (pool of one)
        auto_selected: bool,
    },

    /// User-facing status line
    Status { message: String },

    /// Draw request ignored because a spin is in flight
    DrawRejected,

    /// Ledger cleared by reset
    Cleared,
}

impl DrawEvent {
    /// Get event type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::SpinStarted { .. } => "spin_started",
            Self::Candidate { .. } => "candidate",
            Self::WinnerRevealed { .. } => "winner_revealed",
            Self::Status { .. } => "status",
            Self::DrawRejected => "draw_rejected",
            Self::Cleared => "cleared",
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }
}
