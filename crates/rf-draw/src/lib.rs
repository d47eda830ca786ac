//! # rf-draw - Raffle Draw Engine for RaffleForge
//!
//! Draws winners one at a time from a roster, without replacement, with a
//! timed spin presentation before each reveal.
//!
//! ## Features
//!
//! - **Pool Manager**: remaining participants derived from roster and ledger
//! - **Draw Engine**: Idle → Spinning → Settled state machine, one uniform pick per draw
//! - **Winner Ledger**: append-only, draw-ordered, snapshot on demand
//! - **Timing Profiles**: Normal, Turbo, Studio (instant) spin timing
//! - **Draw Session**: Tokio-driven settle timer with cancellation and event stream
//!
//! ## Architecture
//!
//! ```text
//! DrawSession
//!     │
//!     ├── DrawEngine
//!     │     ├── Roster (fixed)
//!     │     ├── WinnerLedger ──┐
//!     │     └── pool::remaining ◄┘
//!     │
//!     ├── settle timer (CancellationToken)
//!     └── broadcast → DrawEvent → presentation / FeedbackSink
//! ```

pub mod config;
pub mod engine;
pub mod event;
pub mod feedback;
pub mod ledger;
pub mod pool;
pub mod session;
pub mod spin;
pub mod timing;

pub use config::*;
pub use engine::*;
pub use event::*;
pub use feedback::*;
pub use ledger::*;
pub use pool::*;
pub use session::*;
pub use spin::*;
pub use timing::*;

pub use rf_core::{Participant, Roster};
