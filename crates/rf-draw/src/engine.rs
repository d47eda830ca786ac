//! Draw Engine: selection state machine

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use rf_core::{Participant, RfResult, Roster};

use crate::config::DrawConfig;
use crate::ledger::WinnerLedger;
use crate::pool::{self, DuplicatePolicy};
use crate::spin::{SpinPlan, SpinTicket};
use crate::timing::{SpinTiming, TimingProfile};

pub const STATUS_EXHAUSTED: &str =
    "All participants have already been drawn. No more names left to draw.";
pub const STATUS_AUTO_SELECTED: &str =
    "Only one participant left. Automatically selected as the winner.";
pub const STATUS_READY: &str = "Ready to draw again!";

/// Engine state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawState {
    /// No draw in progress; the last winner, if any, is on display
    #[default]
    Idle,
    /// A draw is animating toward its committed winner
    Spinning,
    /// A winner was just committed. Accepts the next draw like `Idle`.
    Settled,
}

impl DrawState {
    /// Can a new draw start from this state?
    pub fn accepts_draw(&self) -> bool {
        !matches!(self, Self::Spinning)
    }
}

/// Result of `request_draw`
#[derive(Debug, Clone)]
pub enum DrawOutcome {
    /// A spin is already in flight; nothing changed
    Busy,
    /// No participants left; nothing changed
    Exhausted,
    /// Pool of one: committed without a spin
    AutoSelected(Participant),
    /// Timed spin started; settle with the plan's ticket
    Spinning(SpinPlan),
}

impl DrawOutcome {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Winner known at request time (committed or pending)
    pub fn winner(&self) -> Option<&Participant> {
        match self {
            Self::AutoSelected(w) => Some(w),
            Self::Spinning(plan) => Some(&plan.winner),
            Self::Busy | Self::Exhausted => None,
        }
    }
}

/// Session counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawStats {
    pub requests: u64,
    pub spins: u64,
    pub auto_selected: u64,
    pub rejected: u64,
    pub exhausted: u64,
    pub stale_settles: u64,
    pub resets: u64,
}

#[derive(Debug, Clone)]
struct PendingSpin {
    ticket: SpinTicket,
    winner: Participant,
}

/// Draw Engine
///
/// Owns the roster, the winners ledger and the session state. Selection is
/// committed once per draw at request time; `settle` only publishes it.
pub struct DrawEngine {
    config: DrawConfig,
    roster: Roster,
    ledger: WinnerLedger,
    state: DrawState,
    current_winner: Option<Participant>,
    status: Option<String>,
    rng: StdRng,
    next_ticket: u64,
    pending: Option<PendingSpin>,
    stats: DrawStats,
}

impl DrawEngine {
    /// Create an engine with default config
    pub fn new(roster: Roster) -> Self {
        Self::with_config(roster, DrawConfig::default())
    }

    pub fn with_config(roster: Roster, config: DrawConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        if roster.has_duplicates() {
            log::warn!(
                "[DrawEngine] Roster has duplicate names ({} entries, {} distinct), policy: {}",
                roster.len(),
                roster.distinct_count(),
                config.duplicate_policy
            );
        }

        Self {
            config,
            roster,
            ledger: WinnerLedger::new(),
            state: DrawState::Idle,
            current_winner: None,
            status: None,
            rng,
            next_ticket: 0,
            pending: None,
            stats: DrawStats::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Seed RNG for reproducible draws
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.config.seed = Some(seed);
    }

    /// Applies to the next spin; an in-flight spin keeps its plan.
    /// Invalid timing is rejected and the current timing kept.
    pub fn set_timing(&mut self, timing: SpinTiming) -> RfResult<()> {
        timing.validate()?;
        self.config.timing = timing;
        Ok(())
    }

    pub fn set_timing_profile(&mut self, profile: TimingProfile) {
        self.config.timing = SpinTiming::from_profile(profile);
    }

    pub fn set_duplicate_policy(&mut self, policy: DuplicatePolicy) {
        self.config.duplicate_policy = policy;
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn timing(&self) -> &SpinTiming {
        &self.config.timing
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READ ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn is_spinning(&self) -> bool {
        self.state == DrawState::Spinning
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ledger(&self) -> &WinnerLedger {
        &self.ledger
    }

    /// Winners in draw order. Excludes an in-flight, not yet settled winner.
    pub fn winners(&self) -> Vec<Participant> {
        self.ledger.snapshot()
    }

    /// Current remaining pool, recomputed from the roster and ledger
    pub fn remaining(&self) -> Vec<Participant> {
        pool::remaining(
            self.roster.entries(),
            self.ledger.as_slice(),
            self.config.duplicate_policy,
        )
    }

    /// Winner on display
    pub fn current_winner(&self) -> Option<&Participant> {
        self.current_winner.as_ref()
    }

    /// Last user-facing status message
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn stats(&self) -> &DrawStats {
        &self.stats
    }

    /// Ticket of the in-flight spin
    pub fn pending_ticket(&self) -> Option<SpinTicket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMMANDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a draw.
    ///
    /// Never fails: a busy engine or an exhausted pool is reported through
    /// the outcome and leaves the engine untouched.
    pub fn request_draw(&mut self) -> DrawOutcome {
        self.stats.requests += 1;

        if !self.state.accepts_draw() {
            self.stats.rejected += 1;
            log::debug!("[DrawEngine] Draw rejected, spin in flight");
            return DrawOutcome::Busy;
        }

        let pool = self.remaining();

        match pool.len() {
            0 => {
                self.stats.exhausted += 1;
                self.status = Some(STATUS_EXHAUSTED.to_string());
                log::info!("[DrawEngine] No participants left to draw");
                DrawOutcome::Exhausted
            }
            1 => {
                let winner = pool[0].clone();
                self.commit(winner.clone());
                self.stats.auto_selected += 1;
                self.status = Some(STATUS_AUTO_SELECTED.to_string());
                log::info!("[DrawEngine] Single participant auto-selected: {}", winner);
                DrawOutcome::AutoSelected(winner)
            }
            count => {
                let winner_index = self.rng.random_range(0..count);
                let winner = pool[winner_index].clone();
                let timing = self.config.timing.clone();
                let spin_ms = timing.spin_duration_ms(count);

                self.next_ticket += 1;
                let ticket = SpinTicket(self.next_ticket);
                self.pending = Some(PendingSpin {
                    ticket,
                    winner: winner.clone(),
                });
                self.state = DrawState::Spinning;
                self.status = None;
                self.stats.spins += 1;

                log::debug!(
                    "[DrawEngine] Spin {:?} over {} candidates, settle in {:.0}ms",
                    ticket,
                    count,
                    timing.lead_in_ms + spin_ms
                );

                DrawOutcome::Spinning(SpinPlan {
                    ticket,
                    pool,
                    winner_index,
                    winner,
                    timing,
                    spin_ms,
                })
            }
        }
    }

    /// Commit the winner of an in-flight spin.
    ///
    /// Returns `None` for a stale or unknown ticket (spin was reset).
    pub fn settle(&mut self, ticket: SpinTicket) -> Option<Participant> {
        match self.pending.take() {
            Some(pending) if pending.ticket == ticket => {
                self.commit(pending.winner.clone());
                log::info!(
                    "[DrawEngine] Winner #{}: {}",
                    self.ledger.len(),
                    pending.winner
                );
                Some(pending.winner)
            }
            other => {
                self.pending = other;
                self.stats.stale_settles += 1;
                log::debug!("[DrawEngine] Ignoring stale settle {:?}", ticket);
                None
            }
        }
    }

    /// Clear the ledger and the displayed winner; cancels any in-flight spin.
    pub fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::debug!("[DrawEngine] Reset cancels spin {:?}", pending.ticket);
        }
        self.ledger.clear();
        self.current_winner = None;
        self.state = DrawState::Idle;
        self.status = Some(STATUS_READY.to_string());
        self.stats.resets += 1;
        log::info!("[DrawEngine] Winners cleared");
    }

    fn commit(&mut self, winner: Participant) {
        self.ledger.append(winner.clone());
        self.current_winner = Some(winner);
        self.state = DrawState::Settled;
    }
}
