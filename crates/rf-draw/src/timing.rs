//! Timing profiles for the spin presentation

use std::time::Duration;

use rf_core::{RfError, RfResult};
use serde::{Deserialize, Serialize};

/// Upper bound on generated candidate frames per spin
const MAX_CANDIDATE_FRAMES: usize = 512;

/// Growth of the candidate interval per frame while the spin slows down
const DECELERATION: f64 = 1.12;

/// Longest accepted value for any single timing field (one hour)
pub const MAX_TIMING_MS: f64 = 3_600_000.0;

/// Most passes over the pool a reel strip may hold
pub const MAX_SPIN_ROUNDS: u32 = 16;

/// Timing profile for the spin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingProfile {
    /// Stage presentation timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// Instant settle (tests, headless runs)
    Studio,
    /// User supplied values
    Custom,
}

impl std::str::FromStr for TimingProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "turbo" => Ok(Self::Turbo),
            "studio" | "instant" => Ok(Self::Studio),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown timing profile: {}", other)),
        }
    }
}

/// Detailed spin timing configuration (all durations in ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Free-running spin before the stop animation begins
    pub lead_in_ms: f64,

    /// Floor of the stop animation
    pub min_spin_ms: f64,

    /// Cap of the stop animation
    pub max_spin_ms: f64,

    /// Stop animation time contributed by each remaining participant
    pub per_participant_ms: f64,

    /// Interval between candidate names at full speed
    pub candidate_tick_ms: f64,

    /// Full passes over the pool before the reel lands
    pub spin_rounds: u32,
}

impl SpinTiming {
    /// Stage timing: 3 s free spin, then 6–10 s stop at 0.3 s per participant
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            lead_in_ms: 3000.0,
            min_spin_ms: 6000.0,
            max_spin_ms: 10000.0,
            per_participant_ms: 300.0,
            candidate_tick_ms: 80.0,
            spin_rounds: 2,
        }
    }

    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            lead_in_ms: 1000.0,
            min_spin_ms: 2000.0,
            max_spin_ms: 4000.0,
            per_participant_ms: 100.0,
            candidate_tick_ms: 50.0,
            spin_rounds: 1,
        }
    }

    /// Settles immediately, no candidate frames
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            lead_in_ms: 0.0,
            min_spin_ms: 0.0,
            max_spin_ms: 0.0,
            per_participant_ms: 0.0,
            candidate_tick_ms: 0.0,
            spin_rounds: 0,
        }
    }

    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self {
                profile: TimingProfile::Custom,
                ..Self::normal()
            },
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            lead_in_ms: self.lead_in_ms * factor,
            min_spin_ms: self.min_spin_ms * factor,
            max_spin_ms: self.max_spin_ms * factor,
            per_participant_ms: self.per_participant_ms * factor,
            candidate_tick_ms: self.candidate_tick_ms * factor,
            spin_rounds: self.spin_rounds,
        }
    }

    /// Reject negative, non-finite, oversized or inverted bounds
    pub fn validate(&self) -> RfResult<()> {
        let fields = [
            ("lead_in_ms", self.lead_in_ms),
            ("min_spin_ms", self.min_spin_ms),
            ("max_spin_ms", self.max_spin_ms),
            ("per_participant_ms", self.per_participant_ms),
            ("candidate_tick_ms", self.candidate_tick_ms),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(RfError::InvalidParam(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
            if value > MAX_TIMING_MS {
                return Err(RfError::InvalidParam(format!(
                    "{} must not exceed {} ms, got {}",
                    name, MAX_TIMING_MS, value
                )));
            }
        }
        if self.spin_rounds > MAX_SPIN_ROUNDS {
            return Err(RfError::InvalidParam(format!(
                "spin_rounds must not exceed {}, got {}",
                MAX_SPIN_ROUNDS, self.spin_rounds
            )));
        }
        if self.min_spin_ms > self.max_spin_ms {
            return Err(RfError::InvalidParam(format!(
                "min_spin_ms ({}) exceeds max_spin_ms ({})",
                self.min_spin_ms, self.max_spin_ms
            )));
        }
        Ok(())
    }

    /// Stop animation length for a pool of `remaining` participants.
    ///
    /// Non-decreasing in `remaining`, floored at `min_spin_ms`, capped at `max_spin_ms`.
    pub fn spin_duration_ms(&self, remaining: usize) -> f64 {
        (remaining as f64 * self.per_participant_ms)
            .max(self.min_spin_ms)
            .min(self.max_spin_ms)
    }

    /// Time from draw request to settle
    pub fn settle_delay_ms(&self, remaining: usize) -> f64 {
        self.lead_in_ms + self.spin_duration_ms(remaining)
    }

    pub fn settle_delay(&self, remaining: usize) -> Duration {
        ms_to_duration(self.settle_delay_ms(remaining))
    }

    /// Pool size at which the cap is reached
    pub fn cap_threshold(&self) -> Option<usize> {
        if self.per_participant_ms <= 0.0 {
            return None;
        }
        Some((self.max_spin_ms / self.per_participant_ms).ceil() as usize)
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}

/// Convert a millisecond value into a `Duration`.
///
/// Negative and NaN values become zero; values too large to represent
/// saturate at `Duration::MAX`.
pub fn ms_to_duration(ms: f64) -> Duration {
    if ms.is_nan() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}

/// Offset generator for candidate frames during a spin
#[derive(Debug, Clone)]
pub struct FrameClock {
    current_ms: f64,
    interval_ms: f64,
    lead_in_ms: f64,
    total_ms: f64,
}

impl FrameClock {
    pub fn new(timing: &SpinTiming, spin_ms: f64) -> Self {
        Self {
            current_ms: 0.0,
            interval_ms: timing.candidate_tick_ms,
            lead_in_ms: timing.lead_in_ms,
            total_ms: timing.lead_in_ms + spin_ms,
        }
    }

    pub fn current(&self) -> f64 {
        self.current_ms
    }

    /// Settle offset
    pub fn total(&self) -> f64 {
        self.total_ms
    }

    /// Offsets of every intermediate frame, strictly before the settle offset.
    ///
    /// Constant interval during the lead-in, then each interval grows so the
    /// names slow down toward the landing.
    pub fn offsets(&mut self) -> Vec<f64> {
        let mut offsets = Vec::new();
        if self.interval_ms <= 0.0 {
            return offsets;
        }

        while offsets.len() < MAX_CANDIDATE_FRAMES {
            if self.current_ms >= self.lead_in_ms {
                self.interval_ms *= DECELERATION;
            }
            let next = self.current_ms + self.interval_ms;
            if next >= self.total_ms {
                break;
            }
            self.current_ms = next;
            offsets.push(next);
        }
        offsets
    }
}
