//! Spin plan and candidate frame generation

use std::time::Duration;

use rf_core::Participant;
use serde::{Deserialize, Serialize};

use crate::timing::{FrameClock, SpinTiming, ms_to_duration};

/// Identifies one in-flight spin. A ticket settles at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpinTicket(pub u64);

/// Everything the presentation needs to animate a spin toward its committed winner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinPlan {
    /// Ticket to hand back on settle
    pub ticket: SpinTicket,
    /// Remaining pool at request time, in roster order
    pub pool: Vec<Participant>,
    /// Index of the winner within `pool`
    pub winner_index: usize,
    /// Committed winner
    pub winner: Participant,
    /// Timing snapshot used for this spin
    pub timing: SpinTiming,
    /// Stop animation length (ms)
    pub spin_ms: f64,
}

/// A name shown while the reel is moving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFrame {
    /// Offset from the draw request (ms)
    pub offset_ms: f64,
    pub participant: Participant,
    /// Last frame; shows the winner at the settle offset
    pub settles: bool,
}

impl SpinPlan {
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Time from request to settle
    pub fn settle_delay_ms(&self) -> f64 {
        self.timing.lead_in_ms + self.spin_ms
    }

    pub fn settle_delay(&self) -> Duration {
        ms_to_duration(self.settle_delay_ms())
    }

    /// Reel strip: the pool repeated once per spin round plus the landing pass
    pub fn reel_strip(&self) -> Vec<Participant> {
        let copies = self.timing.spin_rounds as usize + 1;
        let mut strip = Vec::with_capacity(self.pool.len() * copies);
        for _ in 0..copies {
            strip.extend(self.pool.iter().cloned());
        }
        strip
    }

    /// Strip slot the reel stops on
    pub fn landing_slot(&self) -> usize {
        self.pool.len() * self.timing.spin_rounds as usize + self.winner_index
    }

    /// Name cycling sequence ending on the winner.
    ///
    /// The sequence walks the pool in order; its starting point is chosen so
    /// the settle frame lands exactly on `winner_index`.
    pub fn candidate_frames(&self) -> Vec<CandidateFrame> {
        let mut clock = FrameClock::new(&self.timing, self.spin_ms);
        let offsets = clock.offsets();
        let n = self.pool.len();

        let mut frames = Vec::with_capacity(offsets.len() + 1);
        if n > 0 {
            let steps = offsets.len() % n;
            let start = (self.winner_index + n - steps) % n;
            for (i, offset_ms) in offsets.into_iter().enumerate() {
                frames.push(CandidateFrame {
                    offset_ms,
                    participant: self.pool[(start + i) % n].clone(),
                    settles: false,
                });
            }
        }
        frames.push(CandidateFrame {
            offset_ms: clock.total(),
            participant: self.winner.clone(),
            settles: true,
        });
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(timing: SpinTiming, winner_index: usize) -> SpinPlan {
        let pool: Vec<Participant> = ["Ann", "Bo", "Cy"].iter().map(|&n| n.into()).collect();
        let spin_ms = timing.spin_duration_ms(pool.len());
        SpinPlan {
            ticket: SpinTicket(1),
            winner: pool[winner_index].clone(),
            pool,
            winner_index,
            timing,
            spin_ms,
        }
    }

    #[test]
    fn test_landing_slot() {
        let p = plan(SpinTiming::normal(), 1);
        let strip = p.reel_strip();
        assert_eq!(strip.len(), 9);
        assert_eq!(p.landing_slot(), 7);
        assert_eq!(strip[p.landing_slot()], p.winner);
    }

    #[test]
    fn test_frames_end_on_winner() {
        for idx in 0..3 {
            let p = plan(SpinTiming::normal(), idx);
            let frames = p.candidate_frames();
            let last = frames.last().unwrap();
            assert!(last.settles);
            assert_eq!(last.participant, p.winner);
            assert_eq!(last.offset_ms, p.settle_delay_ms());

            // Consecutive frames walk the pool in order up to the winner
            let before = &frames[frames.len() - 2];
            assert_eq!(before.participant, p.pool[(idx + 2) % 3]);
            assert_eq!(frames.iter().filter(|f| f.settles).count(), 1);
        }
    }

    #[test]
    fn test_studio_single_settle_frame() {
        let p = plan(SpinTiming::studio(), 2);
        let frames = p.candidate_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].offset_ms, 0.0);
        assert_eq!(frames[0].participant, "Cy");
    }
}
