//! Draw Session Test Suite
//!
//! Drives the session on a paused Tokio clock. Covers:
//! - Spin timing and event order
//! - Re-entrant draw rejection
//! - Reset / teardown cancelling the settle timer
//! - Pool-of-one and exhausted-pool short circuits
//! - Feedback cues

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rf_draw::{
    DrawConfig, DrawEvent, DrawOutcome, DrawSession, DrawState, FeedbackSink, Participant, Roster,
    STATUS_AUTO_SELECTED, STATUS_EXHAUSTED, SpinTiming, TimingProfile,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;

// ═══════════════════════════════════════════════════════════════════════════════
// TEST FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

fn session(names: &[&str], profile: TimingProfile) -> DrawSession {
    let config = DrawConfig::studio(2024).with_profile(profile);
    DrawSession::new(Roster::from_names(names.iter().copied()), config)
}

/// Collect events up to and including the next winner reveal
async fn until_winner(rx: &mut broadcast::Receiver<DrawEvent>) -> Vec<DrawEvent> {
    let mut seen = Vec::new();
    loop {
        match rx.recv().await {
            Ok(event) => {
                let done = matches!(event, DrawEvent::WinnerRevealed { .. });
                seen.push(event);
                if done {
                    return seen;
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => return seen,
        }
    }
}

fn drain(rx: &mut broadcast::Receiver<DrawEvent>) -> Vec<DrawEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        seen.push(event);
    }
    seen
}

fn revealed(events: &[DrawEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, DrawEvent::WinnerRevealed { .. }))
        .count()
}

#[derive(Default)]
struct RecordingFeedback {
    cues: Mutex<Vec<String>>,
}

impl FeedbackSink for RecordingFeedback {
    fn spin_started(&self, pool_size: usize) {
        self.cues.lock().push(format!("start:{}", pool_size));
    }

    fn spin_stopped(&self) {
        self.cues.lock().push("stop".into());
    }

    fn winner_revealed(&self, winner: &Participant) {
        self.cues.lock().push(format!("win:{}", winner));
    }

    fn silence(&self) {
        self.cues.lock().push("silence".into());
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPIN LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_spin_settles_after_settle_delay() {
    let session = session(&["Ann", "Bo", "Cy"], TimingProfile::Normal);
    let mut rx = session.subscribe();
    let start = Instant::now();

    let DrawOutcome::Spinning(plan) = session.request_draw() else {
        panic!("expected a timed spin");
    };
    assert_eq!(plan.settle_delay(), SpinTiming::normal().settle_delay(3));
    assert_eq!(session.state(), DrawState::Spinning);

    let events = until_winner(&mut rx).await;
    assert!(start.elapsed() >= plan.settle_delay());

    assert_eq!(
        events.first(),
        Some(&DrawEvent::StateChanged {
            state: DrawState::Spinning
        })
    );
    assert!(matches!(events[1], DrawEvent::SpinStarted { pool_size: 3, .. }));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, DrawEvent::Candidate { .. }))
    );
    match events.last() {
        Some(DrawEvent::WinnerRevealed {
            winner,
            draw_order,
            auto_selected,
        }) => {
            assert_eq!(winner, &plan.winner);
            assert_eq!(*draw_order, 1);
            assert!(!auto_selected);
        }
        other => panic!("expected winner, got {:?}", other),
    }

    assert_eq!(session.state(), DrawState::Settled);
    assert_eq!(session.winners(), vec![plan.winner.clone()]);
    assert_eq!(session.remaining().len(), 2);
    assert_eq!(session.current_winner(), Some(plan.winner));
}

#[tokio::test(start_paused = true)]
async fn test_ledger_readable_mid_spin() {
    let session = session(&["Ann", "Bo", "Cy"], TimingProfile::Normal);

    let DrawOutcome::Spinning(plan) = session.request_draw() else {
        panic!("expected a timed spin");
    };

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(session.winners().is_empty());
    assert!(session.has_pending_spin());

    session.wait_settled().await;
    assert_eq!(session.winners(), vec![plan.winner]);
    assert!(!session.has_pending_spin());
}

#[tokio::test(start_paused = true)]
async fn test_double_request_single_spin() {
    let session = session(&["Ann", "Bo", "Cy"], TimingProfile::Turbo);
    let mut rx = session.subscribe();

    let first = session.request_draw();
    let second = session.request_draw();
    assert!(matches!(first, DrawOutcome::Spinning(_)));
    assert!(second.is_busy());

    let events = until_winner(&mut rx).await;
    let spin_starts = events
        .iter()
        .filter(|e| matches!(e, DrawEvent::SpinStarted { .. }))
        .count();
    let spinning_transitions = events
        .iter()
        .filter(|e| {
            **e == DrawEvent::StateChanged {
                state: DrawState::Spinning,
            }
        })
        .count();
    assert_eq!(spin_starts, 1);
    assert_eq!(spinning_transitions, 1);
    assert!(events.contains(&DrawEvent::DrawRejected));
    assert_eq!(revealed(&events), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(revealed(&drain(&mut rx)), 0);
    assert_eq!(session.winners().len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANCELLATION
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_reset_mid_spin_cancels_settle() {
    let session = session(&["Ann", "Bo", "Cy"], TimingProfile::Normal);
    let mut rx = session.subscribe();

    assert!(matches!(session.request_draw(), DrawOutcome::Spinning(_)));
    tokio::time::sleep(Duration::from_secs(1)).await;

    session.reset();
    assert_eq!(session.state(), DrawState::Idle);
    assert!(!session.has_pending_spin());

    tokio::time::sleep(Duration::from_secs(30)).await;
    let events = drain(&mut rx);
    assert_eq!(revealed(&events), 0);
    assert!(events.contains(&DrawEvent::Cleared));
    assert!(session.winners().is_empty());
    assert!(session.current_winner().is_none());

    // Engine accepts a fresh draw afterwards
    assert!(matches!(session.request_draw(), DrawOutcome::Spinning(_)));
}

#[tokio::test(start_paused = true)]
async fn test_close_mid_spin_never_settles() {
    let session = session(&["Ann", "Bo", "Cy"], TimingProfile::Normal);

    assert!(matches!(session.request_draw(), DrawOutcome::Spinning(_)));
    tokio::time::sleep(Duration::from_millis(500)).await;
    session.close();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(session.winners().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drop_mid_spin_cancels_timer() {
    let session = session(&["Ann", "Bo", "Cy"], TimingProfile::Normal);
    let mut rx = session.subscribe();

    assert!(matches!(session.request_draw(), DrawOutcome::Spinning(_)));
    drop(session);

    // Channel closes once the cancelled task releases its sender
    let events = until_winner(&mut rx).await;
    assert_eq!(revealed(&events), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unrepresentable_settle_delay_stays_resettable() {
    let mut config = DrawConfig::studio(1);
    config.timing = SpinTiming {
        lead_in_ms: 1e300,
        ..SpinTiming::normal()
    };
    let session = DrawSession::new(Roster::from_names(["Ann", "Bo", "Cy"]), config);

    assert!(matches!(session.request_draw(), DrawOutcome::Spinning(_)));
    tokio::time::sleep(Duration::from_secs(120)).await;

    // Timer task is still alive, waiting on a saturated deadline
    assert!(session.has_pending_spin());
    assert_eq!(session.state(), DrawState::Spinning);
    assert!(session.winners().is_empty());

    session.reset();
    assert_eq!(session.state(), DrawState::Idle);
    assert!(!session.has_pending_spin());
    assert!(matches!(session.request_draw(), DrawOutcome::Spinning(_)));
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHORT CIRCUITS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_single_participant_no_spin() {
    let session = session(&["Ann"], TimingProfile::Normal);
    let mut rx = session.subscribe();
    let start = Instant::now();

    match session.request_draw() {
        DrawOutcome::AutoSelected(winner) => assert_eq!(winner, "Ann"),
        other => panic!("expected auto-select, got {:?}", other),
    }
    assert_eq!(start.elapsed(), Duration::ZERO);

    let events = drain(&mut rx);
    assert!(!events.contains(&DrawEvent::StateChanged {
        state: DrawState::Spinning
    }));
    assert!(events.contains(&DrawEvent::WinnerRevealed {
        winner: "Ann".into(),
        draw_order: 1,
        auto_selected: true,
    }));
    assert!(events.contains(&DrawEvent::status(STATUS_AUTO_SELECTED)));
    assert_eq!(session.winners(), vec![Participant::from("Ann")]);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_pool_reports_status() {
    let session = session(&["Ann", "Bo"], TimingProfile::Studio);
    while !matches!(session.request_draw(), DrawOutcome::Exhausted) {
        session.wait_settled().await;
    }
    let mut rx = session.subscribe();
    let state = session.state();

    assert!(matches!(session.request_draw(), DrawOutcome::Exhausted));
    assert_eq!(session.state(), state);
    assert_eq!(drain(&mut rx), vec![DrawEvent::status(STATUS_EXHAUSTED)]);
    assert_eq!(session.winners().len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════════
// FULL SESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_full_roster_then_reset_and_redraw() {
    let names = ["Ann", "Bo", "Cy", "Di", "Ed", "Flo"];
    let session = session(&names, TimingProfile::Turbo);

    for round in 0..2 {
        for _ in 0..names.len() {
            assert!(!matches!(session.request_draw(), DrawOutcome::Exhausted));
            session.wait_settled().await;
        }
        let mut winners: Vec<String> = session
            .winners()
            .into_iter()
            .map(Participant::into_name)
            .collect();
        winners.sort();
        assert_eq!(winners, vec!["Ann", "Bo", "Cy", "Di", "Ed", "Flo"], "round {}", round);
        assert!(session.remaining().is_empty());

        session.reset();
    }
}

#[tokio::test(start_paused = true)]
async fn test_feedback_cues() {
    let feedback = Arc::new(RecordingFeedback::default());
    let session = session(&["Ann", "Bo"], TimingProfile::Turbo).with_feedback(feedback.clone());

    let DrawOutcome::Spinning(plan) = session.request_draw() else {
        panic!("expected a timed spin");
    };
    session.wait_settled().await;
    let DrawOutcome::AutoSelected(last) = session.request_draw() else {
        panic!("expected auto-select");
    };
    session.reset();

    let cues = feedback.cues.lock().clone();
    assert_eq!(
        cues,
        vec![
            "start:2".to_string(),
            "stop".to_string(),
            format!("win:{}", plan.winner),
            format!("win:{}", last),
            "silence".to_string(),
        ]
    );
}
