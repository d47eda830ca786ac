//! Winners ledger

use rf_core::Participant;
use serde::{Deserialize, Serialize};

/// Winners in draw order, oldest first. Append-only until cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WinnerLedger {
    entries: Vec<Participant>,
}

impl WinnerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a winner. Returns its 1-based draw order.
    pub fn append(&mut self, winner: Participant) -> usize {
        self.entries.push(winner);
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Owned copy of the ledger, safe to hand to exporters
    pub fn snapshot(&self) -> Vec<Participant> {
        self.entries.clone()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Participant] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent winner
    pub fn last(&self) -> Option<&Participant> {
        self.entries.last()
    }
}
