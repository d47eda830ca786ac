//! Remaining pool derivation

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use rf_core::Participant;
use serde::{Deserialize, Serialize};

/// How a drawn name is excluded when the roster holds the same name twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Drawing a name removes every roster slot carrying that name
    #[default]
    RemoveAll,
    /// Drawing a name removes one roster slot per ledger entry
    RemoveOne,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoveAll => "remove-all",
            Self::RemoveOne => "remove-one",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "remove-all" | "all" => Ok(Self::RemoveAll),
            "remove-one" | "one" => Ok(Self::RemoveOne),
            other => Err(format!("unknown duplicate policy: {}", other)),
        }
    }
}

/// Roster entries not yet drawn, in roster order.
///
/// Pure function of its inputs. An empty result is a valid answer.
pub fn remaining(
    roster: &[Participant],
    winners: &[Participant],
    policy: DuplicatePolicy,
) -> Vec<Participant> {
    if winners.is_empty() {
        return roster.to_vec();
    }

    match policy {
        DuplicatePolicy::RemoveAll => {
            let drawn: HashSet<&str> = winners.iter().map(Participant::name).collect();
            roster
                .iter()
                .filter(|p| !drawn.contains(p.name()))
                .cloned()
                .collect()
        }
        DuplicatePolicy::RemoveOne => {
            let mut drawn: HashMap<&str, usize> = HashMap::with_capacity(winners.len());
            for w in winners {
                *drawn.entry(w.name()).or_insert(0) += 1;
            }
            roster
                .iter()
                .filter(|p| match drawn.get_mut(p.name()) {
                    Some(count) if *count > 0 => {
                        *count -= 1;
                        false
                    }
                    _ => true,
                })
                .cloned()
                .collect()
        }
    }
}
