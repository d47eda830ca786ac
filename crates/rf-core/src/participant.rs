//! Participant and roster types

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::{RfError, RfResult};

/// A raffle participant, identified only by its display name.
///
/// Names are not unique. Two participants with the same name compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Participant(String);

impl Participant {
    /// Create a participant from a display name.
    ///
    /// The name is trimmed; a blank name is rejected.
    pub fn new(name: impl Into<String>) -> RfResult<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RfError::InvalidName(name));
        }
        if trimmed.len() == name.len() {
            Ok(Self(name))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Display name
    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn into_name(self) -> String {
        self.0
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for Participant {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Participant {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unchecked conversion for literals (no trimming, no validation)
impl From<&str> for Participant {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Participant {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for Participant {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Participant {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Ordered participant list, fixed for the lifetime of a draw session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    entries: Vec<Participant>,
}

impl Roster {
    pub fn new(entries: Vec<Participant>) -> Self {
        Self { entries }
    }

    /// Build from display names, skipping blank entries
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names
            .into_iter()
            .filter_map(|n| Participant::new(n).ok())
            .collect();
        Self { entries }
    }

    /// Participants in roster order
    #[inline]
    pub fn entries(&self) -> &[Participant] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct names (duplicates collapse)
    pub fn distinct_count(&self) -> usize {
        let mut names: Vec<&str> = self.entries.iter().map(Participant::name).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    pub fn has_duplicates(&self) -> bool {
        self.distinct_count() != self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Participant> {
        self.entries.iter()
    }
}

impl From<Vec<Participant>> for Roster {
    fn from(entries: Vec<Participant>) -> Self {
        Self::new(entries)
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Participant;
    type IntoIter = std::slice::Iter<'a, Participant>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
