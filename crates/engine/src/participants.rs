//! The two people sharing the ledger.
//!
//! The set of identities is closed: there is always a [`Participant::First`]
//! and a [`Participant::Second`]. Their display names come from
//! configuration and are what the record store keeps in its select field.
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// One of the two identities of the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Participant {
    First,
    Second,
}

impl Participant {
    pub const ALL: [Participant; 2] = [Participant::First, Participant::Second];

    /// The other half of the pair.
    #[must_use]
    pub const fn other(self) -> Participant {
        match self {
            Participant::First => Participant::Second,
            Participant::Second => Participant::First,
        }
    }
}

/// Display names for the two participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    first: String,
    second: String,
}

impl Participants {
    /// Builds the roster, rejecting empty or identical names.
    pub fn new(first: &str, second: &str) -> ResultEngine<Self> {
        let first = first.trim();
        let second = second.trim();
        if first.is_empty() || second.is_empty() {
            return Err(EngineError::validation("participant names must not be empty"));
        }
        if first.eq_ignore_ascii_case(second) {
            return Err(EngineError::validation(format!(
                "participant names must differ, got '{first}' twice"
            )));
        }
        Ok(Self {
            first: first.to_string(),
            second: second.to_string(),
        })
    }

    #[must_use]
    pub fn name(&self, participant: Participant) -> &str {
        match participant {
            Participant::First => &self.first,
            Participant::Second => &self.second,
        }
    }

    /// Name for an optional payer, `Unknown` when missing.
    #[must_use]
    pub fn label(&self, participant: Option<Participant>) -> &str {
        participant.map_or("Unknown", |p| self.name(p))
    }

    /// Resolve a stored select value to a participant (case-insensitive).
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Participant> {
        let name = name.trim();
        Participant::ALL
            .into_iter()
            .find(|p| self.name(*p).eq_ignore_ascii_case(name))
    }

    /// Like [`resolve`](Self::resolve), but fails with a validation error.
    pub fn require(&self, name: &str) -> ResultEngine<Participant> {
        self.resolve(name).ok_or_else(|| {
            EngineError::validation(format!(
                "payer must be one of '{}' or '{}'",
                self.first, self.second
            ))
        })
    }
}

impl fmt::Display for Participants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Participants {
        Participants::new("Leandro", "Jonas").unwrap()
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let pair = pair();
        assert_eq!(pair.resolve("leandro"), Some(Participant::First));
        assert_eq!(pair.resolve(" Jonas "), Some(Participant::Second));
        assert_eq!(pair.resolve("Partner"), None);
    }

    #[test]
    fn require_reports_allowed_names() {
        let err = pair().require("").unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("payer must be one of 'Leandro' or 'Jonas'".to_string())
        );
    }

    #[test]
    fn roster_rejects_duplicates_and_blanks() {
        assert!(Participants::new("Leandro", "leandro").is_err());
        assert!(Participants::new(" ", "Jonas").is_err());
    }

    #[test]
    fn label_defaults_to_unknown() {
        let pair = pair();
        assert_eq!(pair.label(None), "Unknown");
        assert_eq!(pair.label(Some(Participant::Second)), "Jonas");
    }
}
