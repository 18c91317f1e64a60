//! Contributions toward the shared savings fund.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, LedgerEntry, Money, Participant, Participants, PropertyValue, Properties,
    RecordId, RemoteRecord, ResultEngine,
};

const DEFAULT_NOTE: &str = "Contribution";

/// Property names of the savings collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContributionSchema {
    pub note: String,
    pub amount: String,
    pub contributor: String,
    pub date: String,
}

impl Default for ContributionSchema {
    fn default() -> Self {
        Self {
            note: "Note".to_string(),
            amount: "Amount".to_string(),
            contributor: "Who".to_string(),
            date: "Date".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: RecordId,
    pub note: String,
    pub amount: Money,
    pub contributor: Option<Participant>,
    pub date: Option<NaiveDate>,
}

impl LedgerEntry for Contribution {
    fn amount(&self) -> Money {
        self.amount
    }

    fn participant(&self) -> Option<Participant> {
        self.contributor
    }
}

impl Contribution {
    pub(crate) fn from_remote(
        record: RemoteRecord,
        schema: &ContributionSchema,
        participants: &Participants,
    ) -> Self {
        let note = record.text(&schema.note).unwrap_or_default().to_string();
        let amount = record
            .number(&schema.amount)
            .map(Money::new)
            .filter(|money| !money.amount().is_sign_negative() && money.within_limit());
        let contributor = record
            .select(&schema.contributor)
            .and_then(|name| participants.resolve(name));

        if amount.is_none() || contributor.is_none() {
            tracing::warn!(
                record = %record.id,
                amount = amount.is_some(),
                contributor = contributor.is_some(),
                "malformed contribution record, using defaults"
            );
        }

        Self {
            note,
            amount: amount.unwrap_or(Money::ZERO),
            contributor,
            date: record.date(&schema.date),
            id: record.id,
        }
    }
}

/// Validated input for a new contribution.
#[derive(Clone, Debug, PartialEq)]
pub struct ContributionDraft {
    note: String,
    amount: Money,
    contributor: Participant,
    date: Option<NaiveDate>,
}

impl ContributionDraft {
    /// The note is optional and falls back to `Contribution`.
    pub fn new(
        note: Option<&str>,
        amount: Money,
        contributor: Option<Participant>,
        date: Option<NaiveDate>,
    ) -> ResultEngine<Self> {
        let amount = amount.validate_input()?;
        let contributor =
            contributor.ok_or_else(|| EngineError::validation("contributor must be selected"))?;
        let note = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NOTE);
        Ok(Self {
            note: note.to_string(),
            amount,
            contributor,
            date,
        })
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub(crate) fn into_properties(
        self,
        schema: &ContributionSchema,
        participants: &Participants,
        today: NaiveDate,
    ) -> Properties {
        Properties::from([
            (schema.note.clone(), PropertyValue::Title(self.note)),
            (
                schema.amount.clone(),
                PropertyValue::Number(Some(self.amount.amount())),
            ),
            (
                schema.contributor.clone(),
                PropertyValue::Select(Some(participants.name(self.contributor).to_string())),
            ),
            (
                schema.date.clone(),
                PropertyValue::Date(Some(self.date.unwrap_or(today))),
            ),
        ])
    }
}
