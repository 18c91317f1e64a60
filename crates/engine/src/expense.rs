//! The module contains the `Expense` type and its mapping to store pages.
//!
//! Reading is lenient: a page missing a field is defaulted and logged, never
//! rejected. Writing goes through [`ExpenseDraft`], which is strict.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, LedgerEntry, Money, Participant, Participants, PropertyValue, Properties,
    RecordId, RemoteRecord, ResultEngine,
};

pub(crate) const UNTITLED: &str = "Untitled";

/// Property names of the expenses collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseSchema {
    pub label: String,
    pub amount: String,
    pub payer: String,
    pub date: String,
    pub archived: String,
}

impl Default for ExpenseSchema {
    fn default() -> Self {
        Self {
            label: "Name".to_string(),
            amount: "Cost".to_string(),
            payer: "Who".to_string(),
            date: "Date".to_string(),
            archived: "Archived".to_string(),
        }
    }
}

/// An expense as read back from the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: RecordId,
    pub label: String,
    pub amount: Money,
    /// `None` when the stored payer is missing or not one of the pair.
    pub payer: Option<Participant>,
    pub occurred_on: Option<NaiveDate>,
    pub archived: bool,
}

impl LedgerEntry for Expense {
    fn amount(&self) -> Money {
        self.amount
    }

    fn participant(&self) -> Option<Participant> {
        self.payer
    }
}

impl Expense {
    /// Decode a page, defaulting every missing field.
    pub(crate) fn from_remote(
        record: RemoteRecord,
        schema: &ExpenseSchema,
        participants: &Participants,
    ) -> Self {
        let mut missing = Vec::new();

        let label = match record.text(&schema.label) {
            Some(label) => label.to_string(),
            None => {
                missing.push("label");
                UNTITLED.to_string()
            }
        };
        let amount = match record.number(&schema.amount) {
            Some(value) if value.is_sign_negative() || !Money::new(value).within_limit() => {
                missing.push("amount");
                Money::ZERO
            }
            Some(value) => Money::new(value),
            None => {
                missing.push("amount");
                Money::ZERO
            }
        };
        let payer = match record.select(&schema.payer) {
            Some(name) => {
                let resolved = participants.resolve(name);
                if resolved.is_none() {
                    tracing::warn!(record = %record.id, payer = name, "unknown payer on expense");
                }
                resolved
            }
            None => {
                missing.push("payer");
                None
            }
        };
        let occurred_on = record.date(&schema.date);
        let archived = record.checkbox(&schema.archived).unwrap_or(false);

        if !missing.is_empty() {
            tracing::warn!(
                record = %record.id,
                fields = ?missing,
                "malformed expense record, using defaults"
            );
        }

        Self {
            id: record.id,
            label,
            amount,
            payer,
            occurred_on,
            archived,
        }
    }
}

/// Validated input for a new expense.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseDraft {
    label: String,
    amount: Money,
    payer: Participant,
    occurred_on: Option<NaiveDate>,
}

impl ExpenseDraft {
    /// Check the creation preconditions: non-empty label, positive amount
    /// and a payer.
    pub fn new(
        label: &str,
        amount: Money,
        payer: Option<Participant>,
        occurred_on: Option<NaiveDate>,
    ) -> ResultEngine<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(EngineError::validation("label must not be empty"));
        }
        let amount = amount.validate_input()?;
        let payer = payer.ok_or_else(|| EngineError::validation("payer must be selected"))?;
        Ok(Self {
            label: label.to_string(),
            amount,
            payer,
            occurred_on,
        })
    }

    /// Build the label from a category and optional details,
    /// e.g. `Groceries - Lidl`.
    pub fn compose_label(category: &str, details: Option<&str>) -> ResultEngine<String> {
        let category = category.trim();
        if category.is_empty() {
            return Err(EngineError::validation("category must be selected"));
        }
        match details.map(str::trim).filter(|d| !d.is_empty()) {
            Some(details) => Ok(format!("{category} - {details}")),
            None => Ok(category.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn payer(&self) -> Participant {
        self.payer
    }

    pub(crate) fn into_properties(
        self,
        schema: &ExpenseSchema,
        participants: &Participants,
        today: NaiveDate,
    ) -> Properties {
        Properties::from([
            (schema.label.clone(), PropertyValue::Title(self.label)),
            (
                schema.amount.clone(),
                PropertyValue::Number(Some(self.amount.amount())),
            ),
            (
                schema.payer.clone(),
                PropertyValue::Select(Some(participants.name(self.payer).to_string())),
            ),
            (
                schema.date.clone(),
                PropertyValue::Date(Some(self.occurred_on.unwrap_or(today))),
            ),
            (schema.archived.clone(), PropertyValue::Checkbox(false)),
        ])
    }
}

/// Orders expenses newest first; undated rows go last.
pub fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.occurred_on.cmp(&a.occurred_on));
}
