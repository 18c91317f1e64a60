use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A money value with its rounded display form (e.g. `$4,350.00`).
///
/// `value` keeps full precision; `display` is rounded half-up to cents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: Decimal,
    pub display: String,
}

/// Total for one named participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantTotal {
    pub name: String,
    pub total: Amount,
}

pub mod session {
    use super::*;

    /// A fresh form session. `form_key` starts at 0 and grows after every
    /// successful submission so clients can reset their inputs.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionCreated {
        pub session_id: String,
        pub form_key: u64,
    }
}

pub mod participants {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantsView {
        pub first: String,
        pub second: String,
    }
}

pub mod expense {
    use super::*;

    /// Request body for the expense form.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseNew {
        /// Category or item name.
        pub category: String,
        /// Optional free text appended to the category.
        pub details: Option<String>,
        /// Amount as typed, e.g. `12,50`. At most two decimals.
        pub amount: Option<String>,
        /// Payer name, must match one of the participants.
        pub payer: Option<String>,
        /// Defaults to today when missing.
        pub occurred_on: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: String,
        pub occurred_on: Option<NaiveDate>,
        pub label: String,
        pub amount: Amount,
        pub payer: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        /// Who pays, `None` when both are even.
        pub from: Option<String>,
        pub to: Option<String>,
        pub amount: Amount,
        /// Human readable summary, e.g. `Jonas owes Leandro $20.00`.
        pub summary: String,
    }

    /// The current round: active expenses newest first plus derived metrics.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
        pub total: Amount,
        pub per_payer: Vec<ParticipantTotal>,
        pub settlement: SettlementView,
        /// Set when the store could not be read; the lists are then empty.
        pub notice: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoundClosed {
        pub archived: usize,
    }
}

pub mod savings {
    use super::*;

    /// Request body for the savings form.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ContributionNew {
        /// Amount as typed, same rules as for expenses.
        pub amount: Option<String>,
        pub contributor: Option<String>,
        pub note: Option<String>,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub id: String,
        pub date: Option<NaiveDate>,
        pub note: String,
        pub amount: Amount,
        pub contributor: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SavingsResponse {
        pub contributions: Vec<ContributionView>,
        pub saved: Amount,
        pub goal: Amount,
        pub remaining: Amount,
        /// Share of the goal reached, between 0 and 1.
        pub fraction: Decimal,
        /// e.g. `3.3%`
        pub percent: String,
        pub per_contributor: Vec<ParticipantTotal>,
        pub notice: Option<String>,
    }
}

/// Returned by every successful create.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordCreated {
    pub id: String,
    /// The session's form key after the submission, when a session was sent.
    pub form_key: Option<u64>,
}

/// Error body of every failing request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Set for an interrupted round close.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<usize>,
}
