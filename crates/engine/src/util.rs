//! Internal helpers shared by the ledgers.
//!
//! These utilities are **not** part of the public API.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine};

/// Current calendar day in `timezone`.
pub(crate) fn today_in(timezone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&timezone).date_naive()
}

/// Trim a collection id and reject an empty one.
pub(crate) fn normalize_collection(value: Option<String>, label: &str) -> ResultEngine<String> {
    let trimmed = value.as_deref().map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(EngineError::validation(format!(
            "{label} collection id must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}
