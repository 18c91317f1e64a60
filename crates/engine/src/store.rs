//! The seam between the ledger and the remote document database.
//!
//! A store is an unordered collection of pages per collection id. Each page
//! carries typed properties. The ledger only needs three calls: create one
//! page, query a whole collection, and update a page's properties.
use core::fmt;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::StoreError;

pub mod memory;

/// Opaque identifier assigned by the store at creation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed property value, mirroring the database column kinds we use.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Title(String),
    Text(String),
    Number(Option<Decimal>),
    Select(Option<String>),
    Checkbox(bool),
    Date(Option<NaiveDate>),
}

pub type Properties = BTreeMap<String, PropertyValue>;

/// A page as returned by a collection query.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteRecord {
    pub id: RecordId,
    pub properties: Properties,
}

impl RemoteRecord {
    /// Non-empty title or rich-text content of `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.properties.get(name)? {
            PropertyValue::Title(text) | PropertyValue::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then_some(text)
            }
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<Decimal> {
        match self.properties.get(name)? {
            PropertyValue::Number(value) => *value,
            _ => None,
        }
    }

    pub fn select(&self, name: &str) -> Option<&str> {
        match self.properties.get(name)? {
            PropertyValue::Select(value) => value.as_deref(),
            _ => None,
        }
    }

    pub fn checkbox(&self, name: &str) -> Option<bool> {
        match self.properties.get(name)? {
            PropertyValue::Checkbox(value) => Some(*value),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.properties.get(name)? {
            PropertyValue::Date(value) => *value,
            _ => None,
        }
    }
}

/// Server-side query filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    CheckboxEquals { property: String, value: bool },
}

impl Filter {
    /// Evaluate the filter locally. A missing checkbox counts as unchecked.
    pub fn matches(&self, record: &RemoteRecord) -> bool {
        match self {
            Filter::CheckboxEquals { property, value } => {
                record.checkbox(property).unwrap_or(false) == *value
            }
        }
    }
}

/// Remote record API used by the ledgers.
///
/// Implementations must map every transport, auth or schema failure to a
/// [`StoreError`] and bound each request in time.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create one page in `collection`, returning its id.
    async fn create_record(
        &self,
        collection: &str,
        properties: Properties,
    ) -> Result<RecordId, StoreError>;

    /// Fetch every page of `collection`, optionally filtered by the store.
    async fn query_all(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<RemoteRecord>, StoreError>;

    /// Overwrite the given properties of an existing page.
    async fn update_record(&self, id: &RecordId, properties: Properties)
    -> Result<(), StoreError>;
}
