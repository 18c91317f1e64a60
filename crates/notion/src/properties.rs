//! Conversion between engine property values and Notion's JSON shapes.
//!
//! Notion tags every property object with a `type` field. Kinds the ledger
//! does not use are decoded as `Unsupported` and dropped.
use std::str::FromStr;

use chrono::NaiveDate;
use engine::{Properties, PropertyValue, RecordId, RemoteRecord};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Deserialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RichText {
    plain_text: Option<String>,
    text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct SelectOption {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DateValue {
    start: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawProperty {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Number { number: Option<serde_json::Number> },
    Select { select: Option<SelectOption> },
    Checkbox { checkbox: bool },
    Date { date: Option<DateValue> },
    #[serde(other)]
    Unsupported,
}

fn join_text(parts: Vec<RichText>) -> String {
    parts
        .into_iter()
        .filter_map(|part| part.plain_text.or(part.text.map(|t| t.content)))
        .collect()
}

/// Parse a JSON number through its textual form, keeping it exact.
fn decimal_from_number(number: &serde_json::Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Day part of an ISO date or datetime (`2025-06-01T10:00:00+02:00`).
fn day_from_iso(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn decode_property(page_id: &str, name: &str, raw: Value) -> Option<PropertyValue> {
    let raw: RawProperty = match serde_json::from_value(raw) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(page = page_id, property = name, "undecodable property: {err}");
            return None;
        }
    };

    let value = match raw {
        RawProperty::Title { title } => PropertyValue::Title(join_text(title)),
        RawProperty::RichText { rich_text } => PropertyValue::Text(join_text(rich_text)),
        RawProperty::Number { number } => {
            PropertyValue::Number(number.as_ref().and_then(decimal_from_number))
        }
        RawProperty::Select { select } => PropertyValue::Select(select.map(|s| s.name)),
        RawProperty::Checkbox { checkbox } => PropertyValue::Checkbox(checkbox),
        RawProperty::Date { date } => {
            let start = date.and_then(|d| d.start);
            let day = start.as_deref().and_then(day_from_iso);
            if start.is_some() && day.is_none() {
                tracing::warn!(page = page_id, property = name, "unparsable date");
            }
            PropertyValue::Date(day)
        }
        RawProperty::Unsupported => return None,
    };
    Some(value)
}

impl From<Page> for RemoteRecord {
    fn from(page: Page) -> Self {
        let properties: Properties = page
            .properties
            .into_iter()
            .filter_map(|(name, raw)| {
                decode_property(&page.id, &name, raw).map(|value| (name, value))
            })
            .collect();
        RemoteRecord {
            id: RecordId::new(page.id),
            properties,
        }
    }
}

fn encode_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Title(text) => json!({ "title": [{ "text": { "content": text } }] }),
        PropertyValue::Text(text) => json!({ "rich_text": [{ "text": { "content": text } }] }),
        PropertyValue::Number(number) => {
            json!({ "number": number.as_ref().and_then(ToPrimitive::to_f64) })
        }
        PropertyValue::Select(name) => match name {
            Some(name) => json!({ "select": { "name": name } }),
            None => json!({ "select": null }),
        },
        PropertyValue::Checkbox(checked) => json!({ "checkbox": checked }),
        PropertyValue::Date(day) => match day {
            Some(day) => json!({ "date": { "start": day.format("%Y-%m-%d").to_string() } }),
            None => json!({ "date": null }),
        },
    }
}

/// Encode engine properties as a Notion `properties` object.
pub(crate) fn encode(properties: &Properties) -> Value {
    let map: Map<String, Value> = properties
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect();
    Value::Object(map)
}
