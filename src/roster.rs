//! Roster import from a JSON array or comma-separated text with a header row.
//!
//! Every imported record becomes a fresh Draft item with a new id. An import
//! either yields a complete set of items or fails as a whole.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::RosterError;
use crate::models::{new_id, Item, ItemMetadata, ItemRole, ItemStatus};

const DEFAULT_AGE: u32 = 20;
const DEFAULT_BASE_PRICE: u64 = 10_000;

/// Parse a roster file. JSON is tried first, then CSV.
pub fn parse_roster(text: &str) -> Result<Vec<Item>, RosterError> {
    let items = match serde_json::from_str::<Value>(text) {
        Ok(value) => parse_json(value)?,
        Err(_) => {
            debug!("Roster is not JSON, trying CSV");
            parse_csv(text)?
        }
    };

    if items.is_empty() {
        return Err(RosterError::Empty);
    }

    info!("Parsed {} roster entries", items.len());
    Ok(items)
}

fn parse_json(value: Value) -> Result<Vec<Item>, RosterError> {
    let Value::Array(entries) = value else {
        return Err(RosterError::NotAnArray);
    };

    entries
        .iter()
        .map(|entry| {
            let Value::Object(fields) = entry else {
                return Err(RosterError::NotAnArray);
            };

            Ok(build_item(
                &json_text(fields, &["name"]),
                &json_text(fields, &["role"]),
                json_number(fields, &["age"]),
                json_number(fields, &["basePrice", "base_price"]),
                &json_text(fields, &["image"]),
                matches!(json_field(fields, &["verified"]), Some(Value::Bool(true)))
                    || json_text(fields, &["verified"]).eq_ignore_ascii_case("true"),
                json_number(fields, &["matches"]),
                json_number(fields, &["strikeRate", "strike_rate"]),
            ))
        })
        .collect()
}

fn json_field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| fields.get(*key))
}

fn json_text(fields: &Map<String, Value>, keys: &[&str]) -> String {
    match json_field(fields, keys) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn json_number(fields: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    match json_field(fields, keys) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_csv(text: &str) -> Result<Vec<Item>, RosterError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let Some(header) = lines.next() else {
        return Err(RosterError::Empty);
    };
    let headers: Vec<String> = header
        .split(',')
        .map(|h| h.trim().to_lowercase())
        .collect();
    if !headers.iter().any(|h| h == "name") {
        return Err(RosterError::MissingNameColumn);
    }

    lines
        .enumerate()
        .map(|(idx, line)| {
            let cols: Vec<&str> = line.split(',').map(str::trim).collect();
            if cols.len() != headers.len() {
                return Err(RosterError::ColumnMismatch {
                    row: idx + 2,
                    expected: headers.len(),
                    found: cols.len(),
                });
            }

            let row: HashMap<&str, &str> = headers
                .iter()
                .map(String::as_str)
                .zip(cols.iter().copied())
                .collect();
            let field = |key: &str| row.get(key).copied().unwrap_or("");
            let number = |key: &str| field(key).parse::<f64>().ok();

            Ok(build_item(
                field("name"),
                field("role"),
                number("age"),
                number("baseprice").or_else(|| number("base_price")),
                field("image"),
                field("verified").eq_ignore_ascii_case("true"),
                number("matches"),
                number("strikerate").or_else(|| number("strike_rate")),
            ))
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn build_item(
    name: &str,
    role: &str,
    age: Option<f64>,
    base_price: Option<f64>,
    image: &str,
    verified: bool,
    matches: Option<f64>,
    strike_rate: Option<f64>,
) -> Item {
    let positive = |n: Option<f64>| n.filter(|v| v.is_finite() && *v > 0.0);

    Item {
        id: new_id(),
        name: if name.trim().is_empty() {
            "Unknown Player".to_string()
        } else {
            name.trim().to_string()
        },
        role: ItemRole::parse(role).unwrap_or(ItemRole::Batsman),
        age: positive(age).map_or(DEFAULT_AGE, |v| v as u32),
        base_price: positive(base_price).map_or(DEFAULT_BASE_PRICE, |v| v as u64),
        current_bid: 0,
        status: ItemStatus::Draft,
        owner_id: None,
        metadata: ItemMetadata {
            matches: positive(matches).map_or(0, |v| v as u32),
            strike_rate: positive(strike_rate).unwrap_or(0.0),
        },
        verified,
        image: image.to_string(),
    }
}
