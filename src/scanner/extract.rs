use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::error::{Result, TallyError};

const NAME_KEYS: &[&str] = &["name", "item", "description", "title"];
const AMOUNT_KEYS: &[&str] = &["mount", "amount", "price", "total"];

/// One line read off a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedItem {
    pub name: String,
    pub amount: f64,
    pub date: Option<NaiveDate>,
}

fn array_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\s*\{").expect("valid array start pattern"))
}

fn thousands_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d{1,3}(,\d{3})+$").expect("valid thousands pattern"))
}

/// Parses the first `[{ ... }]` array embedded in `text`.
///
/// Every `[{` is tried as a starting point and parsing stops at the end of the array, so
/// trailing prose or a second array does not matter.
fn embedded_array(text: &str) -> Result<Vec<Value>> {
    let mut last_err = None;
    for start in array_start().find_iter(text) {
        let mut stream =
            serde_json::Deserializer::from_str(&text[start.start()..]).into_iter::<Vec<Value>>();
        match stream.next() {
            Some(Ok(values)) => return Ok(values),
            Some(Err(e)) => last_err = Some(e.to_string()),
            None => {}
        }
    }
    Err(TallyError::ParseResponse(
        last_err.unwrap_or_else(|| "no JSON array found in the answer".to_string()),
    ))
}

/// Reads receipt items out of a model's text answer.
///
/// The whole text is tried as a JSON array first. Failing that, the first `[{ ... }]`
/// array in the text is parsed instead.
pub fn parse_items(text: &str) -> Result<Vec<ScannedItem>> {
    let values = match serde_json::from_str::<Vec<Value>>(text.trim()) {
        Ok(values) => values,
        Err(strict_err) => {
            tracing::debug!(error = %strict_err, "answer is not a bare JSON array, searching text");
            embedded_array(text)?
        }
    };

    let items: Vec<ScannedItem> = values.iter().filter_map(item_from_value).collect();
    if items.len() < values.len() {
        tracing::warn!(
            skipped = values.len() - items.len(),
            "ignored receipt entries without a name or amount"
        );
    }
    if items.is_empty() {
        return Err(TallyError::EmptyExtraction);
    }
    Ok(items)
}

fn first_of<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
}

fn item_from_value(value: &Value) -> Option<ScannedItem> {
    let obj = value.as_object()?;
    let name = first_of(obj, NAME_KEYS)?.as_str()?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let amount = parse_amount(first_of(obj, AMOUNT_KEYS)?)?;
    let date = obj
        .get("date")
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());
    Some(ScannedItem { name, amount, date })
}

/// Accepts `12.5`, `"12.50"`, `"$1,299.00"`, `"1,299"` and `"4,75"`.
///
/// A lone comma followed by exactly three digits is a thousands separator, otherwise it
/// is read as a decimal comma.
pub fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && !matches!(c, '$' | '€' | '£'))
                .collect();
            let decimal_comma = cleaned.contains(',')
                && !cleaned.contains('.')
                && !thousands_pattern().is_match(&cleaned);
            let normalized = if decimal_comma {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            };
            normalized.parse::<f64>().ok()
        }
        _ => None,
    };
    amount.filter(|v| v.is_finite())
}
