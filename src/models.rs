use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single recorded expense (negative `mount`) or income (positive `mount`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    /// Category id. Not checked against the category list.
    pub category: i64,
    pub name: String,
    pub mount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<i64>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.mount < 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl Card {
    pub fn is_selected(&self) -> bool {
        self.selected.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub color: String,
}

/// Everything a transaction needs except its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub category: i64,
    pub name: String,
    pub mount: f64,
    pub card_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub category: Option<i64>,
    pub name: Option<String>,
    pub mount: Option<f64>,
    /// `Some(None)` clears the card.
    pub card_id: Option<Option<i64>>,
}

#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_uses_stored_key_names() {
        let txn = Transaction {
            id: 3,
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            category: 1,
            name: "Coffee".into(),
            mount: -4.5,
            card_id: Some(2),
        };
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["mount"], -4.5);
        assert_eq!(json["cardId"], 2);
        assert_eq!(json["date"], "2024-05-02");
    }

    #[test]
    fn test_transaction_without_card_omits_key() {
        let json = r#"{"id":1,"date":"2024-01-01","category":2,"name":"Rent","mount":-900}"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.card_id, None);
        assert!(txn.is_expense());
        let back = serde_json::to_string(&txn).unwrap();
        assert!(!back.contains("cardId"));
    }

    #[test]
    fn test_card_selected_defaults_to_false() {
        let card: Card =
            serde_json::from_str(r##"{"id":1,"name":"Visa","color":"#1e88e5"}"##).unwrap();
        assert!(!card.is_selected());
    }
}
