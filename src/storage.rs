use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::{get_item, remove_item, set_item};
use crate::error::{Result, TallyError};
use crate::models::{Card, Category, Transaction};
use crate::store::Store;

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const CARDS_KEY: &str = "cards";
pub const CATEGORIES_KEY: &str = "categories";

// (name, icon, color)
const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Food", "🍔", "#ff7043"),
    ("Groceries", "🛒", "#8bc34a"),
    ("Transport", "🚌", "#29b6f6"),
    ("Shopping", "🛍", "#ab47bc"),
    ("Bills", "💡", "#ffca28"),
    ("Entertainment", "🎬", "#ec407a"),
    ("Health", "💊", "#26a69a"),
    ("Travel", "✈", "#5c6bc0"),
    ("Income", "💰", "#66bb6a"),
    ("Other", "📦", "#9e9e9e"),
];

// (name, color)
const DEFAULT_CARDS: &[(&str, &str)] = &[("Cash", "#43a047"), ("Debit Card", "#1e88e5")];

fn load_list<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Vec<T>> {
    match get_item(conn, key)? {
        None => {
            tracing::debug!(key, "no stored value, starting empty");
            Ok(Vec::new())
        }
        Some(raw) => serde_json::from_str(&raw).map_err(|e| TallyError::CorruptValue {
            key: key.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn save_list<T: Serialize>(conn: &Connection, key: &str, items: &[T]) -> Result<()> {
    let json = serde_json::to_string(items)?;
    set_item(conn, key, &json)?;
    tracing::info!(key, count = items.len(), "saved list");
    Ok(())
}

pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    load_list(conn, TRANSACTIONS_KEY)
}

pub fn save_transactions(conn: &Connection, transactions: &[Transaction]) -> Result<()> {
    save_list(conn, TRANSACTIONS_KEY, transactions)
}

pub fn load_cards(conn: &Connection) -> Result<Vec<Card>> {
    load_list(conn, CARDS_KEY)
}

pub fn save_cards(conn: &Connection, cards: &[Card]) -> Result<()> {
    save_list(conn, CARDS_KEY, cards)
}

pub fn load_categories(conn: &Connection) -> Result<Vec<Category>> {
    load_list(conn, CATEGORIES_KEY)
}

pub fn save_categories(conn: &Connection, categories: &[Category]) -> Result<()> {
    save_list(conn, CATEGORIES_KEY, categories)
}

pub fn load_store(conn: &Connection) -> Result<Store> {
    Ok(Store::new(
        load_transactions(conn)?,
        load_cards(conn)?,
        load_categories(conn)?,
    ))
}

pub fn save_store(conn: &Connection, store: &Store) -> Result<()> {
    save_transactions(conn, store.transactions())?;
    save_cards(conn, store.cards())?;
    save_categories(conn, store.categories())?;
    Ok(())
}

/// Writes the default categories and cards under any key that is still unset.
///
/// Lists that are already stored, even empty ones, are left as they are. A corrupt stored
/// value fails the load and nothing is written.
pub fn seed_defaults(conn: &Connection) -> Result<()> {
    let mut store = load_store(conn)?;
    if get_item(conn, CATEGORIES_KEY)?.is_none() {
        for (name, icon, color) in DEFAULT_CATEGORIES {
            store.add_category(name, icon, color)?;
        }
    }
    if get_item(conn, CARDS_KEY)?.is_none() {
        for (name, color) in DEFAULT_CARDS {
            store.add_card(name, color)?;
        }
    }
    save_store(conn, &store)
}

/// Deletes every stored list. Returns the keys that held a value.
pub fn clear_all(conn: &Connection) -> Result<Vec<&'static str>> {
    let mut removed = Vec::new();
    for key in [TRANSACTIONS_KEY, CARDS_KEY, CATEGORIES_KEY] {
        if remove_item(conn, key)? {
            removed.push(key);
        }
    }
    tracing::info!(keys = ?removed, "cleared stored data");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::NewTransaction;
    use chrono::NaiveDate;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_missing_transactions_key_loads_empty() {
        let (_dir, conn) = test_db();
        assert!(load_transactions(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_transactions_persist_as_one_json_array() {
        let (_dir, conn) = test_db();
        let mut store = Store::default();
        store
            .add_transaction(NewTransaction {
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                category: 1,
                name: "Bakery".into(),
                mount: -6.25,
                card_id: Some(1),
            })
            .unwrap();
        save_transactions(&conn, store.transactions()).unwrap();

        let raw = get_item(&conn, TRANSACTIONS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["mount"], -6.25);

        let loaded = load_transactions(&conn).unwrap();
        assert_eq!(loaded, store.transactions());
    }

    #[test]
    fn test_corrupt_value_is_reported_not_replaced() {
        let (_dir, conn) = test_db();
        set_item(&conn, TRANSACTIONS_KEY, "{not json").unwrap();
        let err = load_transactions(&conn).unwrap_err();
        assert!(matches!(
            err,
            TallyError::CorruptValue { ref key, .. } if key == TRANSACTIONS_KEY
        ));
        assert_eq!(get_item(&conn, TRANSACTIONS_KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_seed_defaults_fills_empty_keys() {
        let (_dir, conn) = test_db();
        seed_defaults(&conn).unwrap();
        let store = load_store(&conn).unwrap();
        assert_eq!(store.categories().len(), DEFAULT_CATEGORIES.len());
        assert_eq!(store.cards().len(), DEFAULT_CARDS.len());
        assert!(store.category_by_name("Other").is_some());
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_seed_defaults_keeps_existing_data() {
        let (_dir, conn) = test_db();
        let mut store = Store::default();
        store.add_card("Only Card", "#000000").unwrap();
        save_cards(&conn, store.cards()).unwrap();
        seed_defaults(&conn).unwrap();
        let cards = load_cards(&conn).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Only Card");
    }

    #[test]
    fn test_store_roundtrip() {
        let (_dir, conn) = test_db();
        seed_defaults(&conn).unwrap();
        let mut store = load_store(&conn).unwrap();
        let card = store.add_card("Travel Visa", "#3949ab").unwrap().id;
        store.select_card(card).unwrap();
        save_store(&conn, &store).unwrap();
        let reloaded = load_store(&conn).unwrap();
        assert_eq!(reloaded.selected_card().unwrap().name, "Travel Visa");
    }

    #[test]
    fn test_seed_defaults_refuses_corrupt_data() {
        let (_dir, conn) = test_db();
        set_item(&conn, CARDS_KEY, "oops").unwrap();
        assert!(matches!(
            seed_defaults(&conn),
            Err(TallyError::CorruptValue { .. })
        ));
        assert_eq!(get_item(&conn, CARDS_KEY).unwrap().as_deref(), Some("oops"));
        assert_eq!(get_item(&conn, CATEGORIES_KEY).unwrap(), None);
    }

    #[test]
    fn test_clear_all_then_reseed() {
        let (_dir, conn) = test_db();
        set_item(&conn, CARDS_KEY, "oops").unwrap();
        set_item(&conn, TRANSACTIONS_KEY, "[]").unwrap();
        assert_eq!(clear_all(&conn).unwrap(), vec![TRANSACTIONS_KEY, CARDS_KEY]);
        assert!(crate::db::keys(&conn).unwrap().is_empty());

        seed_defaults(&conn).unwrap();
        assert_eq!(load_cards(&conn).unwrap().len(), DEFAULT_CARDS.len());
    }
}
