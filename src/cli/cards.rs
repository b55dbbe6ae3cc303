use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{open_store, resolve_card};
use crate::error::{Result, TallyError};
use crate::fmt::money_opt;
use crate::models::CardPatch;
use crate::reports::{card_breakdown, Period};
use crate::storage::save_cards;

fn check_color(color: &str) -> Result<String> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(TallyError::InvalidInput(format!(
            "color must look like #1e88e5, got '{color}'"
        )));
    }
    Ok(color.to_lowercase())
}

pub fn add(name: &str, color: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TallyError::InvalidInput("name is required".into()));
    }
    let color = check_color(color)?;
    let (conn, mut store) = open_store()?;
    let id = store.add_card(name.trim(), &color)?.id;
    save_cards(&conn, store.cards())?;
    println!("Added card {id}: {}", name.trim());
    Ok(())
}

pub fn list() -> Result<()> {
    let (_conn, store) = open_store()?;
    let totals = card_breakdown(&store, Period::All);

    let mut table = Table::new();
    table.set_header(vec!["ID", "", "Name", "Color", "Transactions", "Spent", "Received"]);
    for card in store.cards() {
        let summary = totals
            .iter()
            .find(|t| t.card_id == Some(card.id))
            .map(|t| t.summary);
        table.add_row(vec![
            Cell::new(card.id),
            Cell::new(if card.is_selected() { "\u{2713}" } else { "" }),
            Cell::new(&card.name),
            Cell::new(&card.color),
            Cell::new(summary.map_or(0, |s| s.count)),
            Cell::new(money_opt(summary.map(|s| s.expenses.abs()))),
            Cell::new(money_opt(summary.map(|s| s.income))),
        ]);
    }
    println!("Cards\n{table}");
    Ok(())
}

pub fn edit(id: i64, name: Option<&str>, color: Option<&str>) -> Result<()> {
    let patch = CardPatch {
        name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        color: color.map(check_color).transpose()?,
    };
    let (conn, mut store) = open_store()?;
    store.update_card(id, patch)?;
    save_cards(&conn, store.cards())?;
    println!("Updated card {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let (conn, mut store) = open_store()?;
    let card = store.remove_card(id)?;
    save_cards(&conn, store.cards())?;
    let orphaned = store.transactions_for_card(id).len();
    println!("Deleted card {id}: {}", card.name);
    if orphaned > 0 {
        println!(
            "{}",
            format!("{orphaned} transactions still reference this card.").yellow()
        );
    }
    Ok(())
}

pub fn select(card: &str) -> Result<()> {
    let (conn, mut store) = open_store()?;
    let id = resolve_card(&store, card)?;
    let name = store.select_card(id)?.name.clone();
    save_cards(&conn, store.cards())?;
    println!("Selected card: {name}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_color() {
        assert_eq!(check_color("#1E88E5").unwrap(), "#1e88e5");
        assert!(check_color("blue").is_err());
        assert!(check_color("#12345").is_err());
        assert!(check_color("#12345g").is_err());
    }
}
