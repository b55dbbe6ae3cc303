use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{card_label, category_label, open_store, parse_date, resolve_card, resolve_category};
use crate::categorizer::guess_category;
use crate::error::{Result, TallyError};
use crate::fmt::{display_date, signed_money};
use crate::models::{NewTransaction, Transaction, TransactionPatch};
use crate::reports::Period;
use crate::scanner::UNCATEGORIZED;
use crate::settings::get_data_dir;
use crate::storage::save_transactions;
use crate::store::Store;

fn colored_amount(mount: f64) -> String {
    if mount < 0.0 {
        signed_money(mount).red().to_string()
    } else {
        signed_money(mount).green().to_string()
    }
}

fn check_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TallyError::InvalidInput("name is required".into()));
    }
    Ok(name.to_string())
}

fn check_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() {
        return Err(TallyError::InvalidInput("amount must be a number".into()));
    }
    Ok(amount)
}

pub fn add(
    name: &str,
    amount: f64,
    category: Option<&str>,
    card: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let (conn, mut store) = open_store()?;
    let name = check_name(name)?;
    let mount = check_amount(amount)?;
    let category = match category {
        Some(raw) => resolve_category(&store, raw)?,
        None => guess_category(&name, store.categories()).unwrap_or(UNCATEGORIZED),
    };
    let card_id = match card {
        Some(raw) => Some(resolve_card(&store, raw)?),
        None => store.selected_card().map(|c| c.id),
    };
    let date = match date {
        Some(raw) => parse_date(raw)?,
        None => chrono::Local::now().date_naive(),
    };

    let txn = store
        .add_transaction(NewTransaction {
            date,
            category,
            name,
            mount,
            card_id,
        })?
        .clone();
    save_transactions(&conn, store.transactions())?;
    println!(
        "Added transaction {}: {} {} ({})",
        txn.id,
        txn.name,
        colored_amount(txn.mount),
        category_label(&store, txn.category)
    );
    Ok(())
}

pub(crate) fn render_table(store: &Store, txns: &[&Transaction]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Name", "Category", "Card", "Amount"]);
    for txn in txns {
        table.add_row(vec![
            Cell::new(txn.id),
            Cell::new(txn.date),
            Cell::new(&txn.name),
            Cell::new(category_label(store, txn.category)),
            Cell::new(card_label(store, txn.card_id)),
            Cell::new(colored_amount(txn.mount)),
        ]);
    }
    table
}

pub fn list(
    card: Option<&str>,
    category: Option<&str>,
    month: Option<&str>,
    year: Option<i32>,
    limit: Option<usize>,
) -> Result<()> {
    let (_conn, store) = open_store()?;
    let period = Period::from_args(month, year)?;
    let card_id = card.map(|raw| resolve_card(&store, raw)).transpose()?;
    let category_id = category.map(|raw| resolve_category(&store, raw)).transpose()?;

    let mut txns: Vec<&Transaction> = store
        .recent_transactions(usize::MAX)
        .into_iter()
        .filter(|t| period.contains(t))
        .filter(|t| card_id.map_or(true, |id| t.card_id == Some(id)))
        .filter(|t| category_id.map_or(true, |id| t.category == id))
        .collect();
    if let Some(limit) = limit {
        txns.truncate(limit);
    }

    if txns.is_empty() {
        println!("{}", "No transactions.".yellow());
        return Ok(());
    }
    println!("Transactions ({})\n{}", period.label(), render_table(&store, &txns));
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let (_conn, store) = open_store()?;
    let txn = store.transaction(id).ok_or(TallyError::UnknownTransaction(id))?;

    println!("{}", "\u{2500}".repeat(40));
    println!("  {}", txn.name.bold());
    println!("  {}", colored_amount(txn.mount));
    println!("{}", "\u{2500}".repeat(40));
    println!("  ID:        {}", txn.id);
    println!("  Date:      {}", display_date(txn.date));
    println!("  Category:  {}", category_label(&store, txn.category));
    let card = card_label(&store, txn.card_id);
    println!("  Card:      {}", if card.is_empty() { "(none)" } else { &card });
    println!("  Type:      {}", if txn.is_expense() { "Expense" } else { "Income" });
    Ok(())
}

pub fn edit(
    id: i64,
    name: Option<&str>,
    amount: Option<f64>,
    category: Option<&str>,
    card: Option<&str>,
    no_card: bool,
    date: Option<&str>,
) -> Result<()> {
    let (conn, mut store) = open_store()?;
    let patch = TransactionPatch {
        name: name.map(check_name).transpose()?,
        mount: amount.map(check_amount).transpose()?,
        category: category.map(|raw| resolve_category(&store, raw)).transpose()?,
        card_id: if no_card {
            Some(None)
        } else {
            card.map(|raw| resolve_card(&store, raw).map(Some)).transpose()?
        },
        date: date.map(parse_date).transpose()?,
    };
    store.update_transaction(id, patch)?;
    save_transactions(&conn, store.transactions())?;
    println!("Updated transaction {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let (conn, mut store) = open_store()?;
    let removed = store.remove_transaction(id)?;
    save_transactions(&conn, store.transactions())?;
    println!("Deleted transaction {id}: {}", removed.name);
    Ok(())
}

pub fn export(output: Option<String>) -> Result<()> {
    let (_conn, store) = open_store()?;
    let dest = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let dir = get_data_dir().join("exports");
            std::fs::create_dir_all(&dir)?;
            let stamp = chrono::Local::now().format("%Y%m%d");
            dir.join(format!("transactions-{stamp}.csv"))
        }
    };
    let count = write_csv(&store, &dest)?;
    println!("Exported {count} transactions to {}", dest.display());
    Ok(())
}

pub(crate) fn write_csv(store: &Store, dest: &std::path::Path) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(dest)?;
    wtr.write_record(["id", "date", "name", "category", "card", "amount"])?;
    let txns = store.recent_transactions(usize::MAX);
    for txn in &txns {
        let category = store
            .category(txn.category)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        wtr.write_record([
            txn.id.to_string(),
            txn.date.to_string(),
            txn.name.clone(),
            category,
            card_label(store, txn.card_id),
            format!("{:.2}", txn.mount),
        ])?;
    }
    wtr.flush()?;
    Ok(txns.len())
}
