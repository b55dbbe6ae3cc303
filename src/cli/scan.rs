use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};
use dialoguer::Confirm;

use super::{category_label, open_store, resolve_card};
use crate::error::{Result, TallyError};
use crate::fmt::money;
use crate::models::NewTransaction;
use crate::scanner::{scan_all, HttpVisionClient};
use crate::settings::load_settings;
use crate::storage::save_transactions;
use crate::store::Store;

fn preview(store: &Store, drafts: &[NewTransaction]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Name", "Category", "Amount"]);
    for d in drafts {
        table.add_row(vec![
            Cell::new(d.date),
            Cell::new(&d.name),
            Cell::new(category_label(store, d.category)),
            Cell::new(money(d.mount)),
        ]);
    }
    table
}

pub fn run(images: &[String], card: Option<&str>, yes: bool) -> Result<()> {
    let (conn, mut store) = open_store()?;
    let card_id = match card {
        Some(raw) => Some(resolve_card(&store, raw)?),
        None => store.selected_card().map(|c| c.id),
    };
    let settings = load_settings();
    let client = HttpVisionClient::from_settings(&settings.vision)?;
    let today = chrono::Local::now().date_naive();

    let paths: Vec<PathBuf> = images.iter().map(PathBuf::from).collect();
    println!("{}", format!("Scanning {} receipts...", paths.len()).dimmed());
    let outcomes = scan_all(&client, &paths, store.categories(), card_id, today);

    let mut added = 0usize;
    let mut failed = 0usize;
    for outcome in outcomes {
        println!("\n{}", outcome.path.display().to_string().bold());
        let drafts = match outcome.result {
            Ok(drafts) => drafts,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                failed += 1;
                continue;
            }
        };

        let total: f64 = drafts.iter().map(|d| d.mount).sum();
        println!("{}", preview(&store, &drafts));
        println!("Total: {}", money(total));

        let accepted = yes
            || Confirm::new()
                .with_prompt(format!("Add {} transactions?", drafts.len()))
                .default(true)
                .interact()
                .unwrap_or(false);
        if !accepted {
            println!("{}", "Skipped.".yellow());
            continue;
        }

        let count = drafts.len();
        for draft in drafts {
            store.add_transaction(draft)?;
        }
        save_transactions(&conn, store.transactions())?;
        added += count;
        println!("{}", format!("\u{2192} Added {count} transactions").green());
    }

    println!();
    println!("Scan complete: {added} added, {failed} failed.");
    if failed > 0 && added == 0 {
        return Err(TallyError::Other(format!(
            "no receipts were added, {failed} failed to scan"
        )));
    }
    Ok(())
}
