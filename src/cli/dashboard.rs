use colored::Colorize;
use comfy_table::{Cell, Table};

use super::open_store;
use super::transactions::render_table;
use crate::error::Result;
use crate::fmt::money;
use crate::reports::{category_breakdown, in_period, monthly_totals, summarize, Period};
use crate::settings::load_settings;

const RECENT_ROWS: usize = 5;

pub fn run(month: Option<&str>, year: Option<i32>) -> Result<()> {
    let (_conn, store) = open_store()?;
    let period = Period::from_args(month, year)?;
    let summary = summarize(&in_period(&store, period));

    let settings = load_settings();
    if !settings.user_name.is_empty() {
        println!("Hello, {}!", settings.user_name.bold());
    }
    if let Some(card) = store.selected_card() {
        println!("Card: {}", card.name);
    }
    println!("{}\n", period.label().dimmed());

    let balance = if summary.balance < 0.0 {
        money(summary.balance).red().bold()
    } else {
        money(summary.balance).green().bold()
    };
    println!("Balance   {balance}");
    println!("Income    {}", money(summary.income).green());
    println!("Expenses  {}", money(summary.expenses.abs()).red());
    println!();

    let breakdown = category_breakdown(&store, period);
    if !breakdown.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Spent", "%", "Count"]);
        for row in &breakdown {
            table.add_row(vec![
                Cell::new(format!("{} {}", row.icon, row.name).trim()),
                Cell::new(money(row.total.abs())),
                Cell::new(format!("{:.1}%", row.pct)),
                Cell::new(row.count),
            ]);
        }
        println!("Spending by Category\n{table}\n");
    }

    let year = match period {
        Period::Month(..) => None,
        Period::Year(y) => Some(Some(y)),
        Period::All => Some(None),
    };
    if let Some(year) = year {
        let months = monthly_totals(&store, year);
        if months.len() > 1 {
            let mut table = Table::new();
            table.set_header(vec!["Month", "Income", "Expenses", "Net"]);
            for m in &months {
                table.add_row(vec![
                    Cell::new(&m.month),
                    Cell::new(money(m.income)),
                    Cell::new(money(m.expenses.abs())),
                    Cell::new(money(m.net)),
                ]);
            }
            println!("By Month\n{table}\n");
        }
    }

    let recent: Vec<_> = store
        .recent_transactions(usize::MAX)
        .into_iter()
        .filter(|t| period.contains(t))
        .take(RECENT_ROWS)
        .collect();
    if recent.is_empty() {
        let hint = "No transactions yet. Add one with `tally tx add` or `tally scan`.";
        println!("{}", hint.yellow());
    } else {
        println!("Recent Transactions\n{}", render_table(&store, &recent));
    }
    Ok(())
}
