pub mod cards;
pub mod categories;
pub mod config;
pub mod dashboard;
pub mod init;
pub mod profile;
pub mod scan;
pub mod transactions;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::{Result, TallyError};
use crate::settings::db_path;
use crate::storage::load_store;
use crate::store::Store;

/// Opens the database and loads everything into memory.
pub(crate) fn open_store() -> Result<(Connection, Store)> {
    let path = db_path();
    if !path.exists() {
        return Err(TallyError::Other(
            "No database found. Run `tally init` to set up.".to_string(),
        ));
    }
    let conn = get_connection(&path)?;
    init_db(&conn)?;
    let store = load_store(&conn)?;
    Ok((conn, store))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| TallyError::InvalidInput(format!("date must be YYYY-MM-DD, got '{raw}'")))
}

/// Accepts a category id or a (case-insensitive) name.
pub(crate) fn resolve_category(store: &Store, raw: &str) -> Result<i64> {
    if let Ok(id) = raw.trim().parse::<i64>() {
        if store.category(id).is_some() {
            return Ok(id);
        }
    }
    store
        .category_by_name(raw)
        .map(|c| c.id)
        .ok_or_else(|| TallyError::UnknownCategory(raw.to_string()))
}

/// Accepts a card id or a (case-insensitive) name.
pub(crate) fn resolve_card(store: &Store, raw: &str) -> Result<i64> {
    if let Ok(id) = raw.trim().parse::<i64>() {
        if store.card(id).is_some() {
            return Ok(id);
        }
    }
    store
        .card_by_name(raw.trim())
        .map(|c| c.id)
        .ok_or_else(|| TallyError::UnknownCard(raw.to_string()))
}

pub(crate) fn category_label(store: &Store, id: i64) -> String {
    store
        .category(id)
        .map(|c| format!("{} {}", c.icon, c.name).trim().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

pub(crate) fn card_label(store: &Store, id: Option<i64>) -> String {
    match id {
        None => String::new(),
        Some(id) => store
            .card(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
    }
}

#[derive(Parser)]
#[command(name = "tally", about = "Track spending by card and category, and scan receipts.")]
pub struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize storage.
    Init {
        /// Path for tally data
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Delete all stored transactions, cards and categories, then reseed defaults
        #[arg(long)]
        reset: bool,
        /// Do not ask before resetting
        #[arg(long, short, requires = "reset")]
        yes: bool,
    },
    /// Balance, income, spending by category and recent activity.
    Dashboard {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Year filter: YYYY
        #[arg(long)]
        year: Option<i32>,
    },
    /// Manage transactions.
    #[command(name = "tx")]
    Transactions {
        #[command(subcommand)]
        command: TxCommands,
    },
    /// Manage payment cards.
    Cards {
        #[command(subcommand)]
        command: CardsCommands,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Read receipt images and add their items as transactions.
    Scan {
        /// Receipt image files (jpg, png, webp, gif, heic)
        #[arg(required = true)]
        images: Vec<String>,
        /// Card to tag the transactions with (id or name; default: selected card)
        #[arg(long)]
        card: Option<String>,
        /// Add without asking for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Show or update the user profile.
    Profile {
        /// Set the display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Configure the receipt scanning API.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record a transaction. Negative amounts are expenses.
    Add {
        /// What the transaction was for
        #[arg(long)]
        name: String,
        /// Signed amount, e.g. -12.50 or 2500
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        /// Category id or name (default: guessed from the name)
        #[arg(long)]
        category: Option<String>,
        /// Card id or name (default: selected card)
        #[arg(long)]
        card: Option<String>,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List transactions, newest first.
    List {
        /// Filter by card id or name
        #[arg(long)]
        card: Option<String>,
        /// Filter by category id or name
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        /// Maximum rows to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one transaction in detail.
    Show { id: i64 },
    /// Change fields of a transaction.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        card: Option<String>,
        /// Remove the card from the transaction
        #[arg(long = "no-card", conflicts_with = "card")]
        no_card: bool,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a transaction.
    Delete { id: i64 },
    /// Export transactions to CSV.
    Export {
        /// Output file (default: <data_dir>/exports/transactions-YYYYMMDD.csv)
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CardsCommands {
    /// Add a card.
    Add {
        name: String,
        /// Display color, e.g. '#1e88e5'
        #[arg(long, default_value = "#607d8b")]
        color: String,
    },
    /// List cards with their totals.
    List,
    /// Rename or recolor a card.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a card. Its transactions are kept.
    Delete { id: i64 },
    /// Make a card the default for new transactions.
    Select { card: String },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category.
    Add {
        name: String,
        #[arg(long, default_value = "📁")]
        icon: String,
        #[arg(long, default_value = "#9e9e9e")]
        color: String,
    },
    /// List categories.
    List,
    /// Change a category.
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category. Its transactions are kept.
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set the chat-completion endpoint, model and key used for scanning.
    SetApi {
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        model: Option<String>,
        /// API key (TALLY_API_KEY overrides this)
        #[arg(long)]
        key: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show the current configuration.
    Show,
}
