use colored::Colorize;

use crate::db::{get_connection, init_db, keys};
use crate::error::Result;
use crate::fmt::money;
use crate::reports::{in_period, summarize, Period};
use crate::settings::{load_settings, save_settings, try_load_settings, DB_FILE};
use crate::storage::load_store;

pub fn run(name: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        let mut settings = try_load_settings()?;
        settings.user_name = name.trim().to_string();
        save_settings(&settings)?;
        println!("{}", format!("Name set to {}", settings.user_name).green());
        return Ok(());
    }

    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    let user = if settings.user_name.is_empty() {
        "(not set)"
    } else {
        settings.user_name.as_str()
    };
    println!("User:       {user}");
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!("Scan model: {}", settings.vision.model);
    let key_status = if settings.vision.resolve_api_key().is_some() {
        "configured"
    } else {
        "(not set)"
    };
    println!("API key:    {key_status}");

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        init_db(&conn)?;
        let store = load_store(&conn)?;
        let all = in_period(&store, Period::All);
        let summary = summarize(&all);

        println!();
        println!("Stored keys:   {}", keys(&conn)?.join(", "));
        println!("Transactions:  {}", summary.count);
        println!("Cards:         {}", store.cards().len());
        println!("Categories:    {}", store.categories().len());
        println!("Balance:       {}", money(summary.balance));
    } else {
        println!();
        println!("Database not found. Run `tally init` to set up.");
    }
    Ok(())
}
