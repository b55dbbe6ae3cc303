use std::path::PathBuf;

use colored::Colorize;
use dialoguer::Confirm;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{save_settings, settings_path, shellexpand_path, try_load_settings, DB_FILE};
use crate::storage::{clear_all, seed_defaults};

pub fn run(data_dir: Option<String>, reset: bool, yes: bool) -> Result<()> {
    let mut settings = try_load_settings()?;

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if !settings_path().exists() {
        // First run: prompt for data dir
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    let conn = get_connection(&resolved.join(DB_FILE))?;
    init_db(&conn)?;

    if reset {
        let confirmed = yes
            || Confirm::new()
                .with_prompt("Delete all transactions, cards and categories?")
                .default(false)
                .interact()
                .unwrap_or(false);
        if !confirmed {
            println!("{}", "Reset cancelled.".yellow());
            return Ok(());
        }
        let removed = clear_all(&conn)?;
        println!("{}", format!("Cleared {}", removed.join(", ")).yellow());
    }
    seed_defaults(&conn)?;

    println!("Initialized tally at {}", resolved.display());
    Ok(())
}
