mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod models;
mod reports;
mod scanner;
mod settings;
mod storage;
mod store;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{CardsCommands, CategoriesCommands, Cli, Commands, ConfigCommands, TxCommands};

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tally={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init {
            data_dir,
            reset,
            yes,
        } => cli::init::run(data_dir, reset, yes),
        Commands::Dashboard { month, year } => cli::dashboard::run(month.as_deref(), year),
        Commands::Transactions { command } => match command {
            TxCommands::Add {
                name,
                amount,
                category,
                card,
                date,
            } => cli::transactions::add(
                &name,
                amount,
                category.as_deref(),
                card.as_deref(),
                date.as_deref(),
            ),
            TxCommands::List {
                card,
                category,
                month,
                year,
                limit,
            } => cli::transactions::list(
                card.as_deref(),
                category.as_deref(),
                month.as_deref(),
                year,
                limit,
            ),
            TxCommands::Show { id } => cli::transactions::show(id),
            TxCommands::Edit {
                id,
                name,
                amount,
                category,
                card,
                no_card,
                date,
            } => cli::transactions::edit(
                id,
                name.as_deref(),
                amount,
                category.as_deref(),
                card.as_deref(),
                no_card,
                date.as_deref(),
            ),
            TxCommands::Delete { id } => cli::transactions::delete(id),
            TxCommands::Export { output } => cli::transactions::export(output),
        },
        Commands::Cards { command } => match command {
            CardsCommands::Add { name, color } => cli::cards::add(&name, &color),
            CardsCommands::List => cli::cards::list(),
            CardsCommands::Edit { id, name, color } => {
                cli::cards::edit(id, name.as_deref(), color.as_deref())
            }
            CardsCommands::Delete { id } => cli::cards::delete(id),
            CardsCommands::Select { card } => cli::cards::select(&card),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::Add { name, icon, color } => {
                cli::categories::add(&name, &icon, &color)
            }
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Edit {
                id,
                name,
                icon,
                color,
            } => cli::categories::edit(id, name.as_deref(), icon.as_deref(), color.as_deref()),
            CategoriesCommands::Delete { id } => cli::categories::delete(id),
        },
        Commands::Scan { images, card, yes } => cli::scan::run(&images, card.as_deref(), yes),
        Commands::Profile { name } => cli::profile::run(name.as_deref()),
        Commands::Config { command } => match command {
            ConfigCommands::SetApi {
                endpoint,
                model,
                key,
                timeout,
            } => cli::config::set_api(endpoint, model, key, timeout),
            ConfigCommands::Show => cli::config::show(),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}
