use colored::Colorize;
use comfy_table::{Cell, Table};

use super::open_store;
use crate::error::{Result, TallyError};
use crate::models::CategoryPatch;
use crate::storage::save_categories;

pub fn add(name: &str, icon: &str, color: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TallyError::InvalidInput("name is required".into()));
    }
    let (conn, mut store) = open_store()?;
    if store.category_by_name(name).is_some() {
        return Err(TallyError::InvalidInput(format!(
            "category '{name}' already exists"
        )));
    }
    let id = store.add_category(name, icon, color)?.id;
    save_categories(&conn, store.categories())?;
    println!("Added category {id}: {icon} {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let (_conn, store) = open_store()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Icon", "Name", "Color", "Transactions"]);
    for cat in store.categories() {
        table.add_row(vec![
            Cell::new(cat.id),
            Cell::new(&cat.icon),
            Cell::new(&cat.name),
            Cell::new(&cat.color),
            Cell::new(store.transactions_for_category(cat.id).len()),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn edit(id: i64, name: Option<&str>, icon: Option<&str>, color: Option<&str>) -> Result<()> {
    let (conn, mut store) = open_store()?;
    if let Some(new_name) = name {
        if store
            .category_by_name(new_name)
            .is_some_and(|existing| existing.id != id)
        {
            return Err(TallyError::InvalidInput(format!(
                "category '{}' already exists",
                new_name.trim()
            )));
        }
    }
    let patch = CategoryPatch {
        name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        icon: icon.map(str::to_string),
        color: color.map(str::to_string),
    };
    store.update_category(id, patch)?;
    save_categories(&conn, store.categories())?;
    println!("Updated category {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let (conn, mut store) = open_store()?;
    let cat = store.remove_category(id)?;
    save_categories(&conn, store.categories())?;
    let orphaned = store.transactions_for_category(id).len();
    println!("Deleted category {id}: {}", cat.name);
    if orphaned > 0 {
        println!(
            "{}",
            format!("{orphaned} transactions still reference this category.").yellow()
        );
    }
    Ok(())
}
