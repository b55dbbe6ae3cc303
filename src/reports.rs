use std::collections::BTreeMap;

use chrono::Datelike;

use crate::error::{Result, TallyError};
use crate::models::Transaction;
use crate::store::Store;

// ---------------------------------------------------------------------------
// Period filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    Year(i32),
    Month(i32, u32),
}

impl Period {
    /// `--month YYYY-MM` wins over `--year YYYY`.
    pub fn from_args(month: Option<&str>, year: Option<i32>) -> Result<Self> {
        if let Some(m) = month {
            let (y, mm) = m
                .split_once('-')
                .and_then(|(y, mm)| Some((y.parse::<i32>().ok()?, mm.parse::<u32>().ok()?)))
                .filter(|(_, mm)| (1..=12).contains(mm))
                .ok_or_else(|| {
                    TallyError::InvalidInput(format!("month must be YYYY-MM, got '{m}'"))
                })?;
            return Ok(Period::Month(y, mm));
        }
        Ok(year.map_or(Period::All, Period::Year))
    }

    pub fn contains(&self, txn: &Transaction) -> bool {
        match *self {
            Period::All => true,
            Period::Year(y) => txn.date.year() == y,
            Period::Month(y, m) => txn.date.year() == y && txn.date.month() == m,
        }
    }

    pub fn label(&self) -> String {
        match *self {
            Period::All => "All time".to_string(),
            Period::Year(y) => format!("{y}"),
            Period::Month(y, m) => format!("{y:04}-{m:02}"),
        }
    }
}

pub fn in_period(store: &Store, period: Period) -> Vec<&Transaction> {
    store
        .transactions()
        .iter()
        .filter(|t| period.contains(t))
        .collect()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub income: f64,
    /// Sum of negative amounts, so this is zero or below.
    pub expenses: f64,
    pub balance: f64,
    pub count: usize,
}

pub fn summarize(txns: &[&Transaction]) -> Summary {
    let income: f64 = txns.iter().filter(|t| t.mount > 0.0).map(|t| t.mount).sum();
    let expenses: f64 = txns.iter().filter(|t| t.mount < 0.0).map(|t| t.mount).sum();
    Summary {
        income,
        expenses,
        balance: income + expenses,
        count: txns.len(),
    }
}

// ---------------------------------------------------------------------------
// Category breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category_id: i64,
    pub name: String,
    pub icon: String,
    pub total: f64,
    pub count: usize,
    pub pct: f64,
}

/// Expense totals per category, largest spend first.
pub fn category_breakdown(store: &Store, period: Period) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for txn in in_period(store, period).into_iter().filter(|t| t.is_expense()) {
        let entry = totals.entry(txn.category).or_insert((0.0, 0));
        entry.0 += txn.mount;
        entry.1 += 1;
    }
    let grand_total: f64 = totals.values().map(|(t, _)| t).sum();

    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(id, (total, count))| {
            let (name, icon) = store
                .category(id)
                .map(|c| (c.name.clone(), c.icon.clone()))
                .unwrap_or_else(|| ("Unknown".to_string(), String::new()));
            CategoryTotal {
                category_id: id,
                name,
                icon,
                total,
                count,
                pct: if grand_total != 0.0 {
                    total / grand_total * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();
    rows.sort_by(|a, b| a.total.total_cmp(&b.total).then(a.category_id.cmp(&b.category_id)));
    rows
}

// ---------------------------------------------------------------------------
// Card breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CardTotal {
    pub card_id: Option<i64>,
    pub name: String,
    pub summary: Summary,
}

/// One row per card in card order, unknown cards next, then transactions without a card.
pub fn card_breakdown(store: &Store, period: Period) -> Vec<CardTotal> {
    let txns = in_period(store, period);
    let mut groups: BTreeMap<Option<i64>, Vec<&Transaction>> = BTreeMap::new();
    for txn in txns {
        groups.entry(txn.card_id).or_default().push(txn);
    }

    let mut rows = Vec::new();
    for card in store.cards() {
        let group = groups.remove(&Some(card.id)).unwrap_or_default();
        rows.push(CardTotal {
            card_id: Some(card.id),
            name: card.name.clone(),
            summary: summarize(&group),
        });
    }
    let unassigned = groups.remove(&None);
    for (card_id, group) in groups {
        rows.push(CardTotal {
            card_id,
            name: "Unknown".to_string(),
            summary: summarize(&group),
        });
    }
    if let Some(group) = unassigned {
        rows.push(CardTotal {
            card_id: None,
            name: "Unassigned".to_string(),
            summary: summarize(&group),
        });
    }
    rows
}

// ---------------------------------------------------------------------------
// Monthly totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotal {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

pub fn monthly_totals(store: &Store, year: Option<i32>) -> Vec<MonthTotal> {
    let period = year.map_or(Period::All, Period::Year);
    let mut months: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
    for txn in in_period(store, period) {
        months
            .entry(txn.date.format("%Y-%m").to_string())
            .or_default()
            .push(txn);
    }
    months
        .into_iter()
        .map(|(month, group)| {
            let s = summarize(&group);
            MonthTotal {
                month,
                income: s.income,
                expenses: s.expenses,
                net: s.balance,
            }
        })
        .collect()
}
