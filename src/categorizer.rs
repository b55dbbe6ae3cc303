use std::sync::OnceLock;

use regex::Regex;

use crate::models::Category;

pub const FALLBACK_CATEGORY: &str = "Other";

/// Keyword lists per category name. Checked in order, first hit wins.
const KEYWORD_RULES: &[(&str, &[&str])] = &[
    (
        "Groceries",
        &[
            "grocery", "groceries", "supermarket", "market", "milk", "bread", "eggs", "cheese",
            "fruit", "vegetable", "banana", "apple", "rice", "flour", "butter", "yogurt", "meat",
            "chicken", "tomato",
        ],
    ),
    (
        "Food",
        &[
            "restaurant", "cafe", "coffee", "latte", "cappuccino", "espresso", "pizza", "burger",
            "sandwich", "sushi", "lunch", "dinner", "breakfast", "meal", "tea", "juice", "soda",
            "beer", "wine", "snack", "dessert", "bakery", "fries", "taco",
        ],
    ),
    (
        "Transport",
        &[
            "uber", "lyft", "taxi", "bus", "metro", "train", "subway", "fuel", "gas", "petrol",
            "parking", "toll", "ticket",
        ],
    ),
    (
        "Bills",
        &[
            "electric", "water bill", "internet", "phone", "rent", "insurance", "utility",
            "subscription",
        ],
    ),
    (
        "Health",
        &[
            "pharmacy", "medicine", "doctor", "clinic", "vitamin", "dental", "aspirin",
            "ibuprofen",
        ],
    ),
    (
        "Entertainment",
        &["movie", "cinema", "netflix", "spotify", "concert", "game", "theater", "book"],
    ),
    (
        "Shopping",
        &[
            "shirt", "shoes", "jacket", "pants", "dress", "clothing", "electronics", "cable",
            "charger", "headphones", "store",
        ],
    ),
    ("Travel", &["hotel", "flight", "airline", "airbnb", "hostel", "luggage"]),
];

/// Case-insensitive whole-word match on any of `words`, allowing a plural `s`/`es`.
fn word_pattern<'a>(words: impl IntoIterator<Item = &'a str>) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = words.into_iter().map(regex::escape).collect();
    Regex::new(&format!(
        r"(?i)(?:^|\W)(?:{})(?:e?s)?(?:\W|$)",
        alternatives.join("|")
    ))
}

fn rule_patterns() -> &'static [(&'static str, Regex)] {
    static RULES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        KEYWORD_RULES
            .iter()
            .map(|(category, keywords)| {
                let re = word_pattern(keywords.iter().copied()).expect("valid keyword pattern");
                (*category, re)
            })
            .collect()
    })
}

fn mentions(name: &str, word: &str) -> bool {
    word_pattern([word.trim()]).is_ok_and(|re| re.is_match(name))
}

/// Picks a category id for a transaction name by keyword.
///
/// Only categories that exist in `categories` can be returned. Names that match nothing go
/// to the fallback category when one is present.
pub fn guess_category(name: &str, categories: &[Category]) -> Option<i64> {
    let by_name = |wanted: &str| {
        categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
            .map(|c| c.id)
    };

    for &(category, ref pattern) in rule_patterns() {
        if !pattern.is_match(name) {
            continue;
        }
        if let Some(id) = by_name(category) {
            tracing::debug!(name, category, "keyword match");
            return Some(id);
        }
    }

    // A user category whose own name appears in the item name.
    if let Some(cat) = categories
        .iter()
        .find(|c| !c.name.trim().is_empty() && mentions(name, &c.name))
    {
        return Some(cat.id);
    }

    tracing::debug!(name, "no keyword match, using fallback");
    by_name(FALLBACK_CATEGORY)
}
