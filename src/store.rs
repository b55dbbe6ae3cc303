use crate::error::{Result, TallyError};
use crate::models::{
    Card, CardPatch, Category, CategoryPatch, NewTransaction, Transaction, TransactionPatch,
};

/// In-memory source of truth for transactions, cards and categories.
///
/// All lookups are linear scans. Ids are assigned as the current maximum plus one and
/// references between records (a transaction's card or category) are never validated.
#[derive(Debug, Clone, Default)]
pub struct Store {
    transactions: Vec<Transaction>,
    cards: Vec<Card>,
    categories: Vec<Category>,
}

fn next_id(ids: impl Iterator<Item = i64>) -> Result<i64> {
    match ids.max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| TallyError::Other(format!("no id left after {max}"))),
    }
}

impl Store {
    pub fn new(
        transactions: Vec<Transaction>,
        cards: Vec<Card>,
        categories: Vec<Category>,
    ) -> Self {
        Self {
            transactions,
            cards,
            categories,
        }
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn next_transaction_id(&self) -> Result<i64> {
        next_id(self.transactions.iter().map(|t| t.id))
    }

    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<&Transaction> {
        let id = self.next_transaction_id()?;
        self.transactions.push(Transaction {
            id,
            date: new.date,
            category: new.category,
            name: new.name,
            mount: new.mount,
            card_id: new.card_id,
        });
        Ok(&self.transactions[self.transactions.len() - 1])
    }

    pub fn transaction(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn update_transaction(&mut self, id: i64, patch: TransactionPatch) -> Result<&Transaction> {
        let txn = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TallyError::UnknownTransaction(id))?;
        if let Some(date) = patch.date {
            txn.date = date;
        }
        if let Some(category) = patch.category {
            txn.category = category;
        }
        if let Some(name) = patch.name {
            txn.name = name;
        }
        if let Some(mount) = patch.mount {
            txn.mount = mount;
        }
        if let Some(card_id) = patch.card_id {
            txn.card_id = card_id;
        }
        Ok(&*txn)
    }

    pub fn remove_transaction(&mut self, id: i64) -> Result<Transaction> {
        let idx = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or(TallyError::UnknownTransaction(id))?;
        Ok(self.transactions.remove(idx))
    }

    pub fn transactions_for_card(&self, card_id: i64) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.card_id == Some(card_id))
            .collect()
    }

    pub fn transactions_for_category(&self, category_id: i64) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.category == category_id)
            .collect()
    }

    /// Newest first: by date, then by id for same-day entries.
    pub fn recent_transactions(&self, limit: usize) -> Vec<&Transaction> {
        let mut txns: Vec<&Transaction> = self.transactions.iter().collect();
        txns.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        txns.truncate(limit);
        txns
    }

    // -----------------------------------------------------------------------
    // Cards
    // -----------------------------------------------------------------------

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn next_card_id(&self) -> Result<i64> {
        next_id(self.cards.iter().map(|c| c.id))
    }

    pub fn add_card(&mut self, name: &str, color: &str) -> Result<&Card> {
        let id = self.next_card_id()?;
        self.cards.push(Card {
            id,
            name: name.to_string(),
            color: color.to_string(),
            selected: None,
        });
        Ok(&self.cards[self.cards.len() - 1])
    }

    pub fn card(&self, id: i64) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_by_name(&self, name: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn update_card(&mut self, id: i64, patch: CardPatch) -> Result<&Card> {
        let card = self
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| TallyError::UnknownCard(id.to_string()))?;
        if let Some(name) = patch.name {
            card.name = name;
        }
        if let Some(color) = patch.color {
            card.color = color;
        }
        Ok(&*card)
    }

    /// Transactions tagged with the card keep their `card_id`.
    pub fn remove_card(&mut self, id: i64) -> Result<Card> {
        let idx = self
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| TallyError::UnknownCard(id.to_string()))?;
        Ok(self.cards.remove(idx))
    }

    /// Marks one card selected and every other card unselected.
    pub fn select_card(&mut self, id: i64) -> Result<&Card> {
        let idx = self
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| TallyError::UnknownCard(id.to_string()))?;
        for card in &mut self.cards {
            card.selected = Some(card.id == id);
        }
        Ok(&self.cards[idx])
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.cards.iter().find(|c| c.is_selected())
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn next_category_id(&self) -> Result<i64> {
        next_id(self.categories.iter().map(|c| c.id))
    }

    pub fn add_category(&mut self, name: &str, icon: &str, color: &str) -> Result<&Category> {
        let id = self.next_category_id()?;
        self.categories.push(Category {
            id,
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
        });
        Ok(&self.categories[self.categories.len() - 1])
    }

    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn update_category(&mut self, id: i64, patch: CategoryPatch) -> Result<&Category> {
        let cat = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| TallyError::UnknownCategory(id.to_string()))?;
        if let Some(name) = patch.name {
            cat.name = name;
        }
        if let Some(icon) = patch.icon {
            cat.icon = icon;
        }
        if let Some(color) = patch.color {
            cat.color = color;
        }
        Ok(&*cat)
    }

    pub fn remove_category(&mut self, id: i64) -> Result<Category> {
        let idx = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| TallyError::UnknownCategory(id.to_string()))?;
        Ok(self.categories.remove(idx))
    }
}
