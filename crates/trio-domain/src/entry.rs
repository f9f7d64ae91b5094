//! Month ledger entries and the per-month record that groups them.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{allocation::BudgetBucket, common::*, month::MonthKey};

/// Every stored month, ordered oldest first.
pub type MonthBook = BTreeMap<MonthKey, MonthRecord>;

/// A single income or spending line inside a month ledger.
///
/// The amount is never negative; whether it is a credit or a debit follows from
/// the sequence holding the entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: RecordId,
    #[serde(default)]
    pub note: String,
    pub amount: f64,
    #[serde(rename = "timestamp", default)]
    pub created_at: String,
}

impl Entry {
    pub fn new(
        id: RecordId,
        note: impl Into<String>,
        amount: f64,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id,
            note: note.into(),
            amount,
            created_at: created_at.into(),
        }
    }
}

impl Identifiable for Entry {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Amounted for Entry {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for Entry {
    fn display_label(&self) -> String {
        if self.note.is_empty() {
            format!("#{} (no note)", self.id)
        } else {
            format!("#{} {}", self.id, self.note)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Names the four entry sequences of a month ledger.
pub enum EntryCategory {
    Income,
    Essentials,
    Savings,
    Discretionary,
}

impl EntryCategory {
    pub const ALL: [EntryCategory; 4] = [
        EntryCategory::Income,
        EntryCategory::Essentials,
        EntryCategory::Savings,
        EntryCategory::Discretionary,
    ];

    /// Income may be recorded without a note; every spending sequence needs one.
    pub fn requires_note(self) -> bool {
        !matches!(self, EntryCategory::Income)
    }

    /// Allocation bucket the category draws from, `None` for income.
    pub fn bucket(self) -> Option<BudgetBucket> {
        match self {
            EntryCategory::Income => None,
            EntryCategory::Essentials => Some(BudgetBucket::Essentials),
            EntryCategory::Savings => Some(BudgetBucket::Savings),
            EntryCategory::Discretionary => Some(BudgetBucket::Discretionary),
        }
    }

    /// Accepts both the product names and the stored document names.
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "incomes" => Some(EntryCategory::Income),
            "essentials" | "needs" => Some(EntryCategory::Essentials),
            "savings" | "dream" => Some(EntryCategory::Savings),
            "discretionary" | "wants" => Some(EntryCategory::Discretionary),
            _ => None,
        }
    }
}

impl From<BudgetBucket> for EntryCategory {
    fn from(bucket: BudgetBucket) -> Self {
        match bucket {
            BudgetBucket::Essentials => EntryCategory::Essentials,
            BudgetBucket::Discretionary => EntryCategory::Discretionary,
            BudgetBucket::Savings => EntryCategory::Savings,
        }
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryCategory::Income => "income",
            EntryCategory::Essentials => "essentials",
            EntryCategory::Savings => "savings",
            EntryCategory::Discretionary => "discretionary",
        };
        f.write_str(label)
    }
}

/// Everything recorded for one month.
///
/// Older documents may lack a sequence; it is read back as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthRecord {
    #[serde(default)]
    pub incomes: Vec<Entry>,
    #[serde(rename = "needsExpenses", default)]
    pub essentials_expenses: Vec<Entry>,
    #[serde(rename = "savingsExpenses", default)]
    pub savings_usage: Vec<Entry>,
    #[serde(rename = "wantsExpenses", default)]
    pub discretionary_contributions: Vec<Entry>,
}

impl MonthRecord {
    pub fn entries(&self, category: EntryCategory) -> &[Entry] {
        match category {
            EntryCategory::Income => &self.incomes,
            EntryCategory::Essentials => &self.essentials_expenses,
            EntryCategory::Savings => &self.savings_usage,
            EntryCategory::Discretionary => &self.discretionary_contributions,
        }
    }

    fn entries_mut(&mut self, category: EntryCategory) -> &mut Vec<Entry> {
        match category {
            EntryCategory::Income => &mut self.incomes,
            EntryCategory::Essentials => &mut self.essentials_expenses,
            EntryCategory::Savings => &mut self.savings_usage,
            EntryCategory::Discretionary => &mut self.discretionary_contributions,
        }
    }

    pub fn push(&mut self, category: EntryCategory, entry: Entry) {
        self.entries_mut(category).push(entry);
    }

    /// Removes the entry with `id` from `category`, returning it when present.
    pub fn remove(&mut self, category: EntryCategory, id: RecordId) -> Option<Entry> {
        let entries = self.entries_mut(category);
        let index = entries.iter().position(|entry| entry.id == id)?;
        Some(entries.remove(index))
    }

    pub fn find(&self, category: EntryCategory, id: RecordId) -> Option<&Entry> {
        self.entries(category).iter().find(|entry| entry.id == id)
    }

    pub fn total(&self, category: EntryCategory) -> f64 {
        sum_amounts(self.entries(category))
    }

    pub fn totals(&self) -> MonthTotals {
        MonthTotals {
            income: self.total(EntryCategory::Income),
            essentials_used: self.total(EntryCategory::Essentials),
            savings_used: self.total(EntryCategory::Savings),
            discretionary_used: self.total(EntryCategory::Discretionary),
        }
    }

    pub fn is_empty(&self) -> bool {
        EntryCategory::ALL
            .iter()
            .all(|category| self.entries(*category).is_empty())
    }

    pub fn max_id(&self) -> Option<RecordId> {
        EntryCategory::ALL
            .iter()
            .flat_map(|category| self.entries(*category).iter().map(|entry| entry.id))
            .max()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
/// Per-sequence sums for a month.
pub struct MonthTotals {
    pub income: f64,
    pub essentials_used: f64,
    pub savings_used: f64,
    pub discretionary_used: f64,
}

impl MonthTotals {
    pub fn used(&self, bucket: BudgetBucket) -> f64 {
        match bucket {
            BudgetBucket::Essentials => self.essentials_used,
            BudgetBucket::Discretionary => self.discretionary_used,
            BudgetBucket::Savings => self.savings_used,
        }
    }

    /// Spending across all three buckets.
    pub fn expense(&self) -> f64 {
        self.essentials_used + self.discretionary_used + self.savings_used
    }

    pub fn balance(&self) -> f64 {
        self.income - self.expense()
    }
}
