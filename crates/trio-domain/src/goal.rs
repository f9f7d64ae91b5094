//! Long-term savings goals and their private transaction logs.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{common::*, month::MonthKey};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Enumerates how a goal transaction moves the goal's aggregates.
pub enum GoalTransactionKind {
    /// Adds to the saved amount.
    #[serde(rename = "income")]
    Contribution,
    /// Raises the target, e.g. for an unexpected cost.
    #[serde(rename = "expense")]
    TargetAdjustment,
    /// Adds to the saved amount and has a twin entry in a month ledger.
    #[serde(rename = "monthly")]
    RecurringContribution,
}

impl GoalTransactionKind {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "contribution" | "income" => Some(GoalTransactionKind::Contribution),
            "adjustment" | "target" | "expense" => Some(GoalTransactionKind::TargetAdjustment),
            "recurring" | "monthly" => Some(GoalTransactionKind::RecurringContribution),
            _ => None,
        }
    }

    pub fn has_twin(self) -> bool {
        matches!(self, GoalTransactionKind::RecurringContribution)
    }
}

impl fmt::Display for GoalTransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalTransactionKind::Contribution => "Contribution",
            GoalTransactionKind::TargetAdjustment => "Target Adjustment",
            GoalTransactionKind::RecurringContribution => "Recurring Contribution",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalTransaction {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: GoalTransactionKind,
    #[serde(default)]
    pub note: String,
    pub amount: f64,
    #[serde(rename = "timestamp", default)]
    pub created_at: String,
    /// Month ledger holding the twin entry of a recurring contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<MonthKey>,
}

impl GoalTransaction {
    pub fn new(
        id: RecordId,
        kind: GoalTransactionKind,
        note: impl Into<String>,
        amount: f64,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            note: note.into(),
            amount,
            created_at: created_at.into(),
            month: None,
        }
    }

    pub fn in_month(mut self, month: MonthKey) -> Self {
        self.month = Some(month);
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.kind.has_twin()
    }
}

impl Identifiable for GoalTransaction {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Amounted for GoalTransaction {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl Displayable for GoalTransaction {
    fn display_label(&self) -> String {
        format!("#{} {} {} ({})", self.id, self.kind, self.amount, self.note)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
/// The two aggregates a goal keeps in step with its log.
pub struct GoalBalance {
    pub base_savings: f64,
    pub target_amount: f64,
}

impl GoalBalance {
    pub fn new(base_savings: f64, target_amount: f64) -> Self {
        Self {
            base_savings,
            target_amount,
        }
    }

    pub fn apply(&mut self, txn: &GoalTransaction) {
        match txn.kind {
            GoalTransactionKind::Contribution | GoalTransactionKind::RecurringContribution => {
                self.base_savings += txn.amount
            }
            GoalTransactionKind::TargetAdjustment => self.target_amount += txn.amount,
        }
    }

    pub fn reverse(&mut self, txn: &GoalTransaction) {
        match txn.kind {
            GoalTransactionKind::Contribution | GoalTransactionKind::RecurringContribution => {
                self.base_savings -= txn.amount
            }
            GoalTransactionKind::TargetAdjustment => self.target_amount -= txn.amount,
        }
    }

    /// Folds `transactions` onto `self`.
    pub fn replay<'a, I>(mut self, transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a GoalTransaction>,
    {
        for txn in transactions {
            self.apply(txn);
        }
        self
    }
}

/// User-supplied goal fields for create and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub name: String,
    pub category: Option<String>,
    pub currency_label: String,
    pub target_amount: f64,
    pub base_savings: f64,
    pub end_date: NaiveDate,
}

impl GoalDraft {
    pub fn new(
        name: impl Into<String>,
        target_amount: f64,
        base_savings: f64,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            category: None,
            currency_label: String::new(),
            target_amount,
            base_savings,
            end_date,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_currency(mut self, currency_label: impl Into<String>) -> Self {
        self.currency_label = currency_label.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: RecordId,
    #[serde(rename = "budgetName")]
    pub name: String,
    #[serde(
        default,
        serialize_with = "serialize_category",
        deserialize_with = "deserialize_category"
    )]
    pub category: Option<String>,
    #[serde(rename = "currency", default)]
    pub currency_label: String,
    #[serde(rename = "targetAmount")]
    pub target_amount: f64,
    #[serde(rename = "baseSavings")]
    pub base_savings: f64,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "expenses", default)]
    pub transactions: Vec<GoalTransaction>,
}

impl Goal {
    pub fn from_draft(id: RecordId, draft: GoalDraft) -> Self {
        Self {
            id,
            name: draft.name,
            category: normalize_category(draft.category),
            currency_label: draft.currency_label,
            target_amount: draft.target_amount,
            base_savings: draft.base_savings,
            end_date: draft.end_date,
            transactions: Vec::new(),
        }
    }

    /// Replaces the metadata and aggregates, leaving the log untouched.
    pub fn apply_draft(&mut self, draft: GoalDraft) {
        self.name = draft.name;
        self.category = normalize_category(draft.category);
        self.currency_label = draft.currency_label;
        self.target_amount = draft.target_amount;
        self.base_savings = draft.base_savings;
        self.end_date = draft.end_date;
    }

    pub fn balance(&self) -> GoalBalance {
        GoalBalance::new(self.base_savings, self.target_amount)
    }

    fn set_balance(&mut self, balance: GoalBalance) {
        self.base_savings = balance.base_savings;
        self.target_amount = balance.target_amount;
    }

    /// Aggregates before any logged transaction was applied.
    pub fn opening_balance(&self) -> GoalBalance {
        self.opening_balance_from(self.balance())
    }

    /// `current` with the effect of every logged transaction taken back out.
    pub fn opening_balance_from(&self, current: GoalBalance) -> GoalBalance {
        let mut balance = current;
        for txn in &self.transactions {
            balance.reverse(txn);
        }
        balance
    }

    pub fn push_transaction(&mut self, txn: GoalTransaction) {
        let mut balance = self.balance();
        balance.apply(&txn);
        self.set_balance(balance);
        self.transactions.push(txn);
    }

    /// Removes the transaction and reverses its effect; `None` when absent.
    pub fn take_transaction(&mut self, id: RecordId) -> Option<GoalTransaction> {
        let index = self.transactions.iter().position(|txn| txn.id == id)?;
        let txn = self.transactions.remove(index);
        let mut balance = self.balance();
        balance.reverse(&txn);
        self.set_balance(balance);
        Some(txn)
    }

    pub fn transaction(&self, id: RecordId) -> Option<&GoalTransaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn recurring_transactions(&self) -> impl Iterator<Item = &GoalTransaction> {
        self.transactions.iter().filter(|txn| txn.is_recurring())
    }

    /// `min(100, saved / target * 100)`.
    ///
    /// A zero target counts as complete once anything is saved.
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return if self.base_savings > 0.0 { 100.0 } else { 0.0 };
        }
        (self.base_savings * 100.0 / self.target_amount).clamp(0.0, 100.0)
    }

    /// Whole days from `today` until the end date, never negative.
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days().max(0)
    }

    pub fn remaining_amount(&self) -> f64 {
        (self.target_amount - self.base_savings).max(0.0)
    }

    pub fn max_id(&self) -> RecordId {
        self.transactions
            .iter()
            .map(|txn| txn.id)
            .fold(self.id, RecordId::max)
    }
}

impl Identifiable for Goal {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl NamedEntity for Goal {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Goal {
    fn display_label(&self) -> String {
        match &self.category {
            Some(category) => format!("{} [{}]", self.name, category),
            None => self.name.clone(),
        }
    }
}

fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn serialize_category<S>(category: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(category.as_deref().unwrap_or_default())
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_category(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal() -> Goal {
        Goal::from_draft(1, GoalDraft::new("Trip", 1000.0, 0.0, date(2030, 1, 1)))
    }

    #[test]
    fn transactions_move_aggregates_and_reverse_exactly() {
        let mut goal = goal();
        goal.push_transaction(GoalTransaction::new(
            2,
            GoalTransactionKind::Contribution,
            "gift",
            40.0,
            "t",
        ));
        goal.push_transaction(GoalTransaction::new(
            3,
            GoalTransactionKind::TargetAdjustment,
            "fees",
            50.0,
            "t",
        ));
        assert_eq!(goal.base_savings, 40.0);
        assert_eq!(goal.target_amount, 1050.0);

        let removed = goal.take_transaction(3).unwrap();
        assert_eq!(removed.kind, GoalTransactionKind::TargetAdjustment);
        assert_eq!(goal.target_amount, 1000.0);
        assert!(goal.take_transaction(3).is_none());
        assert_eq!(goal.target_amount, 1000.0);
    }

    #[test]
    fn opening_balance_replays_to_current_aggregates() {
        let mut goal = goal();
        goal.push_transaction(GoalTransaction::new(
            2,
            GoalTransactionKind::RecurringContribution,
            "Jan",
            100.0,
            "t",
        ));
        let replayed = goal.opening_balance().replay(&goal.transactions);
        assert_eq!(replayed, goal.balance());
        assert_eq!(goal.opening_balance(), GoalBalance::new(0.0, 1000.0));
    }

    #[test]
    fn progress_is_capped_and_handles_zero_target() {
        let mut goal = goal();
        goal.base_savings = 250.0;
        assert_eq!(goal.progress_percent(), 25.0);
        goal.base_savings = 5000.0;
        assert_eq!(goal.progress_percent(), 100.0);
        goal.target_amount = 0.0;
        assert_eq!(goal.progress_percent(), 100.0);
        goal.base_savings = 0.0;
        assert_eq!(goal.progress_percent(), 0.0);
    }

    #[test]
    fn days_left_never_negative() {
        let goal = goal();
        assert_eq!(goal.days_left(date(2029, 12, 31)), 1);
        assert_eq!(goal.days_left(date(2030, 1, 1)), 0);
        assert_eq!(goal.days_left(date(2031, 6, 1)), 0);
    }

    #[test]
    fn document_layout_uses_stored_names() {
        let mut goal = goal();
        goal.push_transaction(
            GoalTransaction::new(2, GoalTransactionKind::RecurringContribution, "Jan", 100.0, "t")
                .in_month(MonthKey::parse("2024-01").unwrap()),
        );
        let value = serde_json::to_value(&goal).unwrap();
        assert_eq!(value["budgetName"], "Trip");
        assert_eq!(value["category"], "");
        assert_eq!(value["endDate"], "2030-01-01");
        assert_eq!(value["expenses"][0]["type"], "monthly");
        assert_eq!(value["expenses"][0]["month"], "2024-01");

        let back: Goal = serde_json::from_value(value).unwrap();
        assert_eq!(back, goal);
    }

    #[test]
    fn legacy_records_without_month_still_load() {
        let json = r#"{"id":5,"budgetName":"Car","category":"Travel","currency":"THB (฿)",
            "targetAmount":500,"baseSavings":20,"endDate":"2031-02-03",
            "expenses":[{"id":6,"type":"monthly","note":"Feb","amount":20,"timestamp":"x"}]}"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.category.as_deref(), Some("Travel"));
        assert_eq!(goal.transactions[0].month, None);
        assert!(goal.transactions[0].is_recurring());
        assert_eq!(goal.max_id(), 6);
    }
}
