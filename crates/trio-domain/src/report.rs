//! Read-only views handed to presentation layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    allocation::{AllocationPolicy, BucketMetrics, BudgetBucket},
    common::RecordId,
    entry::{MonthRecord, MonthTotals},
    goal::Goal,
    month::MonthKey,
};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
/// One amount per allocation bucket.
pub struct BucketAmounts {
    pub essentials: f64,
    pub discretionary: f64,
    pub savings: f64,
}

impl BucketAmounts {
    pub fn from_fn(mut f: impl FnMut(BudgetBucket) -> f64) -> Self {
        Self {
            essentials: f(BudgetBucket::Essentials),
            discretionary: f(BudgetBucket::Discretionary),
            savings: f(BudgetBucket::Savings),
        }
    }

    pub fn get(&self, bucket: BudgetBucket) -> f64 {
        match bucket {
            BudgetBucket::Essentials => self.essentials,
            BudgetBucket::Discretionary => self.discretionary,
            BudgetBucket::Savings => self.savings,
        }
    }

    pub fn total(&self) -> f64 {
        self.essentials + self.discretionary + self.savings
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Budget state of a single month under an allocation policy.
pub struct MonthOverview {
    pub month: MonthKey,
    pub allocation: AllocationPolicy,
    pub totals: MonthTotals,
    pub buckets: Vec<BucketMetrics>,
}

impl MonthOverview {
    pub fn build(month: MonthKey, record: &MonthRecord, allocation: AllocationPolicy) -> Self {
        let totals = record.totals();
        let buckets = BudgetBucket::ALL
            .iter()
            .map(|bucket| {
                BucketMetrics::from_parts(
                    *bucket,
                    allocation.percent(*bucket),
                    allocation.recommended_amount(*bucket, totals.income),
                    totals.used(*bucket),
                )
            })
            .collect();
        Self {
            month,
            allocation,
            totals,
            buckets,
        }
    }

    pub fn bucket(&self, bucket: BudgetBucket) -> Option<&BucketMetrics> {
        self.buckets.iter().find(|metrics| metrics.bucket == bucket)
    }

    pub fn remaining(&self) -> BucketAmounts {
        BucketAmounts::from_fn(|bucket| {
            self.bucket(bucket)
                .map(|metrics| metrics.remaining)
                .unwrap_or_default()
        })
    }

    pub fn total_remaining(&self) -> f64 {
        self.remaining().total()
    }

    pub fn expense(&self) -> f64 {
        self.totals.expense()
    }

    pub fn balance(&self) -> f64 {
        self.totals.balance()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One row of the month history.
pub struct MonthSummary {
    pub month: MonthKey,
    pub income: f64,
    pub essentials_used: f64,
    pub discretionary_used: f64,
    pub savings_used: f64,
    pub expense: f64,
    pub balance: f64,
}

impl MonthSummary {
    pub fn from_record(month: MonthKey, record: &MonthRecord) -> Self {
        let totals = record.totals();
        Self {
            month,
            income: totals.income,
            essentials_used: totals.essentials_used,
            discretionary_used: totals.discretionary_used,
            savings_used: totals.savings_used,
            expense: totals.expense(),
            balance: totals.balance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Progress snapshot of a goal on a given day.
pub struct GoalProgress {
    pub goal_id: RecordId,
    pub name: String,
    pub currency_label: String,
    pub base_savings: f64,
    pub target_amount: f64,
    pub remaining_amount: f64,
    pub progress_percent: f64,
    pub days_left: i64,
    pub transaction_count: usize,
}

impl GoalProgress {
    pub fn for_goal(goal: &Goal, today: NaiveDate) -> Self {
        Self {
            goal_id: goal.id,
            name: goal.name.clone(),
            currency_label: goal.currency_label.clone(),
            base_savings: goal.base_savings,
            target_amount: goal.target_amount,
            remaining_amount: goal.remaining_amount(),
            progress_percent: goal.progress_percent(),
            days_left: goal.days_left(today),
            transaction_count: goal.transactions.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, EntryCategory};

    #[test]
    fn overview_matches_default_policy_example() {
        let month = MonthKey::parse("2024-01").unwrap();
        let mut record = MonthRecord::default();
        record.push(EntryCategory::Income, Entry::new(1, "", 1000.0, "t"));
        record.push(EntryCategory::Essentials, Entry::new(2, "rent", 300.0, "t"));

        let overview = MonthOverview::build(month, &record, AllocationPolicy::default());
        let essentials = overview.bucket(BudgetBucket::Essentials).unwrap();
        assert_eq!(essentials.recommended, 500.0);
        assert_eq!(essentials.remaining, 200.0);
        assert_eq!(essentials.percent_used, 60.0);
        assert_eq!(overview.remaining().discretionary, 300.0);
        assert_eq!(overview.total_remaining(), 700.0);
        assert_eq!(overview.balance(), 700.0);
    }

    #[test]
    fn empty_month_reports_zero_usage() {
        let month = MonthKey::parse("2024-02").unwrap();
        let overview = MonthOverview::build(month, &MonthRecord::default(), AllocationPolicy::default());
        assert!(overview.buckets.iter().all(|metrics| metrics.percent_used == 0.0));
        assert_eq!(overview.total_remaining(), 0.0);
    }
}
