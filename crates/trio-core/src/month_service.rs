//! Month ledger operations over the full map of stored months.

use std::cmp::Reverse;

use trio_domain::{
    percent_used, AllocationPolicy, BucketAmounts, BudgetBucket, Entry, EntryCategory, MonthBook,
    MonthKey, MonthOverview, MonthRecord, MonthSummary, MonthTotals, RecordId,
};

use crate::{validation, CoreError};

pub struct MonthLedgerService;

impl MonthLedgerService {
    /// Returns the record for `month`, creating an empty one when missing.
    /// The flag tells whether the record was just created.
    pub fn get_or_create(months: &mut MonthBook, month: MonthKey) -> (&mut MonthRecord, bool) {
        let created = !months.contains_key(&month);
        (months.entry(month).or_default(), created)
    }

    /// Validates and appends a new entry. Nothing changes when validation fails.
    pub fn add_entry(
        months: &mut MonthBook,
        month: MonthKey,
        category: EntryCategory,
        note: &str,
        amount: f64,
        id: RecordId,
        created_at: String,
    ) -> Result<Entry, CoreError> {
        let amount = validation::validate_amount(amount)?;
        let note = validation::entry_note(category, note)?;
        let entry = Entry::new(id, note, amount, created_at);
        let (record, _) = Self::get_or_create(months, month);
        record.push(category, entry.clone());
        Ok(entry)
    }

    /// Removes the entry when present; a missing month or id is a no-op.
    pub fn remove_entry(
        months: &mut MonthBook,
        month: MonthKey,
        category: EntryCategory,
        id: RecordId,
    ) -> Option<Entry> {
        months.get_mut(&month)?.remove(category, id)
    }

    pub fn totals(months: &MonthBook, month: MonthKey) -> MonthTotals {
        months
            .get(&month)
            .map(MonthRecord::totals)
            .unwrap_or_default()
    }

    /// `recommended - used` per bucket; negative when overspent.
    pub fn remaining(months: &MonthBook, month: MonthKey, policy: &AllocationPolicy) -> BucketAmounts {
        let totals = Self::totals(months, month);
        BucketAmounts::from_fn(|bucket| {
            policy.recommended_amount(bucket, totals.income) - totals.used(bucket)
        })
    }

    pub fn percent_used(
        months: &MonthBook,
        bucket: BudgetBucket,
        month: MonthKey,
        policy: &AllocationPolicy,
    ) -> f64 {
        let totals = Self::totals(months, month);
        percent_used(
            policy.recommended_amount(bucket, totals.income),
            totals.used(bucket),
        )
    }

    pub fn overview(months: &MonthBook, month: MonthKey, policy: &AllocationPolicy) -> MonthOverview {
        match months.get(&month) {
            Some(record) => MonthOverview::build(month, record, *policy),
            None => MonthOverview::build(month, &MonthRecord::default(), *policy),
        }
    }

    /// Every stored month, newest first.
    pub fn history(months: &MonthBook) -> Vec<MonthSummary> {
        let mut rows: Vec<MonthSummary> = months
            .iter()
            .map(|(month, record)| MonthSummary::from_record(*month, record))
            .collect();
        rows.sort_by_key(|row| Reverse(row.month));
        rows
    }

    /// First month whose `category` sequence holds `id`.
    pub fn find_entry_month(
        months: &MonthBook,
        category: EntryCategory,
        id: RecordId,
    ) -> Option<MonthKey> {
        months
            .iter()
            .find(|(_, record)| record.find(category, id).is_some())
            .map(|(month, _)| *month)
    }
}
