//! Keeps recurring goal contributions and their month-ledger twins in step.
//!
//! A recurring contribution lives in two places under one id: the goal's log
//! and the `wantsExpenses` sequence of the month that was active when it was
//! recorded. Every write in this module touches both, then persists them in a
//! fixed order: months before goals on create, goals before months on delete.
//! A failed first write skips the second; memory is never rolled back.

use std::fmt;

use tracing::{info, warn};
use trio_domain::{
    Entry, EntryCategory, Goal, GoalTransaction, GoalTransactionKind, MonthBook, MonthKey,
    RecordId,
};

use crate::{goal_service::GoalService, storage::PersistenceGateway, CoreError};

/// Mismatch found between goal logs and month ledgers.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityIssue {
    MissingTwin {
        goal_id: RecordId,
        transaction_id: RecordId,
    },
    TwinMismatch {
        goal_id: RecordId,
        transaction_id: RecordId,
        month: MonthKey,
    },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::MissingTwin {
                goal_id,
                transaction_id,
            } => write!(
                f,
                "recurring contribution {transaction_id} of goal {goal_id} has no month entry"
            ),
            IntegrityIssue::TwinMismatch {
                goal_id,
                transaction_id,
                month,
            } => write!(
                f,
                "month entry {transaction_id} in {month} differs from its contribution in goal {goal_id}"
            ),
        }
    }
}

pub struct LedgerCoordinator<'a> {
    months: &'a mut MonthBook,
    goals: &'a mut Vec<Goal>,
    gateway: &'a PersistenceGateway,
}

impl<'a> LedgerCoordinator<'a> {
    pub fn new(
        months: &'a mut MonthBook,
        goals: &'a mut Vec<Goal>,
        gateway: &'a PersistenceGateway,
    ) -> Self {
        Self {
            months,
            goals,
            gateway,
        }
    }

    /// Records `txn` as a recurring contribution of `goal_id` with its twin in
    /// `month`. The goal must exist; nothing changes when it does not.
    pub fn record_recurring(
        &mut self,
        goal_id: RecordId,
        month: MonthKey,
        txn: GoalTransaction,
    ) -> Result<GoalTransaction, CoreError> {
        GoalService::find(&*self.goals, goal_id)?;
        let mut txn = txn.in_month(month);
        txn.kind = GoalTransactionKind::RecurringContribution;

        let twin = Entry::new(txn.id, txn.note.clone(), txn.amount, txn.created_at.clone());
        self.months
            .entry(month)
            .or_default()
            .push(EntryCategory::Discretionary, twin);
        let txn = GoalService::append_transaction(&mut *self.goals, goal_id, txn)?;
        info!(goal_id, transaction_id = txn.id, %month, amount = txn.amount, "recurring contribution recorded");

        self.gateway.save_months(&*self.months)?;
        self.gateway.save_goals(&*self.goals)?;
        Ok(txn)
    }

    /// Removes a goal transaction, and its twin when it is recurring.
    /// `Ok(None)` when the goal holds no such transaction.
    pub fn remove_goal_transaction(
        &mut self,
        goal_id: RecordId,
        txn_id: RecordId,
    ) -> Result<Option<GoalTransaction>, CoreError> {
        let Some(txn) = GoalService::remove_transaction(&mut *self.goals, goal_id, txn_id)? else {
            return Ok(None);
        };
        let detached = if txn.is_recurring() {
            self.detach_twin(&txn)
        } else {
            None
        };
        if txn.is_recurring() && detached.is_none() {
            warn!(goal_id, transaction_id = txn_id, "recurring contribution had no month entry");
        }

        self.gateway.save_goals(&*self.goals)?;
        if detached.is_some() {
            self.gateway.save_months(&*self.months)?;
        }
        Ok(Some(txn))
    }

    /// Removes a month entry. A discretionary entry that is the twin of a
    /// recurring contribution takes the goal transaction with it.
    pub fn remove_month_entry(
        &mut self,
        month: MonthKey,
        category: EntryCategory,
        id: RecordId,
    ) -> Result<Option<Entry>, CoreError> {
        let Some(entry) = self
            .months
            .get(&month)
            .and_then(|record| record.find(category, id))
            .cloned()
        else {
            return Ok(None);
        };

        if category == EntryCategory::Discretionary {
            if let Some(goal_id) = GoalService::owner_of_recurring(&*self.goals, id) {
                self.remove_goal_transaction(goal_id, id)?;
                return Ok(Some(entry));
            }
        }

        if let Some(record) = self.months.get_mut(&month) {
            record.remove(category, id);
        }
        self.gateway.save_months(&*self.months)?;
        Ok(Some(entry))
    }

    /// Deletes the goal and every twin entry of its recurring contributions.
    pub fn delete_goal(&mut self, goal_id: RecordId) -> Result<Goal, CoreError> {
        let goal = GoalService::delete(&mut *self.goals, goal_id)?;
        let detached = goal
            .recurring_transactions()
            .filter_map(|txn| self.detach_twin(txn))
            .count();
        info!(goal_id, twins = detached, "goal deleted with its month entries");

        self.gateway.save_goals(&*self.goals)?;
        if detached > 0 {
            self.gateway.save_months(&*self.months)?;
        }
        Ok(goal)
    }

    pub fn integrity_report(&self) -> Vec<IntegrityIssue> {
        integrity_issues(&*self.months, &*self.goals)
    }

    /// Drops the twin of `txn`, looking in its stored month first and then in
    /// every month for records written without one.
    fn detach_twin(&mut self, txn: &GoalTransaction) -> Option<MonthKey> {
        if let Some(month) = txn.month {
            let removed = self
                .months
                .get_mut(&month)
                .and_then(|record| record.remove(EntryCategory::Discretionary, txn.id));
            if removed.is_some() {
                return Some(month);
            }
        }
        let month = self
            .months
            .iter()
            .find(|(_, record)| record.find(EntryCategory::Discretionary, txn.id).is_some())
            .map(|(month, _)| *month)?;
        self.months
            .get_mut(&month)?
            .remove(EntryCategory::Discretionary, txn.id)
            .map(|_| month)
    }
}

/// Lists recurring contributions whose twin is missing or disagrees with them.
pub fn integrity_issues(months: &MonthBook, goals: &[Goal]) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    for goal in goals {
        for txn in goal.recurring_transactions() {
            let twin = txn
                .month
                .and_then(|month| {
                    months
                        .get(&month)
                        .and_then(|record| record.find(EntryCategory::Discretionary, txn.id))
                        .map(|entry| (month, entry))
                })
                .or_else(|| {
                    months.iter().find_map(|(month, record)| {
                        record
                            .find(EntryCategory::Discretionary, txn.id)
                            .map(|entry| (*month, entry))
                    })
                });
            match twin {
                None => issues.push(IntegrityIssue::MissingTwin {
                    goal_id: goal.id,
                    transaction_id: txn.id,
                }),
                Some((month, entry)) if entry.amount != txn.amount || entry.note != txn.note => {
                    issues.push(IntegrityIssue::TwinMismatch {
                        goal_id: goal.id,
                        transaction_id: txn.id,
                        month,
                    })
                }
                Some(_) => {}
            }
        }
    }
    issues
}
