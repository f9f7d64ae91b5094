//! Savings goal collection and the per-goal transaction logs.

use chrono::NaiveDate;
use tracing::info;
use trio_domain::{
    Goal, GoalBalance, GoalDraft, GoalProgress, GoalTransaction, GoalTransactionKind, RecordId,
};

use crate::{validation, CoreError};

/// Slack for float noise when checking an edited goal against its log.
const BALANCE_TOLERANCE: f64 = 1e-9;

pub struct GoalService;

impl GoalService {
    pub fn create(
        goals: &mut Vec<Goal>,
        id: RecordId,
        draft: GoalDraft,
        today: NaiveDate,
    ) -> Result<Goal, CoreError> {
        let draft = validation::validate_draft(draft, today)?;
        let goal = Goal::from_draft(id, draft);
        info!(goal_id = goal.id, name = %goal.name, "goal created");
        goals.push(goal.clone());
        Ok(goal)
    }

    /// Replaces metadata and aggregates; the transaction log is kept as is.
    ///
    /// The new aggregates must still cover what the log has added to them,
    /// otherwise removing a logged transaction later would drive them below zero.
    pub fn update(
        goals: &mut [Goal],
        id: RecordId,
        draft: GoalDraft,
        today: NaiveDate,
    ) -> Result<Goal, CoreError> {
        let draft = validation::validate_draft(draft, today)?;
        let goal = Self::find_mut(goals, id)?;
        let requested = GoalBalance::new(draft.base_savings, draft.target_amount);
        let opening = goal.opening_balance_from(requested);
        if opening.base_savings < -BALANCE_TOLERANCE {
            return Err(CoreError::InvalidAmount(format!(
                "base savings {:.2} is below the {:.2} already contributed",
                requested.base_savings,
                requested.base_savings - opening.base_savings
            )));
        }
        if opening.target_amount < -BALANCE_TOLERANCE {
            return Err(CoreError::InvalidAmount(format!(
                "target {:.2} is below the {:.2} already added by adjustments",
                requested.target_amount,
                requested.target_amount - opening.target_amount
            )));
        }
        goal.apply_draft(draft);
        info!(goal_id = id, "goal updated");
        Ok(goal.clone())
    }

    /// Removes the goal with its log. Month ledgers are not touched.
    pub fn delete(goals: &mut Vec<Goal>, id: RecordId) -> Result<Goal, CoreError> {
        let index = goals
            .iter()
            .position(|goal| goal.id == id)
            .ok_or(CoreError::GoalNotFound(id))?;
        let goal = goals.remove(index);
        info!(goal_id = id, transactions = goal.transactions.len(), "goal deleted");
        Ok(goal)
    }

    pub fn find(goals: &[Goal], id: RecordId) -> Result<&Goal, CoreError> {
        goals
            .iter()
            .find(|goal| goal.id == id)
            .ok_or(CoreError::GoalNotFound(id))
    }

    pub fn find_mut(goals: &mut [Goal], id: RecordId) -> Result<&mut Goal, CoreError> {
        goals
            .iter_mut()
            .find(|goal| goal.id == id)
            .ok_or(CoreError::GoalNotFound(id))
    }

    /// Validates user input and builds the transaction without touching any goal.
    pub fn prepare_transaction(
        id: RecordId,
        kind: GoalTransactionKind,
        note: &str,
        amount: f64,
        created_at: String,
    ) -> Result<GoalTransaction, CoreError> {
        let amount = validation::validate_amount(amount)?;
        let note = validation::normalize_note(note, true, "goal transactions")?;
        Ok(GoalTransaction::new(id, kind, note, amount, created_at))
    }

    /// Applies `txn` to the goal's aggregates and appends it to the log.
    pub fn append_transaction(
        goals: &mut [Goal],
        goal_id: RecordId,
        txn: GoalTransaction,
    ) -> Result<GoalTransaction, CoreError> {
        let goal = Self::find_mut(goals, goal_id)?;
        goal.push_transaction(txn.clone());
        Ok(txn)
    }

    /// Reverses and drops the transaction. `Ok(None)` when the goal has no such
    /// transaction, so repeating a removal changes nothing.
    pub fn remove_transaction(
        goals: &mut [Goal],
        goal_id: RecordId,
        txn_id: RecordId,
    ) -> Result<Option<GoalTransaction>, CoreError> {
        let goal = Self::find_mut(goals, goal_id)?;
        Ok(goal.take_transaction(txn_id))
    }

    /// Goal holding the recurring contribution `txn_id`.
    pub fn owner_of_recurring(goals: &[Goal], txn_id: RecordId) -> Option<RecordId> {
        goals
            .iter()
            .find(|goal| goal.recurring_transactions().any(|txn| txn.id == txn_id))
            .map(|goal| goal.id)
    }

    pub fn progress(goal: &Goal, today: NaiveDate) -> GoalProgress {
        GoalProgress::for_goal(goal, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 1, 15)
    }

    fn seeded() -> Vec<Goal> {
        let mut goals = Vec::new();
        GoalService::create(
            &mut goals,
            1,
            GoalDraft::new("Trip", 1000.0, 0.0, date(2024, 12, 31)),
            today(),
        )
        .unwrap();
        goals
    }

    fn txn(id: RecordId, kind: GoalTransactionKind, amount: f64) -> GoalTransaction {
        GoalService::prepare_transaction(id, kind, "note", amount, "t".into()).unwrap()
    }

    #[test]
    fn target_adjustment_round_trip() {
        let mut goals = seeded();
        GoalService::append_transaction(&mut goals, 1, txn(2, GoalTransactionKind::TargetAdjustment, 50.0))
            .unwrap();
        assert_eq!(goals[0].target_amount, 1050.0);
        GoalService::remove_transaction(&mut goals, 1, 2).unwrap();
        assert_eq!(goals[0].target_amount, 1000.0);
    }

    #[test]
    fn removing_twice_is_a_no_op() {
        let mut goals = seeded();
        GoalService::append_transaction(&mut goals, 1, txn(2, GoalTransactionKind::Contribution, 40.0))
            .unwrap();
        assert!(GoalService::remove_transaction(&mut goals, 1, 2).unwrap().is_some());
        let snapshot = goals.clone();
        assert!(GoalService::remove_transaction(&mut goals, 1, 2).unwrap().is_none());
        assert_eq!(goals, snapshot);
    }

    #[test]
    fn unknown_goal_is_not_found() {
        let mut goals = seeded();
        assert!(matches!(
            GoalService::remove_transaction(&mut goals, 42, 2),
            Err(CoreError::GoalNotFound(42))
        ));
        assert!(matches!(GoalService::delete(&mut goals, 42), Err(CoreError::GoalNotFound(42))));
    }

    #[test]
    fn blank_note_and_negative_amount_are_rejected() {
        assert!(matches!(
            GoalService::prepare_transaction(2, GoalTransactionKind::Contribution, " ", 1.0, "t".into()),
            Err(CoreError::EmptyNote(_))
        ));
        assert!(matches!(
            GoalService::prepare_transaction(2, GoalTransactionKind::Contribution, "x", -1.0, "t".into()),
            Err(CoreError::InvalidAmount(_))
        ));
    }

    #[test]
    fn update_keeps_id_and_log() {
        let mut goals = seeded();
        GoalService::append_transaction(&mut goals, 1, txn(2, GoalTransactionKind::Contribution, 40.0))
            .unwrap();
        let draft = GoalDraft::new("Big trip", 2000.0, 40.0, date(2025, 6, 1)).with_category(" ");
        let updated = GoalService::update(&mut goals, 1, draft, today()).unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(updated.name, "Big trip");
        assert_eq!(updated.category, None);
        assert_eq!(updated.transactions.len(), 1);
    }

    #[test]
    fn update_below_logged_contributions_is_rejected() {
        let mut goals = seeded();
        GoalService::append_transaction(&mut goals, 1, txn(2, GoalTransactionKind::Contribution, 100.0))
            .unwrap();
        let snapshot = goals.clone();
        let draft = GoalDraft::new("Trip", 1000.0, 50.0, date(2024, 12, 31));
        assert!(matches!(
            GoalService::update(&mut goals, 1, draft, today()),
            Err(CoreError::InvalidAmount(_))
        ));
        assert_eq!(goals, snapshot);

        GoalService::remove_transaction(&mut goals, 1, 2).unwrap();
        assert_eq!(goals[0].base_savings, 0.0);
    }

    #[test]
    fn update_below_logged_adjustments_is_rejected() {
        let mut goals = seeded();
        GoalService::append_transaction(&mut goals, 1, txn(2, GoalTransactionKind::TargetAdjustment, 300.0))
            .unwrap();
        let draft = GoalDraft::new("Trip", 200.0, 0.0, date(2024, 12, 31));
        assert!(matches!(
            GoalService::update(&mut goals, 1, draft, today()),
            Err(CoreError::InvalidAmount(_))
        ));

        let draft = GoalDraft::new("Trip", 300.0, 0.0, date(2024, 12, 31));
        GoalService::update(&mut goals, 1, draft, today()).unwrap();
        GoalService::remove_transaction(&mut goals, 1, 2).unwrap();
        assert_eq!(goals[0].target_amount, 0.0);
    }

    #[test]
    fn failed_update_changes_nothing() {
        let mut goals = seeded();
        let snapshot = goals.clone();
        let draft = GoalDraft::new("Trip", 1000.0, 0.0, date(2023, 1, 1));
        assert!(GoalService::update(&mut goals, 1, draft, today()).is_err());
        assert_eq!(goals, snapshot);
    }

    #[test]
    fn owner_lookup_only_matches_recurring() {
        let mut goals = seeded();
        GoalService::append_transaction(&mut goals, 1, txn(2, GoalTransactionKind::Contribution, 1.0))
            .unwrap();
        GoalService::append_transaction(
            &mut goals,
            1,
            txn(3, GoalTransactionKind::RecurringContribution, 1.0),
        )
        .unwrap();
        assert_eq!(GoalService::owner_of_recurring(&goals, 2), None);
        assert_eq!(GoalService::owner_of_recurring(&goals, 3), Some(1));
    }
}
