//! The root aggregate every caller goes through.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use trio_domain::{
    AllocationPolicy, BucketAmounts, BudgetBucket, Entry, EntryCategory, Goal, GoalDraft,
    GoalProgress, GoalTransaction, GoalTransactionKind, MonthBook, MonthKey, MonthOverview,
    MonthRecord, MonthSummary, MonthTotals, RecordId,
};

use crate::{
    allocation_service::AllocationService,
    clock::{display_timestamp, Clock, IdGenerator},
    coordinator::{integrity_issues, IntegrityIssue, LedgerCoordinator},
    goal_service::GoalService,
    month_service::MonthLedgerService,
    state::BudgetState,
    storage::{DocumentStore, PersistenceGateway},
    CoreError,
};

/// Owns the budget state, the active month cursor and the path to storage.
///
/// Every write validates first, then changes memory, then persists. A
/// persistence error leaves the in-memory change in place; callers may offer
/// [`BudgetSession::persist_all`] as a retry.
pub struct BudgetSession {
    state: BudgetState,
    active_month: MonthKey,
    gateway: PersistenceGateway,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
    default_allocation: AllocationPolicy,
}

impl BudgetSession {
    /// Loads the stored documents and makes the current month active.
    ///
    /// Failing to persist a freshly created current month is logged and does
    /// not prevent the session from opening.
    pub fn open(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        default_allocation: AllocationPolicy,
    ) -> Result<Self, CoreError> {
        let gateway = PersistenceGateway::new(store);
        let state = gateway.load_state(default_allocation)?;
        let ids = IdGenerator::seeded(state.max_id().unwrap_or_default());
        let active_month = MonthKey::from_date(clock.today());

        let mut session = Self {
            state,
            active_month,
            gateway,
            clock,
            ids,
            default_allocation,
        };
        for issue in session.integrity_report() {
            warn!(%issue, "ledger integrity");
        }
        if let Err(err) = session.select_month(active_month) {
            warn!(error = %err, month = %active_month, "could not persist current month");
        }
        info!(
            month = %session.active_month,
            months = session.state.months.len(),
            goals = session.state.goals.len(),
            "budget session opened"
        );
        Ok(session)
    }

    pub fn state(&self) -> &BudgetState {
        &self.state
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn allocation(&self) -> AllocationPolicy {
        self.state.allocation
    }

    pub fn set_allocation(&mut self, proposed: AllocationPolicy) -> Result<(), CoreError> {
        AllocationService::set(&mut self.state.allocation, proposed)?;
        info!(allocation = %proposed, "allocation updated");
        self.gateway.save_allocation(&self.state.allocation)
    }

    pub fn reset_allocation(&mut self) -> Result<(), CoreError> {
        self.set_allocation(self.default_allocation)
    }

    pub fn recommended_amount(&self, bucket: BudgetBucket) -> f64 {
        AllocationService::recommended_amount(&self.state.allocation, bucket, self.totals().income)
    }

    pub fn active_month(&self) -> MonthKey {
        self.active_month
    }

    /// Moves the cursor, creating and persisting the month when it is new.
    /// Returns whether a record was created.
    pub fn select_month(&mut self, month: MonthKey) -> Result<bool, CoreError> {
        self.active_month = month;
        let (_, created) = MonthLedgerService::get_or_create(&mut self.state.months, month);
        if created {
            info!(%month, "month ledger created");
            self.gateway.save_months(&self.state.months)?;
        }
        Ok(created)
    }

    pub fn next_month(&mut self) -> Result<MonthKey, CoreError> {
        let month = self.active_month.next();
        self.select_month(month)?;
        Ok(month)
    }

    pub fn previous_month(&mut self) -> Result<MonthKey, CoreError> {
        let month = self.active_month.previous();
        self.select_month(month)?;
        Ok(month)
    }

    pub fn months(&self) -> &MonthBook {
        &self.state.months
    }

    pub fn month(&self, month: MonthKey) -> Option<&MonthRecord> {
        self.state.months.get(&month)
    }

    pub fn active_record(&self) -> Option<&MonthRecord> {
        self.month(self.active_month)
    }

    pub fn entries(&self, category: EntryCategory) -> &[Entry] {
        self.active_record()
            .map(|record| record.entries(category))
            .unwrap_or_default()
    }

    pub fn add_entry(
        &mut self,
        category: EntryCategory,
        note: &str,
        amount: f64,
    ) -> Result<Entry, CoreError> {
        let now = self.clock.now();
        let id = self.ids.next(now);
        let entry = MonthLedgerService::add_entry(
            &mut self.state.months,
            self.active_month,
            category,
            note,
            amount,
            id,
            display_timestamp(now),
        )?;
        info!(month = %self.active_month, %category, id, amount, "entry added");
        self.gateway.save_months(&self.state.months)?;
        Ok(entry)
    }

    /// Removes an entry of the active month; missing ids are a no-op.
    /// A recurring contribution twin also leaves its goal.
    pub fn remove_entry(
        &mut self,
        category: EntryCategory,
        id: RecordId,
    ) -> Result<Option<Entry>, CoreError> {
        let month = self.active_month;
        let removed = self.coordinator().remove_month_entry(month, category, id)?;
        if removed.is_some() {
            info!(%month, %category, id, "entry removed");
        }
        Ok(removed)
    }

    pub fn totals(&self) -> MonthTotals {
        MonthLedgerService::totals(&self.state.months, self.active_month)
    }

    pub fn remaining(&self) -> BucketAmounts {
        MonthLedgerService::remaining(&self.state.months, self.active_month, &self.state.allocation)
    }

    pub fn percent_used(&self, bucket: BudgetBucket) -> f64 {
        MonthLedgerService::percent_used(
            &self.state.months,
            bucket,
            self.active_month,
            &self.state.allocation,
        )
    }

    pub fn overview(&self) -> MonthOverview {
        self.overview_for(self.active_month)
    }

    pub fn overview_for(&self, month: MonthKey) -> MonthOverview {
        MonthLedgerService::overview(&self.state.months, month, &self.state.allocation)
    }

    pub fn history(&self) -> Vec<MonthSummary> {
        MonthLedgerService::history(&self.state.months)
    }

    pub fn goals(&self) -> &[Goal] {
        &self.state.goals
    }

    pub fn goal(&self, id: RecordId) -> Result<&Goal, CoreError> {
        GoalService::find(&self.state.goals, id)
    }

    pub fn goal_progress(&self, id: RecordId) -> Result<GoalProgress, CoreError> {
        Ok(GoalService::progress(self.goal(id)?, self.today()))
    }

    pub fn goal_transactions(&self, id: RecordId) -> Result<&[GoalTransaction], CoreError> {
        Ok(&self.goal(id)?.transactions)
    }

    pub fn create_goal(&mut self, draft: GoalDraft) -> Result<Goal, CoreError> {
        let today = self.today();
        let id = self.ids.next(self.clock.now());
        let goal = GoalService::create(&mut self.state.goals, id, draft, today)?;
        self.gateway.save_goals(&self.state.goals)?;
        Ok(goal)
    }

    pub fn update_goal(&mut self, id: RecordId, draft: GoalDraft) -> Result<Goal, CoreError> {
        let today = self.today();
        let goal = GoalService::update(&mut self.state.goals, id, draft, today)?;
        self.gateway.save_goals(&self.state.goals)?;
        Ok(goal)
    }

    /// Deletes the goal together with the month entries of its recurring
    /// contributions.
    pub fn delete_goal(&mut self, id: RecordId) -> Result<Goal, CoreError> {
        self.coordinator().delete_goal(id)
    }

    /// Appends a transaction to a goal. Recurring contributions also land in
    /// the active month's discretionary entries under the same id.
    pub fn add_goal_transaction(
        &mut self,
        goal_id: RecordId,
        kind: GoalTransactionKind,
        note: &str,
        amount: f64,
    ) -> Result<GoalTransaction, CoreError> {
        GoalService::find(&self.state.goals, goal_id)?;
        let now = self.clock.now();
        let txn = GoalService::prepare_transaction(
            self.ids.next(now),
            kind,
            note,
            amount,
            display_timestamp(now),
        )?;
        if kind.has_twin() {
            let month = self.active_month;
            return self.coordinator().record_recurring(goal_id, month, txn);
        }
        let txn = GoalService::append_transaction(&mut self.state.goals, goal_id, txn)?;
        info!(goal_id, transaction_id = txn.id, kind = %kind, amount = txn.amount, "goal transaction added");
        self.gateway.save_goals(&self.state.goals)?;
        Ok(txn)
    }

    /// Removes a goal transaction; repeating the call is a no-op.
    pub fn remove_goal_transaction(
        &mut self,
        goal_id: RecordId,
        txn_id: RecordId,
    ) -> Result<Option<GoalTransaction>, CoreError> {
        let removed = self.coordinator().remove_goal_transaction(goal_id, txn_id)?;
        if let Some(txn) = &removed {
            info!(goal_id, transaction_id = txn.id, kind = %txn.kind, "goal transaction removed");
        }
        Ok(removed)
    }

    pub fn integrity_report(&self) -> Vec<IntegrityIssue> {
        integrity_issues(&self.state.months, &self.state.goals)
    }

    /// Writes all three documents from memory.
    pub fn persist_all(&self) -> Result<(), CoreError> {
        self.gateway.save_state(&self.state)
    }

    fn coordinator(&mut self) -> LedgerCoordinator<'_> {
        LedgerCoordinator::new(&mut self.state.months, &mut self.state.goals, &self.gateway)
    }
}
