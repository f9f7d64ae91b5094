use serde::{Deserialize, Serialize};
use trio_domain::{AllocationPolicy, Goal, MonthBook, RecordId};

/// The single owned root of everything the session mutates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetState {
    pub allocation: AllocationPolicy,
    pub months: MonthBook,
    pub goals: Vec<Goal>,
}

impl BudgetState {
    /// Largest id held by any entry, goal, or goal transaction.
    pub fn max_id(&self) -> Option<RecordId> {
        let month_max = self.months.values().filter_map(|record| record.max_id()).max();
        let goal_max = self.goals.iter().map(Goal::max_id).max();
        month_max.max(goal_max)
    }
}
