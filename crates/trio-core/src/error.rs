use chrono::NaiveDate;
use thiserror::Error;
use trio_domain::RecordId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("A note is required for {0}")]
    EmptyNote(String),
    #[error("Goal name must not be empty")]
    EmptyName,
    #[error("Allocation must add up to 100 (got {needs}/{wants}/{dream})")]
    InvalidAllocation { needs: u8, wants: u8, dream: u8 },
    #[error("End date {0} is in the past")]
    InvalidDate(NaiveDate),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Goal not found: {0}")]
    GoalNotFound(RecordId),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(RecordId),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Input was rejected before anything changed.
    pub fn is_validation(&self) -> bool {
        !self.is_persistence() && !self.is_not_found()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::GoalNotFound(_) | CoreError::TransactionNotFound(_)
        )
    }

    /// The in-memory change stands but durable storage may lag behind it.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            CoreError::Persistence(_) | CoreError::Serde(_) | CoreError::Io(_)
        )
    }
}

impl From<trio_domain::MonthKeyError> for CoreError {
    fn from(err: trio_domain::MonthKeyError) -> Self {
        CoreError::InvalidMonth(err.to_string())
    }
}
