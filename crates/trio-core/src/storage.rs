use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock},
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use trio_domain::{AllocationPolicy, Goal, MonthBook};

use crate::{state::BudgetState, CoreError};

/// Names of the three independently stored documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    MonthlyRecords,
    Goals,
    AllocationPolicy,
}

impl DocumentKey {
    pub const ALL: [DocumentKey; 3] = [
        DocumentKey::MonthlyRecords,
        DocumentKey::Goals,
        DocumentKey::AllocationPolicy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKey::MonthlyRecords => "monthlyRecords",
            DocumentKey::Goals => "wantsBudgets",
            DocumentKey::AllocationPolicy => "budgetPercents",
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstraction over durable key-value backends holding the JSON documents.
pub trait DocumentStore: Send + Sync {
    /// Returns `None` when nothing was ever written under `key`.
    fn read(&self, key: DocumentKey) -> Result<Option<String>, CoreError>;
    fn write(&self, key: DocumentKey, contents: &str) -> Result<(), CoreError>;
}

/// Volatile store used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<DocumentKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, key: DocumentKey, contents: impl Into<String>) -> Self {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(key, contents.into());
        }
        self
    }

    pub fn contents(&self, key: DocumentKey) -> Option<String> {
        self.documents
            .read()
            .ok()
            .and_then(|documents| documents.get(&key).cloned())
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: DocumentKey) -> Result<Option<String>, CoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| CoreError::Persistence("memory store lock poisoned".into()))?;
        Ok(documents.get(&key).cloned())
    }

    fn write(&self, key: DocumentKey, contents: &str) -> Result<(), CoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| CoreError::Persistence("memory store lock poisoned".into()))?;
        documents.insert(key, contents.to_string());
        Ok(())
    }
}

/// Typed access to the three documents on top of a [`DocumentStore`].
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn DocumentStore>,
}

impl fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceGateway").finish_non_exhaustive()
    }
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Loads every document, falling back to empty collections and
    /// `default_allocation` for documents never written.
    pub fn load_state(&self, default_allocation: AllocationPolicy) -> Result<BudgetState, CoreError> {
        let months: MonthBook = self.load(DocumentKey::MonthlyRecords)?.unwrap_or_default();
        let goals: Vec<Goal> = self.load(DocumentKey::Goals)?.unwrap_or_default();
        let allocation = match self.load::<AllocationPolicy>(DocumentKey::AllocationPolicy)? {
            Some(policy) if policy.is_balanced() => policy,
            Some(policy) => {
                warn!(
                    stored = %policy,
                    fallback = %default_allocation,
                    "stored allocation does not add up to 100; using default"
                );
                default_allocation
            }
            None => default_allocation,
        };
        debug!(
            months = months.len(),
            goals = goals.len(),
            %allocation,
            "loaded budget documents"
        );
        Ok(BudgetState {
            allocation,
            months,
            goals,
        })
    }

    pub fn save_months(&self, months: &MonthBook) -> Result<(), CoreError> {
        self.save(DocumentKey::MonthlyRecords, months)
    }

    pub fn save_goals(&self, goals: &[Goal]) -> Result<(), CoreError> {
        self.save(DocumentKey::Goals, goals)
    }

    pub fn save_allocation(&self, allocation: &AllocationPolicy) -> Result<(), CoreError> {
        self.save(DocumentKey::AllocationPolicy, allocation)
    }

    /// Writes all three documents, stopping at the first failure.
    pub fn save_state(&self, state: &BudgetState) -> Result<(), CoreError> {
        self.save_months(&state.months)?;
        self.save_goals(&state.goals)?;
        self.save_allocation(&state.allocation)
    }

    fn load<T: DeserializeOwned>(&self, key: DocumentKey) -> Result<Option<T>, CoreError> {
        match self.store.read(key)? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|err| CoreError::Serde(format!("{key}: {err}"))),
            _ => Ok(None),
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: DocumentKey, value: &T) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| CoreError::Serde(format!("{key}: {err}")))?;
        self.store.write(key, &json)?;
        debug!(document = %key, bytes = json.len(), "document saved");
        Ok(())
    }
}
