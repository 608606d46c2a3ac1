//! Persistence collaborator interface and an in-memory implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use story_bible::{ProjectId, ProjectRecord};
use tokio::sync::RwLock;

use crate::error::PersistenceError;

/// Read access to persisted projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Fetch a project record. `Ok(None)` when the project does not exist.
    async fn fetch_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, PersistenceError>;
}

/// Project store held in memory, ingesting records through the normalizing decoder.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    records: RwLock<HashMap<ProjectId, ProjectRecord>>,
}

impl InMemoryProjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub async fn insert(&self, id: ProjectId, record: ProjectRecord) {
        self.records.write().await.insert(id, record);
    }

    /// Insert or replace a record from its stored JSON form.
    pub async fn insert_json(&self, id: ProjectId, json: &str) -> Result<(), PersistenceError> {
        let record = ProjectRecord::from_json(json).map_err(|source| PersistenceError::Corrupt {
            project: id,
            source,
        })?;
        self.insert(id, record).await;
        Ok(())
    }

    /// Replace the plot points of one unit of an existing project.
    pub async fn save_plot_points(
        &self,
        id: &ProjectId,
        unit_key: &str,
        plot_points: Vec<String>,
    ) -> Result<(), PersistenceError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| PersistenceError::Other(format!("Project {} not found", id)))?;
        record.set_plot_points(unit_key, plot_points);
        Ok(())
    }

    /// Remove a record.
    pub async fn remove(&self, id: &ProjectId) -> Option<ProjectRecord> {
        self.records.write().await.remove(id)
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn fetch_project(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, PersistenceError> {
        Ok(self.records.read().await.get(id).cloned())
    }
}
