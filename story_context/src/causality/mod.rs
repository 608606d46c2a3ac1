//! Causality Loader - reconstructs what happened before the current act.
//!
//! Acts are generated independently and persisted one at a time, so the history for
//! an act is rebuilt from storage on every request:
//! 1. **Prefix**: take the acts strictly before the current one in chronological order
//! 2. **Fetch**: read the project record once
//! 3. **Collect**: concatenate each earlier act's plot points, act by act
//! 4. **Mark**: flag the final entry as the hand-off point into the current act
//!
//! Missing data is expected (earlier acts may not be generated yet) and is skipped
//! rather than treated as an error.

mod store;

pub use store::*;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use story_bible::ProjectId;
use tracing::{debug, warn};

use crate::error::ContextError;

/// One previously generated plot point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalEntry {
    pub act_key: String,
    pub act_name: String,
    pub text: String,
    /// 0-based index within its act as stored.
    pub index_within_act: usize,
    /// Set on exactly one entry: the last plot point before the current act.
    pub is_last_overall: bool,
}

/// Loads causal history from a [`ProjectStore`].
#[derive(Clone)]
pub struct CausalityLoader {
    store: Arc<dyn ProjectStore>,
}

impl CausalityLoader {
    /// Create a loader reading from the given store.
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    /// Load the plot points of every act chronologically before `current_act_key`.
    ///
    /// A missing project, or an earlier act with no stored plot points, is skipped.
    /// Errors reported by the store propagate unchanged.
    pub async fn load(
        &self,
        project_id: ProjectId,
        current_act_key: &str,
        chronological_order: &[String],
    ) -> Result<Vec<CausalEntry>, ContextError> {
        let Some(position) = chronological_order.iter().position(|k| k == current_act_key) else {
            warn!(
                project = %project_id,
                act = current_act_key,
                "Current act is not in the chronological order, no causal history loaded"
            );
            return Ok(Vec::new());
        };

        let earlier = &chronological_order[..position];
        if earlier.is_empty() {
            return Ok(Vec::new());
        }

        let Some(record) = self.store.fetch_project(&project_id).await? else {
            warn!(project = %project_id, "Project record not found, no causal history loaded");
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for act_key in earlier {
            let plot_points = record.plot_points_for(act_key);
            if plot_points.is_empty() {
                debug!(project = %project_id, act = %act_key, "No plot points stored for earlier act, skipping");
                continue;
            }

            let act_name = record.unit_name(act_key).to_string();
            entries.extend(
                plot_points
                    .iter()
                    .enumerate()
                    .filter(|(_, text)| !text.trim().is_empty())
                    .map(|(index, text)| CausalEntry {
                        act_key: act_key.clone(),
                        act_name: act_name.clone(),
                        text: text.clone(),
                        index_within_act: index,
                        is_last_overall: false,
                    }),
            );
        }

        if let Some(last) = entries.last_mut() {
            last.is_last_overall = true;
        }

        debug!(
            project = %project_id,
            act = current_act_key,
            earlier_acts = earlier.len(),
            entries = entries.len(),
            "Causal history loaded"
        );
        Ok(entries)
    }
}

impl std::fmt::Debug for CausalityLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CausalityLoader").finish_non_exhaustive()
    }
}

/// Where `build_plot_points` should load causal history from.
#[derive(Debug, Clone, Copy)]
pub struct CausalitySource<'a> {
    pub loader: &'a CausalityLoader,
    pub project_id: ProjectId,
}

impl<'a> CausalitySource<'a> {
    /// Pair a loader with a project.
    pub fn new(loader: &'a CausalityLoader, project_id: ProjectId) -> Self {
        Self { loader, project_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use async_trait::async_trait;
    use story_bible::ProjectRecord;

    fn order(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    async fn loader_with(json: &str) -> (CausalityLoader, ProjectId) {
        let store = InMemoryProjectStore::new();
        let id = ProjectId::new();
        store.insert_json(id, json).await.unwrap();
        (CausalityLoader::new(Arc::new(store)), id)
    }

    struct FailingStore;

    #[async_trait]
    impl ProjectStore for FailingStore {
        async fn fetch_project(
            &self,
            _id: &ProjectId,
        ) -> Result<Option<ProjectRecord>, PersistenceError> {
            Err(PersistenceError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_mixed_storage_shapes_in_chronological_order() {
        let (loader, id) = loader_with(
            r#"{"plotPoints": {
                "confrontation": {"1": "y", "0": "x"},
                "setup": ["s0", "s1", "s2"]
            }}"#,
        )
        .await;

        let history = loader
            .load(id, "resolution", &order(&["setup", "confrontation", "resolution"]))
            .await
            .unwrap();

        let texts: Vec<_> = history.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["s0", "s1", "s2", "x", "y"]);
        assert_eq!(history[3].act_key, "confrontation");
        assert_eq!(history[3].index_within_act, 0);
        assert_eq!(history.iter().filter(|e| e.is_last_overall).count(), 1);
        assert!(history[4].is_last_overall);
    }

    #[tokio::test]
    async fn test_first_act_has_no_history() {
        let (loader, id) = loader_with(r#"{"plotPoints": {"setup": ["a"]}}"#).await;
        let history = loader
            .load(id, "setup", &order(&["setup", "confrontation"]))
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_missing_earlier_act_is_skipped() {
        let (loader, id) = loader_with(
            r#"{
                "generatedStructure": {"setup": {"name": "The Setup", "description": ""}},
                "plotPoints": {"setup": ["a", "b"], "confrontation": []}
            }"#,
        )
        .await;

        let history = loader
            .load(id, "resolution", &order(&["setup", "confrontation", "midpoint", "resolution"]))
            .await
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].act_name, "The Setup");
        assert!(history[1].is_last_overall);
        assert!(!history[0].is_last_overall);
    }

    #[tokio::test]
    async fn test_malformed_act_is_skipped_and_others_load() {
        let (loader, id) = loader_with(
            r#"{
                "storyInput": {"title": "Skyward", "totalScenes": null},
                "generatedStructure": {"setup": {"name": "Setup", "description": null}},
                "plotPoints": {
                    "setup": ["a", "b"],
                    "confrontation": "pending",
                    "midpoint": [{"text": "c"}, "d"]
                }
            }"#,
        )
        .await;

        let history = loader
            .load(id, "resolution", &order(&["setup", "confrontation", "midpoint", "resolution"]))
            .await
            .unwrap();

        let texts: Vec<_> = history.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "d"]);
        assert_eq!(history[0].act_name, "Setup");
        assert!(history[2].is_last_overall);
    }

    #[tokio::test]
    async fn test_missing_project_is_not_fatal() {
        let loader = CausalityLoader::new(Arc::new(InMemoryProjectStore::new()));
        let history = loader
            .load(ProjectId::new(), "b", &order(&["a", "b"]))
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_current_act() {
        let (loader, id) = loader_with(r#"{"plotPoints": {"a": ["x"]}}"#).await;
        let history = loader.load(id, "zzz", &order(&["a", "b"])).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let loader = CausalityLoader::new(Arc::new(FailingStore));
        let err = loader
            .load(ProjectId::new(), "b", &order(&["a", "b"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContextError::Persistence(PersistenceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_entries_keep_stored_indices() {
        let (loader, id) = loader_with(r#"{"plotPoints": {"a": ["x", " ", "z"]}}"#).await;
        let history = loader.load(id, "b", &order(&["a", "b"])).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].index_within_act, 2);
        assert!(history[1].is_last_overall);
    }
}
