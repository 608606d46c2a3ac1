//! Per-project generation gate.
//!
//! Causal history is read from storage without any version check, so generating two
//! units of the same project at once can hand the later unit a history that is
//! missing the earlier unit's still-unsaved plot points. Callers hold a
//! [`ProjectGuard`] from causal load through persistence of the generated content;
//! different projects never wait on each other.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use story_bible::ProjectId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Serializes generation per project.
#[derive(Debug, Default)]
pub struct ProjectGate {
    locks: Mutex<HashMap<ProjectId, Arc<AsyncMutex<()>>>>,
}

/// Exclusive generation access to one project, released on drop.
#[derive(Debug)]
pub struct ProjectGuard {
    project: ProjectId,
    _guard: OwnedMutexGuard<()>,
}

impl ProjectGuard {
    /// The project this guard holds.
    pub fn project(&self) -> ProjectId {
        self.project
    }
}

impl ProjectGate {
    /// Create a gate with no held projects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other holder has `project`, then take it.
    pub async fn acquire(&self, project: ProjectId) -> ProjectGuard {
        let lock = {
            let mut locks = self.locks.lock();
            locks.entry(project).or_default().clone()
        };

        let guard = lock.lock_owned().await;
        debug!(project = %project, "Project gate acquired");
        ProjectGuard {
            project,
            _guard: guard,
        }
    }

    /// Take `project` if nobody holds it.
    pub fn try_acquire(&self, project: ProjectId) -> Option<ProjectGuard> {
        let lock = {
            let mut locks = self.locks.lock();
            locks.entry(project).or_default().clone()
        };

        lock.try_lock_owned().ok().map(|guard| ProjectGuard {
            project,
            _guard: guard,
        })
    }

    /// Forget projects that nobody holds or waits for.
    pub fn prune(&self) {
        self.locks
            .lock()
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of projects currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_project_is_exclusive() {
        let gate = ProjectGate::new();
        let project = ProjectId::new();

        let guard = gate.acquire(project).await;
        assert_eq!(guard.project(), project);
        assert!(gate.try_acquire(project).is_none());

        drop(guard);
        assert!(gate.try_acquire(project).is_some());
    }

    #[tokio::test]
    async fn test_different_projects_are_independent() {
        let gate = ProjectGate::new();
        let _a = gate.acquire(ProjectId::new()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), gate.acquire(ProjectId::new())).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_waiter_proceeds_after_release() {
        let gate = Arc::new(ProjectGate::new());
        let project = ProjectId::new();
        let guard = gate.acquire(project).await;

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire(project).await.project() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        assert_eq!(waiter.await.unwrap(), project);
    }

    #[tokio::test]
    async fn test_prune_drops_idle_projects() {
        let gate = ProjectGate::new();
        let held = gate.acquire(ProjectId::new()).await;
        drop(gate.acquire(ProjectId::new()).await);
        assert_eq!(gate.tracked(), 2);

        gate.prune();
        assert_eq!(gate.tracked(), 1);
        drop(held);
    }
}
