//! In-memory storage backend using HashMap and petgraph.
//!
//! All data is held in RAM and **lost when the process exits** unless it is
//! saved with [`save_to_jsonl`]. Tests use this backend directly as the
//! store fake.
//!
//! # Architecture
//!
//! - `HashMap`s for O(1) project, milestone, and edge lookups
//! - `petgraph::DiGraph` as the adjacency index: nodes are milestones,
//!   edges run **predecessor -> successor** and carry the dependency ID
//! - Hash-based ID generation (`prj-`, `ms-`, `dep-` prefixes)
//!
//! # Thread Safety
//!
//! State lives in `Arc<tokio::sync::Mutex<..>>`. Each transaction acquires
//! the owned guard in `begin()` and holds it until dropped, so a
//! read-check-write sequence inside one transaction cannot interleave with
//! another.

mod inner;
mod jsonl;
mod transaction;

use crate::error::Result;
use crate::storage::{MilestoneStore, StoreTransaction};
use async_trait::async_trait;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;
use transaction::InMemoryTransaction;

pub use jsonl::{GraphRecord, LoadWarning, load_from_jsonl, save_to_jsonl};

/// Thread-safe in-memory store.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn from_inner(inner: InMemoryStoreInner) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }
}

#[async_trait]
impl MilestoneStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        Ok(Box::new(InMemoryTransaction::new(guard)))
    }

    async fn save(&self) -> Result<()> {
        Ok(())
    }
}

/// Create a new, empty in-memory store.
///
/// # Example
///
/// ```
/// use sanad::storage::in_memory::new_in_memory_store;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let store = new_in_memory_store();
///     let tx = store.begin().await.unwrap();
///     // Use the transaction...
/// #   drop(tx);
/// }
/// ```
pub fn new_in_memory_store() -> Arc<dyn MilestoneStore> {
    Arc::new(InMemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MilestoneId, MilestonePriority, MilestoneStatus, NewDependency, NewMilestone, NewProject,
        ProjectId, UserId,
    };
    use crate::error::{Error, StorageError};

    async fn seeded() -> (InMemoryStore, ProjectId, MilestoneId, MilestoneId) {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let project = tx
            .create_project(NewProject {
                name: "Water Filter".to_string(),
                founder_id: UserId::new("amal"),
                team_lead_id: None,
                core_team_member_ids: vec![],
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for title in ["Design", "Build"] {
            let milestone = tx
                .create_milestone(NewMilestone {
                    project_id: project.id.clone(),
                    title: title.to_string(),
                    due_date: None,
                    priority: MilestonePriority::Medium,
                })
                .await
                .unwrap();
            ids.push(milestone.id);
        }
        tx.commit().await.unwrap();
        drop(tx);

        let b = ids.pop().unwrap();
        let a = ids.pop().unwrap();
        (store, project.id, a, b)
    }

    #[tokio::test]
    async fn generated_ids_carry_prefixes() {
        let (store, project, a, _) = seeded().await;
        assert!(project.as_str().starts_with("prj-"));
        assert!(a.as_str().starts_with("ms-"));

        let mut tx = store.begin().await.unwrap();
        let dep = tx
            .insert_dependency(NewDependency::finish_to_start(a, MilestoneId::new("ms-missing")), &UserId::new("amal"))
            .await;
        assert!(matches!(dep, Err(Error::MilestoneNotFound(_))));
    }

    #[tokio::test]
    async fn create_milestone_requires_project() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let result = tx
            .create_milestone(NewMilestone {
                project_id: ProjectId::new("prj-none"),
                title: "Orphan".to_string(),
                due_date: None,
                priority: MilestonePriority::Low,
            })
            .await;
        assert!(matches!(result, Err(Error::ProjectNotFound(_))));
    }

    #[tokio::test]
    async fn edges_are_indexed_both_ways() {
        let (store, _, a, b) = seeded().await;
        let user = UserId::new("amal");

        let mut tx = store.begin().await.unwrap();
        let dep = tx
            .insert_dependency(NewDependency::finish_to_start(a.clone(), b.clone()), &user)
            .await
            .unwrap();
        assert!(dep.id.as_str().starts_with("dep-"));

        assert_eq!(tx.dependencies_into(&b).await.unwrap(), vec![dep.clone()]);
        assert_eq!(tx.dependencies_from(&a).await.unwrap(), vec![dep.clone()]);
        assert!(tx.dependencies_into(&a).await.unwrap().is_empty());
        assert_eq!(tx.find_dependency(&a, &b).await.unwrap(), Some(dep.clone()));
        assert_eq!(tx.find_dependency(&b, &a).await.unwrap(), None);

        let removed = tx.delete_dependency(&dep.id).await.unwrap();
        assert_eq!(removed.id, dep.id);
        assert!(tx.dependencies_into(&b).await.unwrap().is_empty());
        assert!(matches!(
            tx.delete_dependency(&dep.id).await,
            Err(Error::DependencyNotFound(_))
        ));
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let (store, _, a, b) = seeded().await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_dependency(NewDependency::finish_to_start(a.clone(), b.clone()), &UserId::new("amal"))
                .await
                .unwrap();
            tx.set_milestone_status(&b, MilestoneStatus::Blocked).await.unwrap();
            // dropped without commit
        }

        let tx = store.begin().await.unwrap();
        assert!(tx.find_dependency(&a, &b).await.unwrap().is_none());
        let milestone = tx.get_milestone(&b).await.unwrap().unwrap();
        assert_eq!(milestone.status, MilestoneStatus::NotStarted);
    }

    #[tokio::test]
    async fn committed_transaction_rejects_further_writes() {
        let (store, _, _, b) = seeded().await;

        let mut tx = store.begin().await.unwrap();
        tx.commit().await.unwrap();
        let result = tx.set_milestone_status(&b, MilestoneStatus::InProgress).await;
        assert!(matches!(
            result,
            Err(Error::Storage(StorageError::TransactionClosed))
        ));
        assert!(tx.commit().await.is_err());
    }

    #[tokio::test]
    async fn save_dependency_keeps_endpoints_fixed() {
        let (store, _, a, b) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let mut dep = tx
            .insert_dependency(NewDependency::finish_to_start(a.clone(), b.clone()), &UserId::new("amal"))
            .await
            .unwrap();

        dep.lag_days = 5;
        tx.save_dependency(&dep).await.unwrap();
        assert_eq!(tx.get_dependency(&dep.id).await.unwrap().unwrap().lag_days, 5);

        dep.successor_id = a;
        assert!(matches!(
            tx.save_dependency(&dep).await,
            Err(Error::Validation(_))
        ));
    }
}
