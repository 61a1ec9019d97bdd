//! Transactions over the in-memory store.
//!
//! A transaction owns the store's mutex guard from `begin()` until it is
//! dropped, so transactions never interleave. The first write takes a full
//! snapshot of the state; if the transaction is dropped before `commit()`,
//! the snapshot is put back.

use super::inner::InMemoryStoreInner;
use crate::domain::{
    DependencyId, DependencyStatus, Milestone, MilestoneDependency, MilestoneId, MilestoneStatus,
    NewDependency, NewMilestone, NewProject, Project, ProjectId, UserId,
};
use crate::error::{Error, Result, StorageError};
use crate::storage::StoreTransaction;
use async_trait::async_trait;
use chrono::Utc;
use petgraph::Direction;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// Exclusive unit of work on an in-memory store
pub(crate) struct InMemoryTransaction {
    guard: OwnedMutexGuard<InMemoryStoreInner>,
    snapshot: Option<InMemoryStoreInner>,
    committed: bool,
}

impl InMemoryTransaction {
    pub(super) fn new(guard: OwnedMutexGuard<InMemoryStoreInner>) -> Self {
        Self {
            guard,
            snapshot: None,
            committed: false,
        }
    }

    /// Mutable access to the state, snapshotting it on the first write.
    fn write(&mut self) -> Result<&mut InMemoryStoreInner> {
        if self.committed {
            return Err(StorageError::TransactionClosed.into());
        }
        if self.snapshot.is_none() {
            self.snapshot = Some((*self.guard).clone());
        }
        Ok(&mut *self.guard)
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            if !self.committed {
                debug!("Rolling back uncommitted transaction");
                *self.guard = snapshot;
            }
        }
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    // ========== Projects ==========

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>> {
        Ok(self.guard.projects.get(id).cloned())
    }

    async fn create_project(&mut self, project: NewProject) -> Result<Project> {
        let seed = format!("{}|{}", project.name, project.founder_id);
        let mut project = Project {
            id: ProjectId::new(""),
            name: project.name,
            founder_id: project.founder_id,
            team_lead_id: project.team_lead_id,
            core_team_member_ids: project.core_team_member_ids,
            created_at: Utc::now(),
        };
        project.validate().map_err(Error::Validation)?;

        let inner = self.write()?;
        project.id = inner.generate_project_id(&seed)?;
        inner.put_project(project.clone());
        Ok(project)
    }

    // ========== Milestones ==========

    async fn get_milestone(&self, id: &MilestoneId) -> Result<Option<Milestone>> {
        Ok(self.guard.milestones.get(id).cloned())
    }

    async fn create_milestone(&mut self, milestone: NewMilestone) -> Result<Milestone> {
        let seed = format!("{}|{}", milestone.project_id, milestone.title);
        let now = Utc::now();
        let mut milestone = Milestone {
            id: MilestoneId::new(""),
            project_id: milestone.project_id,
            title: milestone.title,
            status: MilestoneStatus::NotStarted,
            due_date: milestone.due_date,
            progress: 0,
            priority: milestone.priority,
            created_at: now,
            updated_at: now,
        };
        milestone.validate().map_err(Error::Validation)?;

        let inner = self.write()?;
        if !inner.projects.contains_key(&milestone.project_id) {
            return Err(Error::ProjectNotFound(milestone.project_id));
        }
        milestone.id = inner.generate_milestone_id(&seed)?;
        inner.put_milestone(milestone.clone());
        Ok(milestone)
    }

    async fn set_milestone_status(
        &mut self,
        id: &MilestoneId,
        status: MilestoneStatus,
    ) -> Result<Milestone> {
        let inner = self.write()?;
        let milestone = inner
            .milestones
            .get_mut(id)
            .ok_or_else(|| Error::MilestoneNotFound(id.clone()))?;

        milestone.status = status;
        milestone.updated_at = Utc::now();
        Ok(milestone.clone())
    }

    async fn project_milestones(&self, project: &ProjectId) -> Result<Vec<Milestone>> {
        let mut milestones: Vec<Milestone> = self
            .guard
            .milestones
            .values()
            .filter(|m| m.project_id == *project)
            .cloned()
            .collect();
        milestones.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(milestones)
    }

    // ========== Dependencies ==========

    async fn get_dependency(&self, id: &DependencyId) -> Result<Option<MilestoneDependency>> {
        Ok(self.guard.dependencies.get(id).cloned())
    }

    async fn find_dependency(
        &self,
        predecessor: &MilestoneId,
        successor: &MilestoneId,
    ) -> Result<Option<MilestoneDependency>> {
        Ok(self.guard.find_edge(predecessor, successor).cloned())
    }

    async fn dependencies_into(&self, successor: &MilestoneId) -> Result<Vec<MilestoneDependency>> {
        Ok(self.guard.edges_of(successor, Direction::Incoming))
    }

    async fn dependencies_from(
        &self,
        predecessor: &MilestoneId,
    ) -> Result<Vec<MilestoneDependency>> {
        Ok(self.guard.edges_of(predecessor, Direction::Outgoing))
    }

    async fn insert_dependency(
        &mut self,
        dependency: NewDependency,
        created_by: &UserId,
    ) -> Result<MilestoneDependency> {
        let inner = self.write()?;
        for endpoint in [&dependency.predecessor_id, &dependency.successor_id] {
            if !inner.milestones.contains_key(endpoint) {
                return Err(Error::MilestoneNotFound(endpoint.clone()));
            }
        }

        let id = inner.generate_dependency_id(&format!(
            "{}|{}",
            dependency.predecessor_id, dependency.successor_id
        ))?;
        let now = Utc::now();
        let dependency = MilestoneDependency {
            id,
            predecessor_id: dependency.predecessor_id,
            successor_id: dependency.successor_id,
            kind: dependency.kind,
            lag_days: dependency.lag_days,
            description: dependency.description,
            status: DependencyStatus::Active,
            is_hard_constraint: dependency.is_hard_constraint,
            criticality_level: dependency.criticality_level,
            created_by: created_by.clone(),
            created_at: now,
            updated_at: now,
            satisfied_at: None,
            blocked_at: None,
        };

        inner.put_dependency(dependency.clone());
        Ok(dependency)
    }

    async fn save_dependency(&mut self, dependency: &MilestoneDependency) -> Result<()> {
        let inner = self.write()?;
        let existing = inner
            .dependencies
            .get_mut(&dependency.id)
            .ok_or_else(|| Error::DependencyNotFound(dependency.id.clone()))?;

        // Endpoints are fixed once an edge exists; the graph index relies on it.
        if existing.predecessor_id != dependency.predecessor_id
            || existing.successor_id != dependency.successor_id
        {
            return Err(Error::Validation(
                "Dependency endpoints cannot be changed".to_string(),
            ));
        }

        *existing = dependency.clone();
        Ok(())
    }

    async fn delete_dependency(&mut self, id: &DependencyId) -> Result<MilestoneDependency> {
        let inner = self.write()?;
        inner
            .take_dependency(id)
            .ok_or_else(|| Error::DependencyNotFound(id.clone()))
    }

    // ========== Lifecycle ==========

    async fn commit(&mut self) -> Result<()> {
        if self.committed {
            return Err(StorageError::TransactionClosed.into());
        }
        self.committed = true;
        self.snapshot = None;
        Ok(())
    }
}
