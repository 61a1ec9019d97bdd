//! The milestone dependency graph manager.
//!
//! [`DependencyManager`] owns the rules of the graph:
//!
//! - no self-loops, no duplicate (predecessor, successor) pairs, no cycles
//! - every mutation re-derives the successor's status from its incoming
//!   edges (see [`propagation`])
//! - callers must have access to the projects of every milestone they touch
//!
//! Each operation runs in a single store transaction. Validation, the
//! duplicate and cycle checks, the write, and propagation either all take
//! effect or none do, and concurrent callers are serialized by the store.
//!
//! # Example
//!
//! ```no_run
//! use sanad::access::ProjectMembership;
//! use sanad::domain::{NewDependency, UserId};
//! use sanad::manager::DependencyManager;
//! use sanad::storage::in_memory::new_in_memory_store;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let manager = DependencyManager::new(new_in_memory_store(), Arc::new(ProjectMembership));
//!     let user = UserId::new("amal");
//!
//!     let edge = manager
//!         .create_dependency(&user, NewDependency::finish_to_start("ms-a1b2", "ms-c3d4"))
//!         .await?;
//!     println!("Created {}", edge.id);
//!     Ok(())
//! }
//! ```

mod cycle;
mod hotspots;
pub mod propagation;
pub mod views;

use crate::access::AccessPolicy;
use crate::domain::{
    DependencyId, DependencyUpdate, Milestone, MilestoneDependency, MilestoneId, MilestoneStatus,
    NewDependency, Project, ProjectId, UserId,
};
use crate::error::{Error, Result};
use crate::storage::{MilestoneStore, StoreTransaction};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub use propagation::StatusChange;
pub use views::{DependencyCounts, MilestoneDependencies, ProjectDependencyOverview};

/// How far a status change travels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationMode {
    /// Only the directly affected milestone is re-evaluated
    #[default]
    Direct,

    /// Changes ripple to downstream successors, breadth first
    Cascade,
}

impl fmt::Display for PropagationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::Cascade => "cascade",
        })
    }
}

/// Maintains the dependency edges between milestones.
///
/// Cheap to clone; clones share the store and access policy.
#[derive(Clone)]
pub struct DependencyManager {
    store: Arc<dyn MilestoneStore>,
    access: Arc<dyn AccessPolicy>,
    mode: PropagationMode,
}

impl fmt::Debug for DependencyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyManager")
            .field("store", &"<dyn MilestoneStore>")
            .field("access", &"<dyn AccessPolicy>")
            .field("mode", &self.mode)
            .finish()
    }
}

impl DependencyManager {
    /// Create a manager using direct (one-hop) propagation.
    pub fn new(store: Arc<dyn MilestoneStore>, access: Arc<dyn AccessPolicy>) -> Self {
        Self {
            store,
            access,
            mode: PropagationMode::Direct,
        }
    }

    /// Use the given propagation mode.
    #[must_use]
    pub fn with_mode(mut self, mode: PropagationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Current propagation mode.
    pub fn mode(&self) -> PropagationMode {
        self.mode
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn MilestoneStore> {
        &self.store
    }

    // ========== Edge Mutations ==========

    /// Validate and insert a new edge.
    ///
    /// Checks run in this order:
    ///
    /// 1. request validation (blank IDs, self-loop, criticality), before any lookup
    /// 2. both milestones exist
    /// 3. `user` has access to both owning projects
    /// 4. no edge exists for the same ordered pair
    /// 5. the edge would not close a cycle
    ///
    /// The edge is stored as `active`, then the successor's status is
    /// propagated.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` / `Error::SelfDependency` for a bad request
    /// - `Error::MilestoneNotFound` if either milestone is missing
    /// - `Error::AccessDenied` if `user` lacks access to either project
    /// - `Error::DuplicateDependency` if the pair already has an edge
    /// - `Error::CycleDetected` if the edge would close a cycle
    pub async fn create_dependency(
        &self,
        user: &UserId,
        request: NewDependency,
    ) -> Result<MilestoneDependency> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let predecessor = require_milestone(tx.as_ref(), &request.predecessor_id).await?;
        let successor = require_milestone(tx.as_ref(), &request.successor_id).await?;
        self.authorize(tx.as_ref(), user, &predecessor.project_id).await?;
        self.authorize(tx.as_ref(), user, &successor.project_id).await?;

        if tx
            .find_dependency(&predecessor.id, &successor.id)
            .await?
            .is_some()
        {
            return Err(Error::DuplicateDependency {
                predecessor: predecessor.id,
                successor: successor.id,
            });
        }

        if cycle::would_create_cycle(tx.as_ref(), &predecessor.id, &successor.id).await? {
            return Err(Error::CycleDetected {
                predecessor: predecessor.id,
                successor: successor.id,
            });
        }

        let dependency = tx.insert_dependency(request, user).await?;
        let changes = propagation::propagate(tx.as_mut(), &successor.id, self.mode).await?;
        tx.commit().await?;

        info!(
            dependency = %dependency.id,
            predecessor = %dependency.predecessor_id,
            successor = %dependency.successor_id,
            kind = %dependency.kind,
            status_changes = changes.len(),
            "Created dependency"
        );
        Ok(dependency)
    }

    /// Apply field changes to an edge and re-propagate its successor.
    ///
    /// Propagation always runs, even if no field changed.
    ///
    /// # Errors
    ///
    /// - `Error::DependencyNotFound` if the edge is missing
    /// - `Error::AccessDenied` if `user` lacks access to either endpoint's project
    /// - `Error::Validation` if the new criticality is out of range
    pub async fn update_dependency(
        &self,
        user: &UserId,
        id: &DependencyId,
        update: DependencyUpdate,
    ) -> Result<MilestoneDependency> {
        let mut tx = self.store.begin().await?;
        let mut dependency = self.authorize_dependency(tx.as_ref(), user, id).await?;

        let status_changed = dependency.apply_update(update, Utc::now())?;
        tx.save_dependency(&dependency).await?;
        let changes =
            propagation::propagate(tx.as_mut(), &dependency.successor_id, self.mode).await?;
        tx.commit().await?;

        info!(
            dependency = %dependency.id,
            status = %dependency.status,
            status_changed,
            status_changes = changes.len(),
            "Updated dependency"
        );
        Ok(dependency)
    }

    /// Remove an edge and re-propagate its former successor.
    ///
    /// Returns the removed edge.
    ///
    /// # Errors
    ///
    /// - `Error::DependencyNotFound` if the edge is missing
    /// - `Error::AccessDenied` if `user` lacks access to either endpoint's project
    pub async fn delete_dependency(
        &self,
        user: &UserId,
        id: &DependencyId,
    ) -> Result<MilestoneDependency> {
        let mut tx = self.store.begin().await?;
        self.authorize_dependency(tx.as_ref(), user, id).await?;

        let removed = tx.delete_dependency(id).await?;
        let changes = propagation::propagate(tx.as_mut(), &removed.successor_id, self.mode).await?;
        tx.commit().await?;

        info!(
            dependency = %removed.id,
            successor = %removed.successor_id,
            status_changes = changes.len(),
            "Deleted dependency"
        );
        Ok(removed)
    }

    // ========== Status ==========

    /// Re-derive a milestone's status from its incoming edges.
    ///
    /// Returns the status changes made (empty if nothing changed). In
    /// cascade mode this includes changes to downstream successors.
    ///
    /// # Errors
    ///
    /// Returns `Error::MilestoneNotFound` if the milestone is missing.
    pub async fn propagate_status(&self, milestone: &MilestoneId) -> Result<Vec<StatusChange>> {
        let mut tx = self.store.begin().await?;
        let changes = propagation::propagate(tx.as_mut(), milestone, self.mode).await?;
        tx.commit().await?;

        if !changes.is_empty() {
            info!(milestone = %milestone, status_changes = changes.len(), "Propagated status");
        }
        Ok(changes)
    }

    /// Set a milestone's own status.
    ///
    /// In direct mode successors are not touched; they pick the change up
    /// the next time they are propagated. In cascade mode successors are
    /// re-evaluated right away. Returns the updated milestone and any
    /// downstream changes.
    ///
    /// # Errors
    ///
    /// - `Error::MilestoneNotFound` if the milestone is missing
    /// - `Error::AccessDenied` if `user` lacks access to its project
    pub async fn set_milestone_status(
        &self,
        user: &UserId,
        milestone: &MilestoneId,
        status: MilestoneStatus,
    ) -> Result<(Milestone, Vec<StatusChange>)> {
        let mut tx = self.store.begin().await?;
        let current = require_milestone(tx.as_ref(), milestone).await?;
        self.authorize(tx.as_ref(), user, &current.project_id).await?;

        let updated = tx.set_milestone_status(milestone, status).await?;
        let changes = propagation::propagate_downstream(tx.as_mut(), milestone, self.mode).await?;
        tx.commit().await?;

        info!(
            milestone = %milestone,
            from = %current.status,
            to = %status,
            status_changes = changes.len(),
            "Set milestone status"
        );
        Ok((updated, changes))
    }

    // ========== Reads ==========

    /// Edges into and out of a milestone, plus its project's critical path.
    ///
    /// # Errors
    ///
    /// - `Error::MilestoneNotFound` if the milestone is missing
    /// - `Error::AccessDenied` if `user` lacks access to its project
    pub async fn milestone_dependencies(
        &self,
        user: &UserId,
        milestone: &MilestoneId,
    ) -> Result<MilestoneDependencies> {
        let tx = self.store.begin().await?;
        let milestone = require_milestone(tx.as_ref(), milestone).await?;
        self.authorize(tx.as_ref(), user, &milestone.project_id).await?;

        let predecessors = tx.dependencies_into(&milestone.id).await?;
        let successors = tx.dependencies_from(&milestone.id).await?;
        let critical_path = hotspots::dependency_hotspots(tx.as_ref(), &milestone.project_id).await?;

        Ok(MilestoneDependencies {
            milestone,
            predecessors,
            successors,
            critical_path,
        })
    }

    /// Every edge touching a project, with its critical path, blocked
    /// milestones, and edge counts.
    ///
    /// # Errors
    ///
    /// - `Error::ProjectNotFound` if the project is missing
    /// - `Error::AccessDenied` if `user` lacks access to it
    pub async fn project_dependencies(
        &self,
        user: &UserId,
        project: &ProjectId,
    ) -> Result<ProjectDependencyOverview> {
        let tx = self.store.begin().await?;
        self.authorize(tx.as_ref(), user, project).await?;

        let milestones = tx.project_milestones(project).await?;
        let mut edges: HashMap<DependencyId, MilestoneDependency> = HashMap::new();
        for milestone in &milestones {
            for edge in tx.dependencies_into(&milestone.id).await? {
                edges.entry(edge.id.clone()).or_insert(edge);
            }
            for edge in tx.dependencies_from(&milestone.id).await? {
                edges.entry(edge.id.clone()).or_insert(edge);
            }
        }
        let mut dependencies: Vec<MilestoneDependency> = edges.into_values().collect();
        dependencies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let critical_path = hotspots::dependency_hotspots(tx.as_ref(), project).await?;
        let blocked_milestones = milestones
            .into_iter()
            .filter(|m| m.status == MilestoneStatus::Blocked)
            .collect();

        Ok(ProjectDependencyOverview {
            project_id: project.clone(),
            counts: DependencyCounts::tally(&dependencies),
            dependencies,
            critical_path,
            blocked_milestones,
        })
    }

    // ========== Access ==========

    async fn authorize(
        &self,
        tx: &dyn StoreTransaction,
        user: &UserId,
        project_id: &ProjectId,
    ) -> Result<Project> {
        let project = tx
            .get_project(project_id)
            .await?
            .ok_or_else(|| Error::ProjectNotFound(project_id.clone()))?;

        if !self.access.has_access(user, &project) {
            return Err(Error::AccessDenied {
                user: user.clone(),
                project: project.id,
            });
        }
        Ok(project)
    }

    /// Load an edge and check access to both endpoint projects.
    async fn authorize_dependency(
        &self,
        tx: &dyn StoreTransaction,
        user: &UserId,
        id: &DependencyId,
    ) -> Result<MilestoneDependency> {
        let dependency = tx
            .get_dependency(id)
            .await?
            .ok_or_else(|| Error::DependencyNotFound(id.clone()))?;

        for endpoint in [&dependency.predecessor_id, &dependency.successor_id] {
            let milestone = require_milestone(tx, endpoint).await?;
            self.authorize(tx, user, &milestone.project_id).await?;
        }
        Ok(dependency)
    }
}

async fn require_milestone(tx: &dyn StoreTransaction, id: &MilestoneId) -> Result<Milestone> {
    tx.get_milestone(id)
        .await?
        .ok_or_else(|| Error::MilestoneNotFound(id.clone()))
}
