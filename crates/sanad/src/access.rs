//! Project access control.
//!
//! The dependency manager asks an [`AccessPolicy`] whether the acting user may
//! touch a project before reading or changing any edge between its milestones.
//! The policy sees an already-loaded [`Project`], so it never needs its own
//! trip to storage.

use crate::domain::{Project, UserId};

/// Decides whether a user may read or modify a project's dependency graph.
pub trait AccessPolicy: Send + Sync {
    /// Returns `true` if `user` has access to `project`.
    fn has_access(&self, user: &UserId, project: &Project) -> bool;
}

/// Grants access to the founder, the team lead, and core team members.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectMembership;

impl AccessPolicy for ProjectMembership {
    fn has_access(&self, user: &UserId, project: &Project) -> bool {
        project.is_member(user)
    }
}
