//! Read models returned by the dependency manager.
//!
//! Field names follow the JSON wire format (`criticalPath`,
//! `blockedMilestones`, ...).

use crate::domain::{DependencyStatus, Milestone, MilestoneDependency, ProjectId};
use serde::Serialize;

/// Dependencies around a single milestone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDependencies {
    /// The milestone itself
    pub milestone: Milestone,

    /// Edges pointing at the milestone
    pub predecessors: Vec<MilestoneDependency>,

    /// Edges leaving the milestone
    pub successors: Vec<MilestoneDependency>,

    /// Hotspots of the milestone's project
    pub critical_path: Vec<Milestone>,
}

/// Dependency picture of a whole project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDependencyOverview {
    /// The project
    pub project_id: ProjectId,

    /// Every edge touching a milestone of the project, oldest first
    pub dependencies: Vec<MilestoneDependency>,

    /// Milestones that have successors or are blocked, by due date
    pub critical_path: Vec<Milestone>,

    /// Milestones currently blocked
    pub blocked_milestones: Vec<Milestone>,

    /// Edge counts by status
    pub counts: DependencyCounts,
}

/// Edge counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DependencyCounts {
    /// All edges
    pub total: usize,
    /// `active` edges
    pub active: usize,
    /// `satisfied` edges
    pub satisfied: usize,
    /// `blocked` edges
    pub blocked: usize,
    /// `cancelled` edges
    pub cancelled: usize,
}

impl DependencyCounts {
    /// Count edges by status
    pub fn tally<'a>(edges: impl IntoIterator<Item = &'a MilestoneDependency>) -> Self {
        let mut counts = Self::default();
        for edge in edges {
            counts.total += 1;
            match edge.status {
                DependencyStatus::Active => counts.active += 1,
                DependencyStatus::Satisfied => counts.satisfied += 1,
                DependencyStatus::Blocked => counts.blocked += 1,
                DependencyStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DependencyId, DependencyKind, MilestoneId, MilestonePriority, MilestoneStatus, UserId,
    };
    use chrono::Utc;

    fn edge(id: &str, status: DependencyStatus) -> MilestoneDependency {
        let now = Utc::now();
        MilestoneDependency {
            id: DependencyId::new(id),
            predecessor_id: MilestoneId::new("ms-a"),
            successor_id: MilestoneId::new("ms-b"),
            kind: DependencyKind::FinishToStart,
            lag_days: 0,
            description: None,
            status,
            is_hard_constraint: true,
            criticality_level: 3,
            created_by: UserId::new("amal"),
            created_at: now,
            updated_at: now,
            satisfied_at: None,
            blocked_at: None,
        }
    }

    #[test]
    fn tally_counts_each_status() {
        let edges = [
            edge("dep-1", DependencyStatus::Active),
            edge("dep-2", DependencyStatus::Active),
            edge("dep-3", DependencyStatus::Satisfied),
            edge("dep-4", DependencyStatus::Cancelled),
        ];
        let counts = DependencyCounts::tally(&edges);
        assert_eq!(
            counts,
            DependencyCounts {
                total: 4,
                active: 2,
                satisfied: 1,
                blocked: 0,
                cancelled: 1,
            }
        );
    }

    #[test]
    fn overview_uses_wire_field_names() {
        let now = Utc::now();
        let blocked = Milestone {
            id: MilestoneId::new("ms-b"),
            project_id: ProjectId::new("prj-1"),
            title: "Build".to_string(),
            status: MilestoneStatus::Blocked,
            due_date: None,
            progress: 0,
            priority: MilestonePriority::High,
            created_at: now,
            updated_at: now,
        };
        let overview = ProjectDependencyOverview {
            project_id: ProjectId::new("prj-1"),
            dependencies: vec![edge("dep-1", DependencyStatus::Active)],
            critical_path: vec![blocked.clone()],
            blocked_milestones: vec![blocked],
            counts: DependencyCounts::default(),
        };

        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(json["projectId"], "prj-1");
        assert_eq!(json["criticalPath"][0]["id"], "ms-b");
        assert_eq!(json["blockedMilestones"][0]["status"], "blocked");
        assert_eq!(json["dependencies"][0]["predecessorMilestoneId"], "ms-a");
        assert_eq!(json["counts"]["total"], 0);
    }
}
