//! Approximate "critical path" of a project.
//!
//! This is not a CPM computation: it lists the milestones that hold other
//! work back (they have at least one outgoing edge) or are blocked
//! themselves, earliest due date first.

use crate::domain::{Milestone, MilestoneStatus, ProjectId};
use crate::error::Result;
use crate::storage::StoreTransaction;
use std::cmp::Ordering;

/// Milestones of `project` that have successors or are blocked, sorted by
/// [`by_due_date`].
pub(crate) async fn dependency_hotspots(
    tx: &dyn StoreTransaction,
    project: &ProjectId,
) -> Result<Vec<Milestone>> {
    let mut hotspots = Vec::new();
    for milestone in tx.project_milestones(project).await? {
        let blocked = milestone.status == MilestoneStatus::Blocked;
        if blocked || !tx.dependencies_from(&milestone.id).await?.is_empty() {
            hotspots.push(milestone);
        }
    }
    hotspots.sort_by(by_due_date);
    Ok(hotspots)
}

/// Earliest due date first, undated last, ties by ID.
pub(crate) fn by_due_date(a: &Milestone, b: &Milestone) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}
