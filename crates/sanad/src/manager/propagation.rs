//! Status propagation from incoming edges to a milestone.
//!
//! A milestone's status is re-derived from the edges pointing at it:
//!
//! 1. Any incoming edge marked `blocked` blocks the milestone.
//! 2. Otherwise, any `active` edge whose kind gates starting and whose
//!    predecessor has not yet reached the required state blocks it.
//! 3. Otherwise a `blocked` milestone is released to `not_started`.
//!
//! Rule 1 applies to every milestone. A completed milestone is exempt from
//! rules 2 and 3: an unmet start condition does not reopen finished work.

use super::PropagationMode;
use crate::domain::{
    DependencyKind, DependencyStatus, MilestoneDependency, MilestoneId, MilestoneStatus,
};
use crate::error::{Error, Result};
use crate::storage::StoreTransaction;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// A status change made by propagation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// Milestone whose status changed
    pub milestone_id: MilestoneId,
    /// Status before propagation
    pub from: MilestoneStatus,
    /// Status after propagation
    pub to: MilestoneStatus,
}

/// An incoming edge together with the current status of its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IncomingEdge {
    pub(crate) kind: DependencyKind,
    pub(crate) status: DependencyStatus,
    pub(crate) predecessor_status: MilestoneStatus,
}

/// Returns `true` if the predecessor has met the start condition of `kind`.
///
/// Finish-to-finish and start-to-finish constrain when the successor may
/// finish, not when it may proceed, so they never hold a milestone back.
pub(crate) fn start_condition_met(kind: DependencyKind, predecessor: MilestoneStatus) -> bool {
    match kind {
        DependencyKind::FinishToStart => predecessor == MilestoneStatus::Completed,
        DependencyKind::StartToStart => predecessor.has_started(),
        DependencyKind::FinishToFinish | DependencyKind::StartToFinish => true,
    }
}

/// Derive the new status of a milestone from its incoming edges.
pub(crate) fn evaluate(current: MilestoneStatus, incoming: &[IncomingEdge]) -> MilestoneStatus {
    if incoming
        .iter()
        .any(|edge| edge.status == DependencyStatus::Blocked)
    {
        return MilestoneStatus::Blocked;
    }
    if current == MilestoneStatus::Completed {
        return current;
    }

    let waiting = incoming.iter().any(|edge| {
        edge.status == DependencyStatus::Active
            && !start_condition_met(edge.kind, edge.predecessor_status)
    });

    if waiting {
        MilestoneStatus::Blocked
    } else if current == MilestoneStatus::Blocked {
        MilestoneStatus::NotStarted
    } else {
        current
    }
}

/// Re-evaluate one milestone inside `tx`, writing the result if it changed.
async fn reevaluate(
    tx: &mut dyn StoreTransaction,
    milestone_id: &MilestoneId,
) -> Result<Option<StatusChange>> {
    let milestone = tx
        .get_milestone(milestone_id)
        .await?
        .ok_or_else(|| Error::MilestoneNotFound(milestone_id.clone()))?;

    let edges: Vec<MilestoneDependency> = tx.dependencies_into(milestone_id).await?;
    let mut incoming = Vec::with_capacity(edges.len());
    for edge in &edges {
        let predecessor = tx
            .get_milestone(&edge.predecessor_id)
            .await?
            .ok_or_else(|| Error::MilestoneNotFound(edge.predecessor_id.clone()))?;
        incoming.push(IncomingEdge {
            kind: edge.kind,
            status: edge.status,
            predecessor_status: predecessor.status,
        });
    }

    let next = evaluate(milestone.status, &incoming);
    debug!(
        milestone = %milestone_id,
        incoming = incoming.len(),
        from = %milestone.status,
        to = %next,
        "Evaluated milestone status"
    );

    if next == milestone.status {
        return Ok(None);
    }

    tx.set_milestone_status(milestone_id, next).await?;
    Ok(Some(StatusChange {
        milestone_id: milestone_id.clone(),
        from: milestone.status,
        to: next,
    }))
}

/// Propagate status starting at `milestone_id`.
///
/// In `Direct` mode only `milestone_id` itself is re-evaluated. In
/// `Cascade` mode every milestone whose status changes has its successors
/// re-evaluated too, breadth first. A successor is evaluated again each
/// time one of its predecessors changes, and the walk stops where
/// statuses stop changing. The edge set is acyclic, so it always settles.
pub(crate) async fn propagate(
    tx: &mut dyn StoreTransaction,
    milestone_id: &MilestoneId,
    mode: PropagationMode,
) -> Result<Vec<StatusChange>> {
    let mut changes = Vec::new();

    let Some(change) = reevaluate(tx, milestone_id).await? else {
        return Ok(changes);
    };
    changes.push(change);

    changes.extend(propagate_downstream(tx, milestone_id, mode).await?);
    Ok(changes)
}

/// Re-evaluate the downstream successors of `milestone_id` (cascade mode only).
///
/// Used after a milestone's own status is changed by hand.
pub(crate) async fn propagate_downstream(
    tx: &mut dyn StoreTransaction,
    milestone_id: &MilestoneId,
    mode: PropagationMode,
) -> Result<Vec<StatusChange>> {
    let mut changes = Vec::new();
    if mode == PropagationMode::Direct {
        return Ok(changes);
    }

    let mut queue = VecDeque::from([milestone_id.clone()]);
    cascade(tx, &mut queue, &mut changes).await?;
    Ok(changes)
}

/// Drain `queue`, where every queued milestone has just changed status.
async fn cascade(
    tx: &mut dyn StoreTransaction,
    queue: &mut VecDeque<MilestoneId>,
    changes: &mut Vec<StatusChange>,
) -> Result<()> {
    while let Some(current) = queue.pop_front() {
        for edge in tx.dependencies_from(&current).await? {
            let successor = edge.successor_id;
            if let Some(change) = reevaluate(tx, &successor).await? {
                changes.push(change);
                queue.push_back(successor);
            }
        }
    }
    Ok(())
}
