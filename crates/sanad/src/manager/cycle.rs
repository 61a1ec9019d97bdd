//! Cycle detection for candidate edges.

use crate::domain::MilestoneId;
use crate::error::Result;
use crate::storage::StoreTransaction;
use std::collections::HashSet;
use tracing::debug;

/// Returns `true` if adding `predecessor -> successor` would close a cycle.
///
/// Walks backward from `predecessor` along incoming edges (successor to
/// predecessor direction) with an explicit stack. If `successor` is reached,
/// a path `successor -> ... -> predecessor` already exists. Each milestone
/// is expanded at most once, so the search is O(V + E).
///
/// Self-loops are rejected before this is called.
pub(crate) async fn would_create_cycle(
    tx: &dyn StoreTransaction,
    predecessor: &MilestoneId,
    successor: &MilestoneId,
) -> Result<bool> {
    let mut stack = vec![predecessor.clone()];
    let mut visited = HashSet::new();

    while let Some(current) = stack.pop() {
        if current == *successor {
            debug!(%predecessor, %successor, visited = visited.len(), "Cycle found");
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        for edge in tx.dependencies_into(&current).await? {
            if !visited.contains(&edge.predecessor_id) {
                stack.push(edge.predecessor_id);
            }
        }
    }

    debug!(%predecessor, %successor, visited = visited.len(), "No cycle");
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MilestonePriority, NewDependency, NewMilestone, NewProject, UserId};
    use crate::storage::in_memory::new_in_memory_store;

    /// Builds milestones m0..m{n} and the given edges (by index) in one transaction.
    async fn graph(n: usize, edges: &[(usize, usize)]) -> (Box<dyn StoreTransaction>, Vec<MilestoneId>) {
        let store = new_in_memory_store();
        let mut tx = store.begin().await.unwrap();
        let user = UserId::new("amal");
        let project = tx
            .create_project(NewProject {
                name: "Graph".to_string(),
                founder_id: user.clone(),
                team_lead_id: None,
                core_team_member_ids: vec![],
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for i in 0..n {
            let milestone = tx
                .create_milestone(NewMilestone {
                    project_id: project.id.clone(),
                    title: format!("m{i}"),
                    due_date: None,
                    priority: MilestonePriority::Medium,
                })
                .await
                .unwrap();
            ids.push(milestone.id);
        }
        for &(from, to) in edges {
            tx.insert_dependency(
                NewDependency::finish_to_start(ids[from].clone(), ids[to].clone()),
                &user,
            )
            .await
            .unwrap();
        }
        (tx, ids)
    }

    #[tokio::test]
    async fn chain_closing_edge_is_a_cycle() {
        let (tx, ids) = graph(3, &[(0, 1), (1, 2)]).await;
        assert!(would_create_cycle(tx.as_ref(), &ids[2], &ids[0]).await.unwrap());
        assert!(would_create_cycle(tx.as_ref(), &ids[1], &ids[0]).await.unwrap());
    }

    #[tokio::test]
    async fn forward_and_parallel_edges_are_not_cycles() {
        let (tx, ids) = graph(4, &[(0, 1), (1, 2)]).await;
        assert!(!would_create_cycle(tx.as_ref(), &ids[0], &ids[2]).await.unwrap());
        assert!(!would_create_cycle(tx.as_ref(), &ids[3], &ids[0]).await.unwrap());
        assert!(!would_create_cycle(tx.as_ref(), &ids[2], &ids[3]).await.unwrap());
    }

    #[tokio::test]
    async fn diamond_is_searched_once_per_node() {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        let (tx, ids) = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]).await;
        assert!(would_create_cycle(tx.as_ref(), &ids[3], &ids[0]).await.unwrap());
        assert!(!would_create_cycle(tx.as_ref(), &ids[1], &ids[2]).await.unwrap());
    }
}
