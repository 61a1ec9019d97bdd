//! Core in-memory data structures.
//!
//! This module contains the state that is wrapped in `Arc<Mutex<>>` and
//! handed to transactions.

use crate::domain::{
    DependencyId, Milestone, MilestoneDependency, MilestoneId, Project, ProjectId,
};
use crate::error::Result;
use crate::id_generation::{
    DEPENDENCY_ID_PREFIX, IdGenerator, MILESTONE_ID_PREFIX, PROJECT_ID_PREFIX,
};
use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Inner store state (not thread-safe).
///
/// The graph mirrors `dependencies`: one node per milestone, one edge per
/// dependency, directed **predecessor -> successor**, weighted by the
/// dependency's ID. Every milestone in `milestones` has an entry in
/// `node_map`.
///
/// `Clone` is what transactions use for their rollback snapshot.
#[derive(Debug, Clone)]
pub(crate) struct InMemoryStoreInner {
    pub(super) projects: HashMap<ProjectId, Project>,

    pub(super) milestones: HashMap<MilestoneId, Milestone>,

    pub(super) dependencies: HashMap<DependencyId, MilestoneDependency>,

    /// Adjacency index over `dependencies`
    pub(super) graph: DiGraph<MilestoneId, DependencyId>,

    pub(super) node_map: HashMap<MilestoneId, NodeIndex>,

    pub(super) project_ids: IdGenerator,
    pub(super) milestone_ids: IdGenerator,
    pub(super) dependency_ids: IdGenerator,
}

impl InMemoryStoreInner {
    /// Create an empty store
    pub(crate) fn new() -> Self {
        Self {
            projects: HashMap::new(),
            milestones: HashMap::new(),
            dependencies: HashMap::new(),
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            project_ids: IdGenerator::new(PROJECT_ID_PREFIX),
            milestone_ids: IdGenerator::new(MILESTONE_ID_PREFIX),
            dependency_ids: IdGenerator::new(DEPENDENCY_ID_PREFIX),
        }
    }

    pub(super) fn put_project(&mut self, project: Project) {
        self.project_ids.register_id(project.id.as_str());
        self.projects.insert(project.id.clone(), project);
    }

    pub(super) fn put_milestone(&mut self, milestone: Milestone) {
        self.milestone_ids.register_id(milestone.id.as_str());
        if !self.node_map.contains_key(&milestone.id) {
            let node = self.graph.add_node(milestone.id.clone());
            self.node_map.insert(milestone.id.clone(), node);
        }
        self.milestones.insert(milestone.id.clone(), milestone);
    }

    /// Store an edge and index it.
    ///
    /// Both endpoints must already be in `node_map`; callers check this.
    pub(super) fn put_dependency(&mut self, dependency: MilestoneDependency) {
        let (Some(&from), Some(&to)) = (
            self.node_map.get(&dependency.predecessor_id),
            self.node_map.get(&dependency.successor_id),
        ) else {
            return;
        };

        self.dependency_ids.register_id(dependency.id.as_str());
        self.graph.add_edge(from, to, dependency.id.clone());
        self.dependencies.insert(dependency.id.clone(), dependency);
    }

    pub(super) fn take_dependency(&mut self, id: &DependencyId) -> Option<MilestoneDependency> {
        let dependency = self.dependencies.remove(id)?;

        let edge = self.node_map.get(&dependency.predecessor_id).and_then(|&from| {
            self.graph
                .edges_directed(from, Direction::Outgoing)
                .find(|edge| edge.weight() == id)
                .map(|edge| edge.id())
        });
        if let Some(edge) = edge {
            self.graph.remove_edge(edge);
        }

        Some(dependency)
    }

    /// Edges of `milestone` in the given direction, oldest first.
    ///
    /// `Incoming` yields edges where `milestone` is the successor.
    pub(super) fn edges_of(
        &self,
        milestone: &MilestoneId,
        direction: Direction,
    ) -> Vec<MilestoneDependency> {
        let Some(&node) = self.node_map.get(milestone) else {
            return Vec::new();
        };

        let mut edges: Vec<MilestoneDependency> = self
            .graph
            .edges_directed(node, direction)
            .filter_map(|edge| self.dependencies.get(edge.weight()))
            .cloned()
            .collect();
        edges.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        edges
    }

    pub(super) fn find_edge(
        &self,
        predecessor: &MilestoneId,
        successor: &MilestoneId,
    ) -> Option<&MilestoneDependency> {
        let from = *self.node_map.get(predecessor)?;
        let to = *self.node_map.get(successor)?;
        self.graph
            .edges_connecting(from, to)
            .find_map(|edge| self.dependencies.get(edge.weight()))
    }

    /// Returns `true` if an edge `predecessor -> successor` would close a cycle.
    pub(super) fn would_close_cycle(&self, predecessor: &MilestoneId, successor: &MilestoneId) -> bool {
        if predecessor == successor {
            return true;
        }
        match (self.node_map.get(predecessor), self.node_map.get(successor)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, to, from, None),
            _ => false,
        }
    }

    pub(super) fn generate_project_id(&mut self, seed: &str) -> Result<ProjectId> {
        Ok(ProjectId::new(self.project_ids.generate(seed)?))
    }

    pub(super) fn generate_milestone_id(&mut self, seed: &str) -> Result<MilestoneId> {
        Ok(MilestoneId::new(self.milestone_ids.generate(seed)?))
    }

    pub(super) fn generate_dependency_id(&mut self, seed: &str) -> Result<DependencyId> {
        Ok(DependencyId::new(self.dependency_ids.generate(seed)?))
    }
}

impl Default for InMemoryStoreInner {
    fn default() -> Self {
        Self::new()
    }
}
