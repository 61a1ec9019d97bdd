//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use sanad::access::ProjectMembership;
use sanad::domain::{
    MilestoneId, MilestonePriority, MilestoneStatus, NewMilestone, NewProject, ProjectId, UserId,
};
use sanad::manager::{DependencyManager, PropagationMode};
use sanad::storage::{MilestoneStore, StoreTransaction};
use sanad::storage::in_memory::new_in_memory_store;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

/// Founder of every seeded project
pub const FOUNDER: &str = "amal";

/// A user with no role in any seeded project
pub const OUTSIDER: &str = "eve";

/// A manager over a fresh in-memory store with one project
pub struct Graph {
    /// The manager under test
    pub manager: DependencyManager,
    /// Project owning every seeded milestone
    pub project: ProjectId,
    /// Founder of the project
    pub user: UserId,
}

impl Graph {
    /// Empty graph with one project founded by [`FOUNDER`]
    pub async fn new(mode: PropagationMode) -> Self {
        let store = new_in_memory_store();
        let project = create_project(store.as_ref(), "Solar Desalination", FOUNDER).await;
        Self {
            manager: DependencyManager::new(store, Arc::new(ProjectMembership)).with_mode(mode),
            project,
            user: UserId::new(FOUNDER),
        }
    }

    /// Add a milestone to the seeded project
    pub async fn milestone(&self, title: &str) -> MilestoneId {
        add_milestone(self.manager.store().as_ref(), &self.project, title).await
    }

    /// Add `count` milestones to the seeded project
    pub async fn milestones(&self, count: usize) -> Vec<MilestoneId> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            ids.push(self.milestone(&format!("Milestone {i}")).await);
        }
        ids
    }

    /// Current status of a milestone
    pub async fn status(&self, id: &MilestoneId) -> MilestoneStatus {
        let tx = self.manager.store().begin().await.unwrap();
        tx.get_milestone(id).await.unwrap().unwrap().status
    }
}

/// Create a project with `founder` as its only member
pub async fn create_project(store: &dyn MilestoneStore, name: &str, founder: &str) -> ProjectId {
    let mut tx = store.begin().await.unwrap();
    let project = tx
        .create_project(NewProject {
            name: name.to_string(),
            founder_id: UserId::new(founder),
            team_lead_id: None,
            core_team_member_ids: vec![],
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    project.id
}

/// Add a milestone to `project`
pub async fn add_milestone(
    store: &dyn MilestoneStore,
    project: &ProjectId,
    title: &str,
) -> MilestoneId {
    let mut tx = store.begin().await.unwrap();
    let milestone = tx
        .create_milestone(NewMilestone {
            project_id: project.clone(),
            title: title.to_string(),
            due_date: None,
            priority: MilestonePriority::Medium,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    milestone.id
}

// ========== CLI Helpers ==========

/// Run the sanad binary in `dir` as `user`
pub fn run_sanad_in_dir(dir: &Path, user: Option<&str>, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_sanad"));
    command
        .args(args)
        .current_dir(dir)
        .env_remove("SANAD_USER")
        .env("NO_COLOR", "1");
    if let Some(user) = user {
        command.env("SANAD_USER", user);
    }
    command.output().expect("Failed to execute sanad binary")
}

/// Run the sanad binary with `--json` and parse stdout
pub fn run_sanad_json(dir: &Path, user: &str, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_sanad_in_dir(dir, Some(user), &full);
    assert!(
        output.status.success(),
        "sanad {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}
