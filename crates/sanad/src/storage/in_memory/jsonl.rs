//! JSONL persistence for the in-memory store.
//!
//! A snapshot is one record per line, tagged by kind:
//!
//! ```text
//! {"record":"project","id":"prj-k3x9",...}
//! {"record":"milestone","id":"ms-a1b2","projectId":"prj-k3x9",...}
//! {"record":"dependency","id":"dep-77qe","predecessorMilestoneId":"ms-a1b2",...}
//! ```
//!
//! Records are written projects first, then milestones, then dependencies,
//! each group sorted by ID so that repeated saves produce stable diffs.

use super::InMemoryStore;
use super::inner::InMemoryStoreInner;
use crate::domain::{DependencyId, Milestone, MilestoneDependency, MilestoneId, Project, ProjectId};
use crate::error::Result;
use sanad_jsonl::{Warning as JsonlWarning, read_jsonl_resilient, write_jsonl_atomic_iter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One line of a snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum GraphRecord {
    /// A project
    Project(Project),
    /// A milestone
    Milestone(Milestone),
    /// A dependency edge
    Dependency(MilestoneDependency),
}

/// Non-fatal problems found while loading a snapshot.
///
/// The offending record is skipped; everything else is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Line could not be parsed as a record
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// Milestone references a project that is not in the file
    OrphanedMilestone {
        /// Skipped milestone
        milestone: MilestoneId,
        /// Missing project
        project: ProjectId,
    },

    /// Dependency references a milestone that is not in the file
    OrphanedDependency {
        /// Skipped edge
        dependency: DependencyId,
        /// Missing endpoint
        missing: MilestoneId,
    },

    /// Record failed validation
    InvalidRecord {
        /// ID of the skipped record
        id: String,
        /// Validation message
        error: String,
    },

    /// A second record reusing an ID already loaded
    DuplicateId {
        /// Kind of record: `project`, `milestone`, or `dependency`
        record: &'static str,
        /// The reused ID
        id: String,
    },

    /// A second edge for an ordered pair that already has one
    DuplicateDependency {
        /// Skipped edge
        dependency: DependencyId,
        /// Predecessor of the pair
        predecessor: MilestoneId,
        /// Successor of the pair
        successor: MilestoneId,
    },

    /// Edge is a self-loop or would close a cycle
    CircularDependency {
        /// Skipped edge
        dependency: DependencyId,
        /// Predecessor of the edge
        predecessor: MilestoneId,
        /// Successor of the edge
        successor: MilestoneId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed record: {error}")
            }
            Self::OrphanedMilestone { milestone, project } => {
                write!(f, "milestone {milestone} skipped: project {project} not found")
            }
            Self::OrphanedDependency { dependency, missing } => {
                write!(f, "dependency {dependency} skipped: milestone {missing} not found")
            }
            Self::InvalidRecord { id, error } => write!(f, "record {id} skipped: {error}"),
            Self::DuplicateId { record, id } => {
                write!(f, "{record} {id} skipped: ID already loaded")
            }
            Self::DuplicateDependency {
                dependency,
                predecessor,
                successor,
            } => write!(
                f,
                "dependency {dependency} skipped: {predecessor} -> {successor} already exists"
            ),
            Self::CircularDependency {
                dependency,
                predecessor,
                successor,
            } => write!(
                f,
                "dependency {dependency} skipped: {predecessor} -> {successor} would create a cycle"
            ),
        }
    }
}

/// Load a store from a JSONL snapshot.
///
/// Loading runs in three passes: projects, then milestones whose project
/// was loaded, then dependencies whose endpoints were loaded. Edges are
/// added in file order; an edge that would close a cycle with the edges
/// already added is skipped, so the loaded graph is always acyclic.
///
/// # Errors
///
/// Returns an error only if the file cannot be opened or read. Bad records
/// become [`LoadWarning`]s.
pub async fn load_from_jsonl(path: &Path) -> Result<(InMemoryStore, Vec<LoadWarning>)> {
    let (records, jsonl_warnings) = read_jsonl_resilient::<GraphRecord, _>(path).await?;

    let mut warnings: Vec<LoadWarning> = jsonl_warnings
        .into_iter()
        .map(|warning| match warning {
            JsonlWarning::MalformedJson { line_number, error } => {
                LoadWarning::MalformedJson { line_number, error }
            }
            JsonlWarning::SkippedLine {
                line_number,
                reason,
            } => LoadWarning::MalformedJson {
                line_number,
                error: reason,
            },
        })
        .collect();

    let mut projects = Vec::new();
    let mut milestones = Vec::new();
    let mut dependencies = Vec::new();
    for record in records {
        match record {
            GraphRecord::Project(p) => projects.push(p),
            GraphRecord::Milestone(m) => milestones.push(m),
            GraphRecord::Dependency(d) => dependencies.push(d),
        }
    }

    let mut inner = InMemoryStoreInner::new();

    // First pass: projects
    for project in projects {
        if inner.projects.contains_key(&project.id) {
            warnings.push(LoadWarning::DuplicateId {
                record: "project",
                id: project.id.to_string(),
            });
            continue;
        }
        if let Err(error) = project.validate() {
            warnings.push(LoadWarning::InvalidRecord {
                id: project.id.to_string(),
                error,
            });
            continue;
        }
        inner.put_project(project);
    }

    // Second pass: milestones and graph nodes
    for milestone in milestones {
        if inner.milestones.contains_key(&milestone.id) {
            warnings.push(LoadWarning::DuplicateId {
                record: "milestone",
                id: milestone.id.to_string(),
            });
            continue;
        }
        if !inner.projects.contains_key(&milestone.project_id) {
            warnings.push(LoadWarning::OrphanedMilestone {
                milestone: milestone.id,
                project: milestone.project_id,
            });
            continue;
        }
        if let Err(error) = milestone.validate() {
            warnings.push(LoadWarning::InvalidRecord {
                id: milestone.id.to_string(),
                error,
            });
            continue;
        }
        inner.put_milestone(milestone);
    }

    // Third pass: edges with duplicate and cycle checks
    for dependency in dependencies {
        if let Some(warning) = check_dependency(&inner, &dependency) {
            warnings.push(warning);
            continue;
        }
        inner.put_dependency(dependency);
    }

    for warning in &warnings {
        tracing::debug!(warning = %warning, "Skipped record while loading");
    }

    Ok((InMemoryStore::from_inner(inner), warnings))
}

fn check_dependency(
    inner: &InMemoryStoreInner,
    dependency: &MilestoneDependency,
) -> Option<LoadWarning> {
    let predecessor = &dependency.predecessor_id;
    let successor = &dependency.successor_id;
    let circular = || LoadWarning::CircularDependency {
        dependency: dependency.id.clone(),
        predecessor: predecessor.clone(),
        successor: successor.clone(),
    };

    if inner.dependencies.contains_key(&dependency.id) {
        return Some(LoadWarning::DuplicateId {
            record: "dependency",
            id: dependency.id.to_string(),
        });
    }

    if predecessor == successor {
        return Some(circular());
    }

    for endpoint in [predecessor, successor] {
        if !inner.node_map.contains_key(endpoint) {
            return Some(LoadWarning::OrphanedDependency {
                dependency: dependency.id.clone(),
                missing: endpoint.clone(),
            });
        }
    }

    if let Err(error) = dependency.validate() {
        return Some(LoadWarning::InvalidRecord {
            id: dependency.id.to_string(),
            error,
        });
    }

    if inner.find_edge(predecessor, successor).is_some() {
        return Some(LoadWarning::DuplicateDependency {
            dependency: dependency.id.clone(),
            predecessor: predecessor.clone(),
            successor: successor.clone(),
        });
    }

    if inner.would_close_cycle(predecessor, successor) {
        return Some(circular());
    }

    None
}

/// Save a store to a JSONL snapshot with an atomic write.
///
/// Waits for any open transaction to finish, then writes committed state
/// only.
///
/// # Errors
///
/// Returns an error if the file cannot be written; the previous snapshot
/// is left unchanged in that case.
pub async fn save_to_jsonl(store: &InMemoryStore, path: &Path) -> Result<()> {
    let records = {
        let inner = store.inner.lock().await;

        let mut projects: Vec<&Project> = inner.projects.values().collect();
        projects.sort_by(|a, b| a.id.cmp(&b.id));
        let mut milestones: Vec<&Milestone> = inner.milestones.values().collect();
        milestones.sort_by(|a, b| a.id.cmp(&b.id));
        let mut dependencies: Vec<&MilestoneDependency> = inner.dependencies.values().collect();
        dependencies.sort_by(|a, b| a.id.cmp(&b.id));

        projects
            .into_iter()
            .cloned()
            .map(GraphRecord::Project)
            .chain(milestones.into_iter().cloned().map(GraphRecord::Milestone))
            .chain(dependencies.into_iter().cloned().map(GraphRecord::Dependency))
            .collect::<Vec<_>>()
    };

    write_jsonl_atomic_iter(path, records.iter()).await?;
    tracing::debug!(path = %path.display(), records = records.len(), "Saved dependency graph");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyKind;

    #[test]
    fn record_tag_is_snake_case() {
        let project = Project {
            id: ProjectId::new("prj-1"),
            name: "Water Filter".to_string(),
            founder_id: "amal".into(),
            team_lead_id: None,
            core_team_member_ids: vec![],
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(GraphRecord::Project(project)).unwrap();
        assert_eq!(json["record"], "project");
        assert_eq!(json["founderId"], "amal");
    }

    #[test]
    fn dependency_record_uses_wire_names() {
        let json = r#"{"record":"dependency","id":"dep-1","predecessorMilestoneId":"ms-a",
            "successorMilestoneId":"ms-b","type":"start_to_start","lagDays":2,"status":"active",
            "isHardConstraint":true,"criticalityLevel":4,"createdBy":"amal",
            "createdAt":"2026-01-05T10:00:00Z","updatedAt":"2026-01-05T10:00:00Z"}"#;
        let record: GraphRecord = serde_json::from_str(json).unwrap();
        let GraphRecord::Dependency(dep) = record else {
            panic!("expected a dependency record");
        };
        assert_eq!(dep.kind, DependencyKind::StartToStart);
        assert_eq!(dep.lag_days, 2);
        assert_eq!(dep.description, None);
    }
}
