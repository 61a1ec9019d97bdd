//! Milestones: trackable units of project work.

use super::{MilestoneId, ProjectId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum progress percentage
pub const MAX_PROGRESS: u8 = 100;

/// Status of a milestone.
///
/// `Blocked` is mostly written by dependency propagation; the other
/// transitions belong to whoever owns the milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    /// Work has not begun
    NotStarted,

    /// Work is underway
    InProgress,

    /// Work is done
    Completed,

    /// Work cannot proceed because of an unsatisfied dependency
    Blocked,
}

impl MilestoneStatus {
    /// Wire name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    /// True once work has begun (in progress or completed)
    pub fn has_started(self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a milestone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestonePriority {
    /// Nice to have
    Low,

    /// Normal priority
    #[default]
    Medium,

    /// Important
    High,

    /// Must not slip
    Critical,
}

impl fmt::Display for MilestonePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        })
    }
}

/// A milestone in a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Unique identifier
    pub id: MilestoneId,

    /// Owning project
    pub project_id: ProjectId,

    /// Short title
    pub title: String,

    /// Current status
    pub status: MilestoneStatus,

    /// Due date, if scheduled
    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    /// Progress percentage (0-100)
    #[serde(default)]
    pub progress: u8,

    /// Priority
    #[serde(default)]
    pub priority: MilestonePriority,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    /// Validate milestone data
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Milestone title cannot be empty".to_string());
        }
        if self.progress > MAX_PROGRESS {
            return Err(format!(
                "Progress must be between 0 and {MAX_PROGRESS}, got {}",
                self.progress
            ));
        }
        Ok(())
    }
}

/// Data for creating a new milestone
#[derive(Debug, Clone)]
pub struct NewMilestone {
    /// Owning project
    pub project_id: ProjectId,

    /// Short title
    pub title: String,

    /// Due date (optional)
    pub due_date: Option<NaiveDate>,

    /// Priority
    pub priority: MilestonePriority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&MilestoneStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
        let parsed: MilestoneStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(parsed, MilestoneStatus::InProgress);
        assert_eq!(MilestoneStatus::Blocked.to_string(), "blocked");
    }

    #[test]
    fn test_has_started() {
        assert!(!MilestoneStatus::NotStarted.has_started());
        assert!(!MilestoneStatus::Blocked.has_started());
        assert!(MilestoneStatus::InProgress.has_started());
        assert!(MilestoneStatus::Completed.has_started());
    }

    #[test]
    fn test_validate_progress_bound() {
        let now = Utc::now();
        let mut milestone = Milestone {
            id: MilestoneId::new("ms-1"),
            project_id: ProjectId::new("prj-1"),
            title: "Prototype".to_string(),
            status: MilestoneStatus::NotStarted,
            due_date: None,
            progress: 100,
            priority: MilestonePriority::High,
            created_at: now,
            updated_at: now,
        };
        assert!(milestone.validate().is_ok());

        milestone.progress = 101;
        assert!(milestone.validate().is_err());
    }
}
