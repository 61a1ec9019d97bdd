//! Projects and their membership.

use super::{ProjectId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project owning milestones.
///
/// Only the membership fields matter to the dependency graph: they decide
/// who may create, change, or read edges between the project's milestones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Display name
    pub name: String,

    /// Founder of the project
    pub founder_id: UserId,

    /// Team lead, if one is assigned
    #[serde(default)]
    pub team_lead_id: Option<UserId>,

    /// Core team members
    #[serde(default)]
    pub core_team_member_ids: Vec<UserId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Returns true if `user` is the founder, the team lead, or a core team member.
    pub fn is_member(&self, user: &UserId) -> bool {
        self.founder_id == *user
            || self.team_lead_id.as_ref() == Some(user)
            || self.core_team_member_ids.contains(user)
    }

    /// Validate project data
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Project name cannot be empty".to_string());
        }
        if self.founder_id.is_blank() {
            return Err("Project founder is required".to_string());
        }
        Ok(())
    }
}

/// Data for creating a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    /// Display name
    pub name: String,

    /// Founder of the project
    pub founder_id: UserId,

    /// Team lead (optional)
    pub team_lead_id: Option<UserId>,

    /// Core team members
    pub core_team_member_ids: Vec<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn project() -> Project {
        Project {
            id: ProjectId::new("prj-1"),
            name: "Solar Desalination".to_string(),
            founder_id: UserId::new("founder"),
            team_lead_id: Some(UserId::new("lead")),
            core_team_member_ids: vec![UserId::new("core-a"), UserId::new("core-b")],
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case::founder("founder", true)]
    #[case::team_lead("lead", true)]
    #[case::core_member("core-b", true)]
    #[case::investor("investor", false)]
    #[case::empty("", false)]
    fn test_membership(#[case] user: &str, #[case] expected: bool) {
        assert_eq!(project().is_member(&UserId::new(user)), expected);
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut p = project();
        p.name = "  ".to_string();
        assert!(p.validate().is_err());
    }
}
