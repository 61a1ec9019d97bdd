//! Domain types for the milestone dependency graph.
//!
//! - [`project`]: projects and their membership (the input to access checks)
//! - [`milestone`]: units of project work with a status and due date
//! - [`dependency`]: directed edges between milestones

pub mod dependency;
pub mod milestone;
pub mod project;

pub use dependency::{
    DEFAULT_CRITICALITY, DependencyKind, DependencyStatus, DependencyUpdate, MAX_CRITICALITY,
    MIN_CRITICALITY, MilestoneDependency, NewDependency,
};
pub use milestone::{Milestone, MilestonePriority, MilestoneStatus, NewMilestone};
pub use project::{NewProject, Project};

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True if the identifier is empty or whitespace
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier for a project
    ProjectId
);

string_id!(
    /// Unique identifier for a milestone
    MilestoneId
);

string_id!(
    /// Unique identifier for a dependency edge
    DependencyId
);

string_id!(
    /// Identifier of a platform user (founder, team lead, team member)
    UserId
);
