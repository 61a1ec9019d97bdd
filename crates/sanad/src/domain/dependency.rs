//! Dependency edges between milestones.
//!
//! An edge points from **predecessor to successor**: the predecessor must
//! reach some state before the successor may proceed. The [`DependencyKind`]
//! says which state.

use super::{DependencyId, MilestoneId, UserId};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest criticality level
pub const MIN_CRITICALITY: u8 = 1;

/// Highest criticality level
pub const MAX_CRITICALITY: u8 = 5;

/// Criticality used when a request does not specify one
pub const DEFAULT_CRITICALITY: u8 = 3;

/// Scheduling relationship between predecessor and successor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// Predecessor must finish before the successor starts
    #[default]
    FinishToStart,

    /// Predecessor must start before the successor starts
    StartToStart,

    /// Predecessor must finish before the successor finishes
    FinishToFinish,

    /// Predecessor must start before the successor finishes
    StartToFinish,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FinishToStart => "finish_to_start",
            Self::StartToStart => "start_to_start",
            Self::FinishToFinish => "finish_to_finish",
            Self::StartToFinish => "start_to_finish",
        })
    }
}

/// Lifecycle state of an edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStatus {
    /// Constraint is in force
    #[default]
    Active,

    /// Constraint has been met
    Satisfied,

    /// Constraint is explicitly blocking the successor
    Blocked,

    /// Constraint no longer applies
    Cancelled,
}

impl fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Satisfied => "satisfied",
            Self::Blocked => "blocked",
            Self::Cancelled => "cancelled",
        })
    }
}

/// A persisted dependency edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDependency {
    /// Unique identifier
    pub id: DependencyId,

    /// Milestone that must act first
    #[serde(rename = "predecessorMilestoneId")]
    pub predecessor_id: MilestoneId,

    /// Milestone that waits on the predecessor
    #[serde(rename = "successorMilestoneId")]
    pub successor_id: MilestoneId,

    /// Relationship kind
    #[serde(rename = "type")]
    pub kind: DependencyKind,

    /// Lag in days: positive delays the successor, negative overlaps
    pub lag_days: i32,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Lifecycle state
    pub status: DependencyStatus,

    /// Mandatory constraint rather than a soft preference
    pub is_hard_constraint: bool,

    /// Criticality (1-5)
    pub criticality_level: u8,

    /// User who created the edge
    pub created_by: UserId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// When the edge was last marked satisfied
    #[serde(default)]
    pub satisfied_at: Option<DateTime<Utc>>,

    /// When the edge was last marked blocked
    #[serde(default)]
    pub blocked_at: Option<DateTime<Utc>>,
}

impl MilestoneDependency {
    /// Validate persisted edge data
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.predecessor_id == self.successor_id {
            return Err(format!("Milestone {} depends on itself", self.predecessor_id));
        }
        validate_criticality(self.criticality_level)
    }

    /// Apply an update in place.
    ///
    /// A change to `Satisfied` or `Blocked` stamps the matching timestamp.
    /// Returns `true` if the edge status changed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the new criticality is out of range;
    /// the edge is left untouched in that case.
    pub fn apply_update(&mut self, update: DependencyUpdate, now: DateTime<Utc>) -> Result<bool> {
        if let Some(level) = update.criticality_level {
            validate_criticality(level).map_err(Error::Validation)?;
        }

        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(lag_days) = update.lag_days {
            self.lag_days = lag_days;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(hard) = update.is_hard_constraint {
            self.is_hard_constraint = hard;
        }
        if let Some(level) = update.criticality_level {
            self.criticality_level = level;
        }

        let mut status_changed = false;
        if let Some(status) = update.status.filter(|status| *status != self.status) {
            status_changed = true;
            self.status = status;
            match status {
                DependencyStatus::Satisfied => self.satisfied_at = Some(now),
                DependencyStatus::Blocked => self.blocked_at = Some(now),
                DependencyStatus::Active | DependencyStatus::Cancelled => {}
            }
        }

        self.updated_at = now;
        Ok(status_changed)
    }
}

fn validate_criticality(level: u8) -> std::result::Result<(), String> {
    if (MIN_CRITICALITY..=MAX_CRITICALITY).contains(&level) {
        Ok(())
    } else {
        Err(format!(
            "Criticality level must be between {MIN_CRITICALITY} and {MAX_CRITICALITY}, got {level}"
        ))
    }
}

/// Request to create an edge.
///
/// Deserializes from the create payload:
/// `{ predecessorMilestoneId, successorMilestoneId, type, lagDays,
/// description, isHardConstraint, criticalityLevel }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDependency {
    /// Milestone that must act first
    #[serde(rename = "predecessorMilestoneId")]
    pub predecessor_id: MilestoneId,

    /// Milestone that waits on the predecessor
    #[serde(rename = "successorMilestoneId")]
    pub successor_id: MilestoneId,

    /// Relationship kind
    #[serde(rename = "type", default)]
    pub kind: DependencyKind,

    /// Lag in days
    #[serde(default)]
    pub lag_days: i32,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Mandatory constraint
    #[serde(default = "default_hard_constraint")]
    pub is_hard_constraint: bool,

    /// Criticality (1-5)
    #[serde(default = "default_criticality")]
    pub criticality_level: u8,
}

fn default_hard_constraint() -> bool {
    true
}

fn default_criticality() -> u8 {
    DEFAULT_CRITICALITY
}

impl NewDependency {
    /// Finish-to-start edge with default settings
    pub fn finish_to_start(predecessor: impl Into<MilestoneId>, successor: impl Into<MilestoneId>) -> Self {
        Self {
            predecessor_id: predecessor.into(),
            successor_id: successor.into(),
            kind: DependencyKind::FinishToStart,
            lag_days: 0,
            description: None,
            is_hard_constraint: true,
            criticality_level: DEFAULT_CRITICALITY,
        }
    }

    /// Validate the request without touching storage.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if either id is blank or criticality is out of range
    /// - `Error::SelfDependency` if predecessor and successor are the same
    pub fn validate(&self) -> Result<()> {
        if self.predecessor_id.is_blank() || self.successor_id.is_blank() {
            return Err(Error::Validation(
                "Predecessor and successor milestone IDs are required".to_string(),
            ));
        }
        if self.predecessor_id == self.successor_id {
            return Err(Error::SelfDependency(self.predecessor_id.clone()));
        }
        validate_criticality(self.criticality_level).map_err(Error::Validation)
    }
}

/// Field changes for an existing edge. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyUpdate {
    /// New kind
    #[serde(rename = "type", default)]
    pub kind: Option<DependencyKind>,

    /// New lag
    #[serde(default)]
    pub lag_days: Option<i32>,

    /// New description (`Some(None)` clears it)
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,

    /// New status
    #[serde(default)]
    pub status: Option<DependencyStatus>,

    /// New hard-constraint flag
    #[serde(default)]
    pub is_hard_constraint: Option<bool>,

    /// New criticality
    #[serde(default)]
    pub criticality_level: Option<u8>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            None | Some(None) => serializer.serialize_none(),
            Some(Some(v)) => v.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
