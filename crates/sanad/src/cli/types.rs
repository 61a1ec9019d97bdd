//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{DependencyKind, DependencyStatus, MilestonePriority, MilestoneStatus};
use crate::manager::PropagationMode;

// ============================================================================
// Value Enums
// ============================================================================

/// Milestone status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneStatusArg {
    /// Work has not begun
    #[value(name = "not_started", alias = "not-started")]
    NotStarted,
    /// Work is underway
    #[value(name = "in_progress", alias = "in-progress")]
    InProgress,
    /// Work is done
    Completed,
    /// Work cannot proceed
    Blocked,
}

impl std::fmt::Display for MilestoneStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", MilestoneStatus::from(*self))
    }
}

/// Milestone priority for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityArg {
    /// Nice to have
    Low,
    /// Normal priority
    Medium,
    /// Important
    High,
    /// Must not slip
    Critical,
}

impl std::fmt::Display for PriorityArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", MilestonePriority::from(*self))
    }
}

/// Dependency kind for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKindArg {
    /// Predecessor finishes before the successor starts
    #[value(name = "finish_to_start", alias = "fs")]
    FinishToStart,
    /// Predecessor starts before the successor starts
    #[value(name = "start_to_start", alias = "ss")]
    StartToStart,
    /// Predecessor finishes before the successor finishes
    #[value(name = "finish_to_finish", alias = "ff")]
    FinishToFinish,
    /// Predecessor starts before the successor finishes
    #[value(name = "start_to_finish", alias = "sf")]
    StartToFinish,
}

impl std::fmt::Display for DependencyKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", DependencyKind::from(*self))
    }
}

/// Dependency status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyStatusArg {
    /// Constraint is in force
    Active,
    /// Constraint has been met
    Satisfied,
    /// Constraint explicitly blocks the successor
    Blocked,
    /// Constraint no longer applies
    Cancelled,
}

impl std::fmt::Display for DependencyStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", DependencyStatus::from(*self))
    }
}

/// Propagation mode for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationModeArg {
    /// Re-evaluate only the directly affected milestone
    Direct,
    /// Ripple changes to downstream successors
    Cascade,
}

impl std::fmt::Display for PropagationModeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", PropagationMode::from(*self))
    }
}

// ============================================================================
// Domain Conversions
// ============================================================================

impl From<MilestoneStatusArg> for MilestoneStatus {
    fn from(arg: MilestoneStatusArg) -> Self {
        match arg {
            MilestoneStatusArg::NotStarted => MilestoneStatus::NotStarted,
            MilestoneStatusArg::InProgress => MilestoneStatus::InProgress,
            MilestoneStatusArg::Completed => MilestoneStatus::Completed,
            MilestoneStatusArg::Blocked => MilestoneStatus::Blocked,
        }
    }
}

impl From<PriorityArg> for MilestonePriority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => MilestonePriority::Low,
            PriorityArg::Medium => MilestonePriority::Medium,
            PriorityArg::High => MilestonePriority::High,
            PriorityArg::Critical => MilestonePriority::Critical,
        }
    }
}

impl From<DependencyKindArg> for DependencyKind {
    fn from(arg: DependencyKindArg) -> Self {
        match arg {
            DependencyKindArg::FinishToStart => DependencyKind::FinishToStart,
            DependencyKindArg::StartToStart => DependencyKind::StartToStart,
            DependencyKindArg::FinishToFinish => DependencyKind::FinishToFinish,
            DependencyKindArg::StartToFinish => DependencyKind::StartToFinish,
        }
    }
}

impl From<DependencyStatusArg> for DependencyStatus {
    fn from(arg: DependencyStatusArg) -> Self {
        match arg {
            DependencyStatusArg::Active => DependencyStatus::Active,
            DependencyStatusArg::Satisfied => DependencyStatus::Satisfied,
            DependencyStatusArg::Blocked => DependencyStatus::Blocked,
            DependencyStatusArg::Cancelled => DependencyStatus::Cancelled,
        }
    }
}

impl From<PropagationModeArg> for PropagationMode {
    fn from(arg: PropagationModeArg) -> Self {
        match arg {
            PropagationModeArg::Direct => PropagationMode::Direct,
            PropagationModeArg::Cascade => PropagationMode::Cascade,
        }
    }
}
