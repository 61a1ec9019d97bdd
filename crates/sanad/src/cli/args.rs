//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::types::{
    DependencyKindArg, DependencyStatusArg, MilestoneStatusArg, PriorityArg, PropagationModeArg,
};
use super::validators::{
    parse_due_date, validate_dependency_id, validate_milestone_id, validate_project_id,
    validate_title, validate_user_id,
};
use crate::domain::{DEFAULT_CRITICALITY, MAX_CRITICALITY, MIN_CRITICALITY};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// How far status changes travel (written to the config)
    #[arg(short, long, value_enum)]
    pub mode: Option<PropagationModeArg>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `project` command
#[derive(Parser, Debug, Clone)]
pub struct ProjectArgs {
    /// Project action
    #[command(subcommand)]
    pub action: ProjectAction,
}

/// Project management actions
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectAction {
    /// Register a project and its team
    Add {
        /// Project name
        #[arg(long, value_parser = validate_title)]
        name: String,

        /// Founder (defaults to the acting user)
        #[arg(long, value_parser = validate_user_id)]
        founder: Option<String>,

        /// Team lead
        #[arg(long, value_parser = validate_user_id)]
        lead: Option<String>,

        /// Core team members (comma-separated or repeated)
        #[arg(long = "member", value_delimiter = ',', value_parser = validate_user_id)]
        members: Vec<String>,
    },
}

/// Arguments for the `milestone` command
#[derive(Parser, Debug, Clone)]
pub struct MilestoneArgs {
    /// Milestone action
    #[command(subcommand)]
    pub action: MilestoneAction,
}

/// Milestone management actions
#[derive(Subcommand, Debug, Clone)]
pub enum MilestoneAction {
    /// Add a milestone to a project
    Add {
        /// Owning project
        #[arg(long, value_parser = validate_project_id)]
        project: String,

        /// Milestone title
        #[arg(long, value_parser = validate_title)]
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_due_date)]
        due: Option<NaiveDate>,

        /// Priority
        #[arg(short, long, value_enum, default_value = "medium")]
        priority: PriorityArg,
    },

    /// Set a milestone's status
    Status {
        /// Milestone ID
        #[arg(value_parser = validate_milestone_id)]
        milestone: String,

        /// New status
        #[arg(value_enum)]
        status: MilestoneStatusArg,
    },
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency action
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add a dependency edge
    Add {
        /// Milestone that must act first
        #[arg(value_parser = validate_milestone_id)]
        predecessor: String,

        /// Milestone that waits on the predecessor
        #[arg(value_parser = validate_milestone_id)]
        successor: String,

        /// Dependency kind
        #[arg(short = 't', long = "type", value_enum, default_value = "finish_to_start")]
        kind: DependencyKindArg,

        /// Lag in days (negative overlaps)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        lag: i32,

        /// Free-form description
        #[arg(short = 'D', long)]
        description: Option<String>,

        /// Mark as a soft constraint rather than a hard one
        #[arg(long)]
        soft: bool,

        /// Criticality (1-5)
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_CRITICALITY,
            value_parser = clap::value_parser!(u8).range(i64::from(MIN_CRITICALITY)..=i64::from(MAX_CRITICALITY))
        )]
        criticality: u8,
    },

    /// Change fields of an existing edge
    Update {
        /// Dependency ID
        #[arg(value_parser = validate_dependency_id)]
        id: String,

        /// New kind
        #[arg(short = 't', long = "type", value_enum)]
        kind: Option<DependencyKindArg>,

        /// New lag in days
        #[arg(long, allow_negative_numbers = true)]
        lag: Option<i32>,

        /// New description
        #[arg(short = 'D', long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        /// New edge status
        #[arg(short, long, value_enum)]
        status: Option<DependencyStatusArg>,

        /// Make the edge a hard constraint
        #[arg(long, conflicts_with = "soft")]
        hard: bool,

        /// Make the edge a soft constraint
        #[arg(long)]
        soft: bool,

        /// New criticality (1-5)
        #[arg(
            short,
            long,
            value_parser = clap::value_parser!(u8).range(i64::from(MIN_CRITICALITY)..=i64::from(MAX_CRITICALITY))
        )]
        criticality: Option<u8>,
    },

    /// Remove a dependency edge
    Remove {
        /// Dependency ID
        #[arg(value_parser = validate_dependency_id)]
        id: String,
    },

    /// Show the edges into and out of a milestone
    Show {
        /// Milestone ID
        #[arg(value_parser = validate_milestone_id)]
        milestone: String,
    },

    /// Show every edge touching a project
    Project {
        /// Project ID
        #[arg(value_parser = validate_project_id)]
        project: String,
    },
}

/// Arguments for the `propagate` command
#[derive(Parser, Debug, Clone)]
pub struct PropagateArgs {
    /// Milestone whose status is re-derived
    #[arg(value_parser = validate_milestone_id)]
    pub milestone: String,
}
