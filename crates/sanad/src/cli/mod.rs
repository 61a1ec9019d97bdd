//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a sanad workspace
//! - `project add`: Register a project and its team
//! - `milestone add` / `milestone status`: Manage milestones
//! - `dep add|update|remove|show|project`: Manage dependency edges
//! - `propagate`: Re-derive a milestone's status from its incoming edges
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--user`: Acting user (falls back to `SANAD_USER`)
//!
//! # Example
//!
//! ```bash
//! sanad init --mode cascade
//! sanad --user amal project add --name "Solar Desalination"
//! sanad --user amal dep add ms-a1b2 ms-c3d4 --type ss --lag 2
//! sanad --user amal --json dep project prj-9zx1
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::USER_ENV_VAR;
use crate::domain::UserId;

pub use args::{
    DepAction, DepArgs, InitArgs, MilestoneAction, MilestoneArgs, ProjectAction, ProjectArgs,
    PropagateArgs,
};
pub use types::{
    DependencyKindArg, DependencyStatusArg, MilestoneStatusArg, PriorityArg, PropagationModeArg,
};
pub use validators::{
    parse_due_date, validate_dependency_id, validate_milestone_id, validate_project_id,
    validate_title, validate_user_id,
};

/// Sanad - milestone dependency graph manager
///
/// Links project milestones with dependency edges, keeps the graph acyclic,
/// and keeps milestone statuses in step with their predecessors. The graph
/// is stored in `.sanad/graph.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "sanad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Acting user
    #[arg(long, global = true, env = USER_ENV_VAR, value_parser = validate_user_id)]
    pub user: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new sanad workspace
    ///
    /// Creates the `.sanad/` directory with a configuration file and an empty
    /// graph. Run this once in your project root.
    Init(InitArgs),

    /// Manage projects
    Project(ProjectArgs),

    /// Manage milestones
    Milestone(MilestoneArgs),

    /// Manage dependency edges between milestones
    ///
    /// Edges point from predecessor to successor. Adding an edge that would
    /// close a cycle is rejected.
    Dep(DepArgs),

    /// Re-derive a milestone's status from its incoming edges
    ///
    /// Use after a predecessor changes to release or block its successors.
    Propagate(PropagateArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// The acting user, required by every command that touches the graph.
    fn acting_user(&self) -> Result<UserId> {
        self.user
            .as_deref()
            .map(UserId::new)
            .with_context(|| format!("No acting user: pass --user or set {USER_ENV_VAR}"))
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Project(args)) => {
                let user = self.acting_user()?;
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_project(&app, &user, args, output_mode).await
            }
            Some(Commands::Milestone(args)) => {
                let user = self.acting_user()?;
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_milestone(&app, &user, args, output_mode).await
            }
            Some(Commands::Dep(args)) => {
                let user = self.acting_user()?;
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_dep(&app, &user, args, output_mode).await
            }
            Some(Commands::Propagate(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_propagate(&app, args, output_mode).await
            }
            None => {
                println!("Sanad milestone dependency graph");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
