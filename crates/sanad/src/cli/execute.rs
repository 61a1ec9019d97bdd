//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;
use serde_json::json;
use std::io::Write;

use super::args::{
    DepAction, DepArgs, InitArgs, MilestoneAction, MilestoneArgs, ProjectAction, ProjectArgs,
    PropagateArgs,
};
use crate::access::{AccessPolicy, ProjectMembership};
use crate::app::App;
use crate::domain::{
    DependencyId, DependencyUpdate, MilestoneId, NewDependency, NewMilestone, NewProject,
    ProjectId, UserId,
};
use crate::error::Error;
use crate::output::{self, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!("Initializing sanad workspace...");
    }

    let result = init::init(&current_dir, args.mode.map(Into::into)).await?;

    if !args.quiet {
        println!("Initialized sanad in {}", result.sanad_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  Graph:  {}", result.data_file.display());
        println!("  Propagation mode: {}", result.mode);
    }

    Ok(())
}

/// Execute the project command
pub async fn execute_project(
    app: &App,
    user: &UserId,
    args: &ProjectArgs,
    output_mode: OutputMode,
) -> Result<()> {
    match &args.action {
        ProjectAction::Add {
            name,
            founder,
            lead,
            members,
        } => {
            let new_project = NewProject {
                name: name.clone(),
                founder_id: founder.as_ref().map_or_else(|| user.clone(), UserId::new),
                team_lead_id: lead.as_ref().map(UserId::new),
                core_team_member_ids: members.iter().map(UserId::new).collect(),
            };

            let mut tx = app.store().begin().await?;
            let project = tx.create_project(new_project).await?;
            tx.commit().await?;
            drop(tx);
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&project)?,
                OutputMode::Text => {
                    println!("Created project:");
                    output::print_text(|w| output::write_project(w, &project))?;
                }
            }
        }
    }
    Ok(())
}

/// Execute the milestone command
pub async fn execute_milestone(
    app: &App,
    user: &UserId,
    args: &MilestoneArgs,
    output_mode: OutputMode,
) -> Result<()> {
    match &args.action {
        MilestoneAction::Add {
            project,
            title,
            due,
            priority,
        } => {
            let project_id = ProjectId::new(project);
            let mut tx = app.store().begin().await?;
            let owner = tx
                .get_project(&project_id)
                .await?
                .ok_or_else(|| Error::ProjectNotFound(project_id.clone()))?;
            if !ProjectMembership.has_access(user, &owner) {
                return Err(Error::AccessDenied {
                    user: user.clone(),
                    project: owner.id,
                }
                .into());
            }

            let milestone = tx
                .create_milestone(NewMilestone {
                    project_id,
                    title: title.clone(),
                    due_date: *due,
                    priority: (*priority).into(),
                })
                .await?;
            tx.commit().await?;
            drop(tx);
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&milestone)?,
                OutputMode::Text => {
                    print!("Created milestone: ");
                    output::print_text(|w| output::write_milestone(w, &milestone))?;
                }
            }
        }
        MilestoneAction::Status { milestone, status } => {
            let (updated, changes) = app
                .manager()
                .set_milestone_status(user, &MilestoneId::new(milestone), (*status).into())
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&json!({
                    "milestone": updated,
                    "statusChanges": changes,
                }))?,
                OutputMode::Text => output::print_text(|w| {
                    output::write_milestone(w, &updated)?;
                    if !changes.is_empty() {
                        writeln!(w, "Downstream:")?;
                        output::write_status_changes(w, &changes)?;
                    }
                    Ok(())
                })?,
            }
        }
    }
    Ok(())
}

/// Execute the dep command
pub async fn execute_dep(
    app: &App,
    user: &UserId,
    args: &DepArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let manager = app.manager();

    match &args.action {
        DepAction::Add {
            predecessor,
            successor,
            kind,
            lag,
            description,
            soft,
            criticality,
        } => {
            let request = NewDependency {
                kind: (*kind).into(),
                lag_days: *lag,
                description: description.clone(),
                is_hard_constraint: !soft,
                criticality_level: *criticality,
                ..NewDependency::finish_to_start(predecessor.as_str(), successor.as_str())
            };
            let dependency = manager.create_dependency(user, request).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&dependency)?,
                OutputMode::Text => {
                    print!("Added dependency: ");
                    output::print_text(|w| output::write_dependency(w, &dependency))?;
                }
            }
        }
        DepAction::Update {
            id,
            kind,
            lag,
            description,
            clear_description,
            status,
            hard,
            soft,
            criticality,
        } => {
            let description = if *clear_description {
                Some(None)
            } else {
                description.clone().map(Some)
            };
            let is_hard_constraint = match (*hard, *soft) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let update = DependencyUpdate {
                kind: kind.map(Into::into),
                lag_days: *lag,
                description,
                status: status.map(Into::into),
                is_hard_constraint,
                criticality_level: *criticality,
            };

            let dependency = manager
                .update_dependency(user, &DependencyId::new(id), update)
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&json!({
                    "message": "Dependency updated successfully",
                    "dependency": dependency,
                }))?,
                OutputMode::Text => {
                    print!("Updated dependency: ");
                    output::print_text(|w| output::write_dependency(w, &dependency))?;
                }
            }
        }
        DepAction::Remove { id } => {
            let removed = manager
                .delete_dependency(user, &DependencyId::new(id))
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&json!({
                    "message": "Dependency deleted successfully",
                }))?,
                OutputMode::Text => {
                    println!(
                        "Removed dependency: {} ({} -> {})",
                        removed.id, removed.predecessor_id, removed.successor_id
                    );
                }
            }
        }
        DepAction::Show { milestone } => {
            let view = manager
                .milestone_dependencies(user, &MilestoneId::new(milestone))
                .await?;

            match output_mode {
                OutputMode::Json => output::print_json(&view)?,
                OutputMode::Text => {
                    output::print_text(|w| output::write_milestone_dependencies(w, &view))?;
                }
            }
        }
        DepAction::Project { project } => {
            let view = manager
                .project_dependencies(user, &ProjectId::new(project))
                .await?;

            match output_mode {
                OutputMode::Json => output::print_json(&view)?,
                OutputMode::Text => {
                    output::print_text(|w| output::write_project_overview(w, &view))?;
                }
            }
        }
    }
    Ok(())
}

/// Execute the propagate command
pub async fn execute_propagate(
    app: &App,
    args: &PropagateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let changes = app
        .manager()
        .propagate_status(&MilestoneId::new(&args.milestone))
        .await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&json!({
            "milestoneId": args.milestone,
            "statusChanges": changes,
        }))?,
        OutputMode::Text => output::print_text(|w| output::write_status_changes(w, &changes))?,
    }
    Ok(())
}
