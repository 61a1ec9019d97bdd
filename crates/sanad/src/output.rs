//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or, with `--json`, the
//! same JSON bodies the request layer produces.

use crate::domain::{
    DependencyStatus, Milestone, MilestoneDependency, MilestoneStatus, Project,
};
use crate::manager::{MilestoneDependencies, ProjectDependencyOverview, StatusChange};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

// ============================================================================
// Color Helpers
// ============================================================================

/// Apply color to milestone status text.
fn colorize_milestone_status(status: MilestoneStatus) -> String {
    let text = status.to_string();
    match status {
        MilestoneStatus::NotStarted => text.white().to_string(),
        MilestoneStatus::InProgress => text.yellow().to_string(),
        MilestoneStatus::Blocked => text.red().to_string(),
        MilestoneStatus::Completed => text.green().to_string(),
    }
}

/// Apply color to edge status text.
fn colorize_dependency_status(status: DependencyStatus) -> String {
    let text = status.to_string();
    match status {
        DependencyStatus::Active => text.yellow().to_string(),
        DependencyStatus::Satisfied => text.green().to_string(),
        DependencyStatus::Blocked => text.red().to_string(),
        DependencyStatus::Cancelled => text.dimmed().to_string(),
    }
}

fn colorize_id(id: &str) -> String {
    id.cyan().to_string()
}

fn section(title: &str) -> String {
    title.bold().to_string()
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Print any serializable value as pretty JSON to stdout
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

/// Print text produced by `render` to stdout
pub fn print_text<F>(render: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    render(&mut handle)
}

// ============================================================================
// Text Formatting
// ============================================================================

/// One line describing a project
pub fn write_project<W: Write + ?Sized>(w: &mut W, project: &Project) -> io::Result<()> {
    writeln!(w, "{} {}", colorize_id(project.id.as_str()), project.name)?;
    writeln!(w, "  founder: {}", project.founder_id)?;
    if let Some(lead) = &project.team_lead_id {
        writeln!(w, "  lead:    {lead}")?;
    }
    if !project.core_team_member_ids.is_empty() {
        let members: Vec<&str> = project
            .core_team_member_ids
            .iter()
            .map(|m| m.as_str())
            .collect();
        writeln!(w, "  team:    {}", members.join(", "))?;
    }
    Ok(())
}

/// One line describing a milestone
pub fn write_milestone<W: Write + ?Sized>(w: &mut W, milestone: &Milestone) -> io::Result<()> {
    let due = milestone
        .due_date
        .map_or_else(|| "no due date".to_string(), |d| format!("due {d}"));
    writeln!(
        w,
        "{} [{}] {} ({}, {})",
        colorize_id(milestone.id.as_str()),
        colorize_milestone_status(milestone.status),
        milestone.title,
        milestone.priority,
        due.dimmed()
    )
}

/// One line describing an edge
pub fn write_dependency<W: Write + ?Sized>(
    w: &mut W,
    dependency: &MilestoneDependency,
) -> io::Result<()> {
    let mut line = format!(
        "{} {} -> {} {} [{}] criticality {}",
        colorize_id(dependency.id.as_str()),
        dependency.predecessor_id,
        dependency.successor_id,
        dependency.kind,
        colorize_dependency_status(dependency.status),
        dependency.criticality_level,
    );
    if dependency.lag_days != 0 {
        line.push_str(&format!(", lag {}d", dependency.lag_days));
    }
    if !dependency.is_hard_constraint {
        line.push_str(", soft");
    }
    writeln!(w, "{line}")?;
    if let Some(description) = &dependency.description {
        writeln!(w, "    {}", description.dimmed())?;
    }
    Ok(())
}

/// Status changes made by propagation
pub fn write_status_changes<W: Write + ?Sized>(
    w: &mut W,
    changes: &[StatusChange],
) -> io::Result<()> {
    if changes.is_empty() {
        return writeln!(w, "No status changes");
    }
    for change in changes {
        writeln!(
            w,
            "{}: {} -> {}",
            colorize_id(change.milestone_id.as_str()),
            colorize_milestone_status(change.from),
            colorize_milestone_status(change.to)
        )?;
    }
    Ok(())
}

fn write_edge_section<W: Write + ?Sized>(
    w: &mut W,
    title: &str,
    edges: &[MilestoneDependency],
) -> io::Result<()> {
    writeln!(w, "{} ({}):", section(title), edges.len())?;
    if edges.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for edge in edges {
        write!(w, "  ")?;
        write_dependency(w, edge)?;
    }
    Ok(())
}

fn write_milestone_section<W: Write + ?Sized>(
    w: &mut W,
    title: &str,
    milestones: &[Milestone],
) -> io::Result<()> {
    writeln!(w, "{} ({}):", section(title), milestones.len())?;
    if milestones.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for milestone in milestones {
        write!(w, "  ")?;
        write_milestone(w, milestone)?;
    }
    Ok(())
}

/// Edges around a milestone
pub fn write_milestone_dependencies<W: Write + ?Sized>(
    w: &mut W,
    view: &MilestoneDependencies,
) -> io::Result<()> {
    write_milestone(w, &view.milestone)?;
    writeln!(w)?;
    write_edge_section(w, "Predecessors", &view.predecessors)?;
    write_edge_section(w, "Successors", &view.successors)?;
    write_milestone_section(w, "Critical path", &view.critical_path)
}

/// Edges across a project
pub fn write_project_overview<W: Write + ?Sized>(
    w: &mut W,
    view: &ProjectDependencyOverview,
) -> io::Result<()> {
    let counts = &view.counts;
    writeln!(
        w,
        "{} {} dependencies ({} active, {} satisfied, {} blocked, {} cancelled)",
        colorize_id(view.project_id.as_str()),
        counts.total,
        counts.active,
        counts.satisfied,
        counts.blocked,
        counts.cancelled
    )?;
    writeln!(w)?;
    write_edge_section(w, "Dependencies", &view.dependencies)?;
    write_milestone_section(w, "Critical path", &view.critical_path)?;
    write_milestone_section(w, "Blocked milestones", &view.blocked_milestones)
}
