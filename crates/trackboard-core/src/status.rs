//! Closed status domains for projects, iterations and work items.
//!
//! Status values arrive as free text on the HTTP boundary and as text columns
//! from the database; both are validated against these enumerations before
//! anything is written back.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Paused,
    Archived,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::Paused => write!(f, "paused"),
            ProjectStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "paused" => Ok(ProjectStatus::Paused),
            "archived" => Ok(ProjectStatus::Archived),
            _ => Err(format!("Unknown project status: {}", s)),
        }
    }
}

/// Lifecycle status of an iteration (sprint/milestone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationStatus {
    Plan,
    Released,
}

impl std::fmt::Display for IterationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IterationStatus::Plan => write!(f, "plan"),
            IterationStatus::Released => write!(f, "released"),
        }
    }
}

impl std::str::FromStr for IterationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plan" => Ok(IterationStatus::Plan),
            "released" => Ok(IterationStatus::Released),
            _ => Err(format!("Unknown iteration status: {}", s)),
        }
    }
}

/// Workflow state of a mirrored work item. Casing follows the upstream
/// tracking system, which is also how the values are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkItemState {
    New,
    Active,
    Closed,
}

impl std::fmt::Display for WorkItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkItemState::New => write!(f, "New"),
            WorkItemState::Active => write!(f, "Active"),
            WorkItemState::Closed => write!(f, "Closed"),
        }
    }
}

impl std::str::FromStr for WorkItemState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(WorkItemState::New),
            "Active" => Ok(WorkItemState::Active),
            "Closed" => Ok(WorkItemState::Closed),
            _ => Err(format!("Unknown work item state: {}", s)),
        }
    }
}

/// The work item kind that statistics treat as a story rather than a task.
/// Other kinds (Task, Bug, ...) are open-ended upstream and stay as text.
pub const USER_STORY: &str = "User Story";
