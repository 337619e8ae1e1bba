//! Repository traits and implementations.

pub mod iteration;
pub mod project;
pub mod repository;
pub mod work_item;

pub use iteration::{Iteration, IterationRepo, PgIterationRepo};
pub use project::{Member, PgProjectRepo, Project, ProjectRepo, ProjectSummary, UpdateProject};
pub use repository::{
    PgRepositoryRepo, Repository, RepositoryRepo, RepositorySummary, UpsertRepository,
};
pub use work_item::{PgWorkItemRepo, WorkItem, WorkItemRepo, WorkItemWithTasks};
