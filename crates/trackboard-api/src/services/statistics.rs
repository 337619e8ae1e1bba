//! Active-project statistics aggregation.
//!
//! For every active project this joins repository names, iterations and
//! members, then derives the work-item counts the dashboard renders. The
//! per-member and per-iteration sub-counts have no ordering dependency, so
//! they run as bounded concurrent batches instead of one long sequential
//! chain of queries. Any failed sub-count fails the whole call; partial
//! results are discarded.

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use trackboard_core::status::{ProjectStatus, WorkItemState};
use trackboard_core::{ResourceId, Result};
use trackboard_db::{
    Iteration, IterationRepo, Member, Project, ProjectRepo, RepositoryRepo, WorkItemRepo,
};

use super::db_err;

/// Upper bound on concurrent count queries per project, so a large team does
/// not turn one statistics call into a datastore stampede.
const AGGREGATION_CONCURRENCY: usize = 8;

#[derive(Debug, Serialize)]
pub struct ProjectStatistics {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub tfs_id: String,
    /// Distinct stories with closed, not-yet-accepted child tasks.
    pub task_closed: i64,
    pub repos: Vec<String>,
    pub members: Vec<MemberStatistics>,
    pub iterations: Vec<IterationStatistics>,
}

#[derive(Debug, Serialize)]
pub struct MemberStatistics {
    pub display_name: String,
    pub unique_name: String,
    pub task_count: i64,
    pub task_active: i64,
    pub task_closed: i64,
}

#[derive(Debug, Serialize)]
pub struct IterationStatistics {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub task_count: i64,
    pub task_closed: i64,
}

/// Read-side aggregation over the four stores.
pub struct StatisticsService {
    projects: Arc<dyn ProjectRepo>,
    work_items: Arc<dyn WorkItemRepo>,
    iterations: Arc<dyn IterationRepo>,
    repositories: Arc<dyn RepositoryRepo>,
}

impl StatisticsService {
    pub fn new(
        projects: Arc<dyn ProjectRepo>,
        work_items: Arc<dyn WorkItemRepo>,
        iterations: Arc<dyn IterationRepo>,
        repositories: Arc<dyn RepositoryRepo>,
    ) -> Self {
        Self {
            projects,
            work_items,
            iterations,
            repositories,
        }
    }

    /// Statistics for every active project.
    pub async fn collect(&self) -> Result<Vec<ProjectStatistics>> {
        let projects = self
            .projects
            .list_by_status(ProjectStatus::Active)
            .await
            .map_err(db_err)?;

        let mut out = Vec::with_capacity(projects.len());
        for project in projects {
            out.push(self.project_statistics(project).await?);
        }
        Ok(out)
    }

    async fn project_statistics(&self, project: Project) -> Result<ProjectStatistics> {
        let project_id = ResourceId::from_uuid(project.id);

        let repos = self
            .repositories
            .list_names_by_project(project_id)
            .await
            .map_err(db_err)?;
        let members = self
            .projects
            .list_members(project_id)
            .await
            .map_err(db_err)?;
        let iterations = self
            .iterations
            .list_by_project(project_id)
            .await
            .map_err(db_err)?;

        let task_closed = self
            .work_items
            .count_closed_unaccepted_parents(&project.tfs_id)
            .await
            .map_err(db_err)?;

        let member_counts = members
            .into_iter()
            .map(|member| self.member_statistics(&project.tfs_id, member));
        let members = stream::iter(member_counts)
            .buffered(AGGREGATION_CONCURRENCY)
            .try_collect::<Vec<_>>()
            .await?;

        let iteration_counts = iterations
            .into_iter()
            .map(|iteration| self.iteration_statistics(&project.tfs_id, iteration));
        let iterations = stream::iter(iteration_counts)
            .buffered(AGGREGATION_CONCURRENCY)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(ProjectStatistics {
            id: project.id,
            name: project.name,
            status: project.status,
            tfs_id: project.tfs_id,
            task_closed,
            repos,
            members,
            iterations,
        })
    }

    async fn member_statistics(&self, project: &str, member: Member) -> Result<MemberStatistics> {
        let assignee = Self::assignee(&member);

        let task_count = self
            .work_items
            .count_assigned(project, &assignee, WorkItemState::New)
            .await
            .map_err(db_err)?;
        let task_active = self
            .work_items
            .count_assigned(project, &assignee, WorkItemState::Active)
            .await
            .map_err(db_err)?;
        let task_closed = self
            .work_items
            .count_assigned(project, &assignee, WorkItemState::Closed)
            .await
            .map_err(db_err)?;

        Ok(MemberStatistics {
            display_name: member.display_name,
            unique_name: member.unique_name,
            task_count,
            task_active,
            task_closed,
        })
    }

    async fn iteration_statistics(
        &self,
        project: &str,
        iteration: Iteration,
    ) -> Result<IterationStatistics> {
        let task_count = self
            .work_items
            .count_iteration_stories(project, &iteration.name)
            .await
            .map_err(db_err)?;
        let task_closed = self
            .work_items
            .count_iteration_closed_stories(project, &iteration.name)
            .await
            .map_err(db_err)?;

        Ok(IterationStatistics {
            id: iteration.id,
            name: iteration.name,
            status: iteration.status,
            task_count,
            task_closed,
        })
    }

    /// Assignee match key, exactly as the tracking system stores it.
    fn assignee(member: &Member) -> String {
        format!("{} <{}>", member.display_name, member.unique_name)
    }
}
