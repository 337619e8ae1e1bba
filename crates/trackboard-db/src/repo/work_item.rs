//! Work item repository.
//!
//! Work items are mirrored from the external tracking system and are strictly
//! read-only here: every method either fetches or counts, nothing writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use trackboard_core::status::{USER_STORY, WorkItemState};

use crate::DbResult;

/// A mirrored work item. `id` is the identifier assigned by the external
/// tracking system; `project` holds the owning project's external id.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkItem {
    pub id: i64,
    pub project: String,
    pub title: String,
    pub kind: String,
    pub state: String,
    pub assigned_to: Option<String>,
    pub parent: Option<i64>,
    pub iteration: Option<String>,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user story together with its child task items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItemWithTasks {
    #[serde(flatten)]
    pub story: WorkItem,
    pub tasks: Vec<WorkItem>,
}

#[async_trait]
pub trait WorkItemRepo: Send + Sync {
    /// Count distinct parents of closed, non-accepted task-like items.
    ///
    /// Matches items in `project` whose kind is not "User Story", whose state
    /// is Closed, that are not marked accepted and that have a parent; the
    /// result is the number of distinct parents, i.e. how many stories have
    /// closed work awaiting acceptance.
    async fn count_closed_unaccepted_parents(&self, project: &str) -> DbResult<i64>;

    /// Count task-like items assigned to `assigned_to` in the given state.
    async fn count_assigned(
        &self,
        project: &str,
        assigned_to: &str,
        state: WorkItemState,
    ) -> DbResult<i64>;

    /// Count user stories in an iteration.
    async fn count_iteration_stories(&self, project: &str, iteration: &str) -> DbResult<i64>;

    /// Count closed user stories in an iteration.
    async fn count_iteration_closed_stories(&self, project: &str, iteration: &str)
    -> DbResult<i64>;

    /// Fetch all user stories of a project, each with its child tasks.
    async fn list_stories_with_tasks(&self, project: &str) -> DbResult<Vec<WorkItemWithTasks>>;
}

/// PostgreSQL implementation of WorkItemRepo.
pub struct PgWorkItemRepo {
    pool: PgPool,
}

impl PgWorkItemRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkItemRepo for PgWorkItemRepo {
    async fn count_closed_unaccepted_parents(&self, project: &str) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT parent) FROM work_items
            WHERE project = $1
              AND kind <> $2
              AND state = 'Closed'
              AND is_accepted IS NOT TRUE
              AND parent IS NOT NULL
            "#,
        )
        .bind(project)
        .bind(USER_STORY)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_assigned(
        &self,
        project: &str,
        assigned_to: &str,
        state: WorkItemState,
    ) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM work_items
            WHERE project = $1 AND assigned_to = $2 AND state = $3 AND kind <> $4
            "#,
        )
        .bind(project)
        .bind(assigned_to)
        .bind(state.to_string())
        .bind(USER_STORY)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_iteration_stories(&self, project: &str, iteration: &str) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM work_items WHERE project = $1 AND iteration = $2 AND kind = $3",
        )
        .bind(project)
        .bind(iteration)
        .bind(USER_STORY)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_iteration_closed_stories(
        &self,
        project: &str,
        iteration: &str,
    ) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM work_items
            WHERE project = $1 AND iteration = $2 AND kind = $3 AND state = 'Closed'
            "#,
        )
        .bind(project)
        .bind(iteration)
        .bind(USER_STORY)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list_stories_with_tasks(&self, project: &str) -> DbResult<Vec<WorkItemWithTasks>> {
        let stories = sqlx::query_as::<_, WorkItem>(
            "SELECT * FROM work_items WHERE project = $1 AND kind = $2 ORDER BY id",
        )
        .bind(project)
        .bind(USER_STORY)
        .fetch_all(&self.pool)
        .await?;

        let tasks = sqlx::query_as::<_, WorkItem>(
            r#"
            SELECT * FROM work_items
            WHERE project = $1 AND kind <> $2 AND parent IS NOT NULL
            ORDER BY id
            "#,
        )
        .bind(project)
        .bind(USER_STORY)
        .fetch_all(&self.pool)
        .await?;

        let mut by_parent: HashMap<i64, Vec<WorkItem>> = HashMap::new();
        for task in tasks {
            if let Some(parent) = task.parent {
                by_parent.entry(parent).or_default().push(task);
            }
        }

        Ok(stories
            .into_iter()
            .map(|story| {
                let tasks = by_parent.remove(&story.id).unwrap_or_default();
                WorkItemWithTasks { story, tasks }
            })
            .collect())
    }
}
