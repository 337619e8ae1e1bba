//! Project repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use trackboard_core::ResourceId;
use trackboard_core::status::ProjectStatus;

use crate::{DbError, DbResult};

/// A tracked project.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: uuid::Uuid,
    pub name: String,
    pub status: String,
    /// Identifier of the project in the external tracking system.
    pub tfs_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection: name, status and external id only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectSummary {
    pub id: uuid::Uuid,
    pub name: String,
    pub status: String,
    pub tfs_id: String,
}

/// A team member attached to a project, mirrored from the tracking system.
/// Read-only here; only statistics consume it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: uuid::Uuid,
    pub project_id: uuid::Uuid,
    pub display_name: String,
    pub unique_name: String,
}

/// Field patch for a project. Only these fields are mutable through the API;
/// identity and timestamps are never part of a patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub tfs_id: Option<String>,
}

#[async_trait]
pub trait ProjectRepo: Send + Sync {
    /// List all projects as summaries, ordered by status ascending.
    async fn list(&self) -> DbResult<Vec<ProjectSummary>>;

    /// List full rows for all projects with the given status.
    async fn list_by_status(&self, status: ProjectStatus) -> DbResult<Vec<Project>>;

    /// Get a project by ID.
    async fn get_by_id(&self, id: ResourceId) -> DbResult<Project>;

    /// Apply an allow-listed field patch.
    async fn update(&self, id: ResourceId, patch: &UpdateProject) -> DbResult<Project>;

    /// Set the project status.
    async fn set_status(&self, id: ResourceId, status: ProjectStatus) -> DbResult<Project>;

    /// Delete a project. Succeeds whether or not a row existed.
    async fn delete(&self, id: ResourceId) -> DbResult<()>;

    /// List the members attached to a project.
    async fn list_members(&self, project_id: ResourceId) -> DbResult<Vec<Member>>;
}

/// PostgreSQL implementation of ProjectRepo.
pub struct PgProjectRepo {
    pool: PgPool,
}

impl PgProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepo for PgProjectRepo {
    async fn list(&self) -> DbResult<Vec<ProjectSummary>> {
        let projects = sqlx::query_as::<_, ProjectSummary>(
            "SELECT id, name, status, tfs_id FROM projects ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn list_by_status(&self, status: ProjectStatus) -> DbResult<Vec<Project>> {
        let projects =
            sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE status = $1 ORDER BY name")
                .bind(status.to_string())
                .fetch_all(&self.pool)
                .await?;
        Ok(projects)
    }

    async fn get_by_id(&self, id: ResourceId) -> DbResult<Project> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("project {}", id)))?;
        Ok(project)
    }

    async fn update(&self, id: ResourceId, patch: &UpdateProject) -> DbResult<Project> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                name = COALESCE($2, name),
                status = COALESCE($3, status),
                tfs_id = COALESCE($4, tfs_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(patch.status.map(|s| s.to_string()))
        .bind(patch.tfs_id.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("project {}", id)))?;
        Ok(project)
    }

    async fn set_status(&self, id: ResourceId, status: ProjectStatus) -> DbResult<Project> {
        let project = sqlx::query_as::<_, Project>(
            "UPDATE projects SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id.as_uuid())
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("project {}", id)))?;
        Ok(project)
    }

    async fn delete(&self, id: ResourceId) -> DbResult<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_members(&self, project_id: ResourceId) -> DbResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE project_id = $1 ORDER BY display_name",
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}
