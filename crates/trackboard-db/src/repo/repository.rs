//! Repository (source control) repository.
//!
//! A `Repository` row carries the connection details for a project's source
//! repository: local checkout location, credentials (password stored as
//! ciphertext only), tracked branch, the build command to run on change, and
//! the `previous_oid` watermark recording the last-seen revision.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use trackboard_core::ResourceId;
use uuid::Uuid;

use crate::{DbError, DbResult};

/// A configured source repository. `password`, when set, is always the
/// encrypted form; plaintext never reaches this layer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Repository {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    /// Local working directory of the checkout; also the build working dir.
    pub location: String,
    pub username: String,
    pub password: Option<String>,
    pub branch: String,
    pub build_command: String,
    /// Last-observed remote revision. The sole gate for the conditional build.
    pub previous_oid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection of a repository without the password column. This is the only
/// shape that ever leaves the API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RepositorySummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub location: String,
    pub username: String,
    pub branch: String,
    pub build_command: String,
    pub previous_oid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Repository> for RepositorySummary {
    fn from(repo: Repository) -> Self {
        Self {
            id: repo.id,
            project_id: repo.project_id,
            name: repo.name,
            location: repo.location,
            username: repo.username,
            branch: repo.branch,
            build_command: repo.build_command,
            previous_oid: repo.previous_oid,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
        }
    }
}

/// Field patch for creating or updating a repository. Only these fields are
/// writable through the API; the watermark is managed by the sync workflow
/// and never patched directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertRepository {
    pub id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub username: Option<String>,
    /// Ciphertext by the time it reaches the data layer.
    pub password: Option<String>,
    pub branch: Option<String>,
    pub build_command: Option<String>,
}

#[async_trait]
pub trait RepositoryRepo: Send + Sync {
    /// Find a repository by ID, including the stored ciphertext.
    async fn find_by_id(&self, id: ResourceId) -> DbResult<Option<Repository>>;

    /// Find a repository by ID with the password excluded from the projection.
    async fn find_summary_by_id(&self, id: ResourceId) -> DbResult<Option<RepositorySummary>>;

    /// List the names of a project's repositories.
    async fn list_names_by_project(&self, project_id: ResourceId) -> DbResult<Vec<String>>;

    /// Create a new repository from the patch. `project_id`, `name`,
    /// `location`, `branch` and `build_command` are required.
    async fn create(&self, patch: &UpsertRepository) -> DbResult<Repository>;

    /// Apply a field patch to an existing repository.
    async fn update(&self, id: ResourceId, patch: &UpsertRepository) -> DbResult<Repository>;

    /// Record the last-observed remote revision.
    async fn set_previous_oid(&self, id: ResourceId, oid: &str) -> DbResult<()>;
}

/// PostgreSQL implementation of RepositoryRepo.
pub struct PgRepositoryRepo {
    pool: PgPool,
}

impl PgRepositoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepositoryRepo for PgRepositoryRepo {
    async fn find_by_id(&self, id: ResourceId) -> DbResult<Option<Repository>> {
        let repo = sqlx::query_as::<_, Repository>("SELECT * FROM repositories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(repo)
    }

    async fn find_summary_by_id(&self, id: ResourceId) -> DbResult<Option<RepositorySummary>> {
        let repo = sqlx::query_as::<_, RepositorySummary>(
            r#"
            SELECT id, project_id, name, location, username, branch,
                   build_command, previous_oid, created_at, updated_at
            FROM repositories WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(repo)
    }

    async fn list_names_by_project(&self, project_id: ResourceId) -> DbResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM repositories WHERE project_id = $1 ORDER BY name",
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn create(&self, patch: &UpsertRepository) -> DbResult<Repository> {
        let project_id = patch
            .project_id
            .ok_or_else(|| DbError::InvalidData("project_id is required".to_string()))?;
        let name = patch
            .name
            .as_deref()
            .ok_or_else(|| DbError::InvalidData("name is required".to_string()))?;
        let location = patch
            .location
            .as_deref()
            .ok_or_else(|| DbError::InvalidData("location is required".to_string()))?;
        let branch = patch
            .branch
            .as_deref()
            .ok_or_else(|| DbError::InvalidData("branch is required".to_string()))?;
        let build_command = patch
            .build_command
            .as_deref()
            .ok_or_else(|| DbError::InvalidData("build_command is required".to_string()))?;

        let repo = sqlx::query_as::<_, Repository>(
            r#"
            INSERT INTO repositories (
                id, project_id, name, location, username, password, branch,
                build_command, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(project_id)
        .bind(name)
        .bind(location)
        .bind(patch.username.as_deref().unwrap_or(""))
        .bind(patch.password.as_deref())
        .bind(branch)
        .bind(build_command)
        .fetch_one(&self.pool)
        .await?;
        Ok(repo)
    }

    async fn update(&self, id: ResourceId, patch: &UpsertRepository) -> DbResult<Repository> {
        let repo = sqlx::query_as::<_, Repository>(
            r#"
            UPDATE repositories SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                username = COALESCE($4, username),
                password = COALESCE($5, password),
                branch = COALESCE($6, branch),
                build_command = COALESCE($7, build_command),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(patch.location.as_deref())
        .bind(patch.username.as_deref())
        .bind(patch.password.as_deref())
        .bind(patch.branch.as_deref())
        .bind(patch.build_command.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("repository {}", id)))?;
        Ok(repo)
    }

    async fn set_previous_oid(&self, id: ResourceId, oid: &str) -> DbResult<()> {
        sqlx::query(
            "UPDATE repositories SET previous_oid = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(oid)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
