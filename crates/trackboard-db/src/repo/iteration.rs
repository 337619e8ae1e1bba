//! Iteration repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use trackboard_core::ResourceId;
use trackboard_core::status::IterationStatus;

use crate::{DbError, DbResult};

/// An iteration (sprint/milestone) of a project.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Iteration {
    pub id: uuid::Uuid,
    pub project_id: uuid::Uuid,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait IterationRepo: Send + Sync {
    /// List iterations belonging to a project.
    async fn list_by_project(&self, project_id: ResourceId) -> DbResult<Vec<Iteration>>;

    /// Set an iteration's status. Idempotent: reapplying the same status is
    /// a no-op state-wise.
    async fn set_status(&self, id: ResourceId, status: IterationStatus) -> DbResult<Iteration>;
}

/// PostgreSQL implementation of IterationRepo.
pub struct PgIterationRepo {
    pool: PgPool,
}

impl PgIterationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IterationRepo for PgIterationRepo {
    async fn list_by_project(&self, project_id: ResourceId) -> DbResult<Vec<Iteration>> {
        let iterations = sqlx::query_as::<_, Iteration>(
            "SELECT * FROM iterations WHERE project_id = $1 ORDER BY name",
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(iterations)
    }

    async fn set_status(&self, id: ResourceId, status: IterationStatus) -> DbResult<Iteration> {
        let iteration = sqlx::query_as::<_, Iteration>(
            "UPDATE iterations SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id.as_uuid())
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("iteration {}", id)))?;
        Ok(iteration)
    }
}
