//! SyncClient trait and pull types.
//!
//! Sync clients fetch the latest revision of a configured repository from its
//! remote and report the resulting revision identifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Result of pulling a repository: the revision id now at the head of the
/// tracked branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullResult {
    pub oid: String,
}

/// Trait for remote repository sync clients.
#[async_trait]
pub trait SyncClient: Send + Sync {
    /// Pull the tracked branch of the repository checked out at `location`,
    /// authenticating with `user`/`secret`, and return the fresh head revision.
    async fn pull(
        &self,
        location: &Path,
        user: &str,
        secret: Option<&str>,
        branch: &str,
    ) -> Result<PullResult>;
}
