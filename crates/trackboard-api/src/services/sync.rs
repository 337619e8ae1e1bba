//! Repository sync-then-build workflow.
//!
//! Each invocation freshly determines whether the repository is in sync with
//! its remote: pull, compare the fetched revision against the stored
//! `previous_oid` watermark, and only rebuild on a mismatch. The watermark is
//! written after the build outcome is known, so a crash mid-build cannot lose
//! the trigger; the next pull observes the same mismatch and retries.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use trackboard_core::credentials::CredentialCodec;
use trackboard_core::runner::{BuildOutput, BuildRunner};
use trackboard_core::sync::SyncClient;
use trackboard_core::{Error, ResourceId, Result};
use trackboard_db::RepositoryRepo;

use super::db_err;

pub const REPO_NOT_FOUND: &str = "Repo not found!";
const NO_CHANGE: &str = "No Change";

/// Payload of a pull invocation: either the captured build output, or a
/// literal no-change status when the watermark matched.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PullOutcome {
    NoChange { status: &'static str },
    Built(BuildOutput),
}

impl PullOutcome {
    fn no_change() -> Self {
        PullOutcome::NoChange { status: NO_CHANGE }
    }
}

/// Composes the data layer, the sync client, the build runner and the
/// credential codec into the pull and rebuild operations.
pub struct SyncService {
    repositories: Arc<dyn RepositoryRepo>,
    sync_client: Arc<dyn SyncClient>,
    runner: Arc<dyn BuildRunner>,
    codec: Arc<dyn CredentialCodec>,
}

impl SyncService {
    pub fn new(
        repositories: Arc<dyn RepositoryRepo>,
        sync_client: Arc<dyn SyncClient>,
        runner: Arc<dyn BuildRunner>,
        codec: Arc<dyn CredentialCodec>,
    ) -> Self {
        Self {
            repositories,
            sync_client,
            runner,
            codec,
        }
    }

    /// Pull the repository and rebuild when the fetched revision differs from
    /// the stored watermark. The watermark always advances to the fetched
    /// revision once the outcome of this invocation is known.
    pub async fn pull(&self, id: ResourceId) -> Result<PullOutcome> {
        let repo = self
            .repositories
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| Error::NotFound(REPO_NOT_FOUND.to_string()))?;

        let secret = match &repo.password {
            Some(ciphertext) => Some(self.codec.decrypt(ciphertext)?),
            None => None,
        };

        let location = Path::new(&repo.location);
        let pulled = self
            .sync_client
            .pull(location, &repo.username, secret.as_deref(), &repo.branch)
            .await?;

        let outcome = match &repo.previous_oid {
            Some(previous) if previous != &pulled.oid => {
                info!(
                    repo = %repo.name,
                    runner = self.runner.name(),
                    from = %previous,
                    to = %pulled.oid,
                    "Revision changed, rebuilding"
                );
                let output = self.runner.exec(&repo.build_command, location).await?;
                PullOutcome::Built(output)
            }
            _ => {
                debug!(repo = %repo.name, oid = %pulled.oid, "No revision change");
                PullOutcome::no_change()
            }
        };

        self.repositories
            .set_previous_oid(id, &pulled.oid)
            .await
            .map_err(db_err)?;

        Ok(outcome)
    }

    /// Re-run the configured build directly, without touching the remote or
    /// the watermark.
    pub async fn rebuild(&self, id: ResourceId) -> Result<BuildOutput> {
        let repo = self
            .repositories
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| Error::NotFound(REPO_NOT_FOUND.to_string()))?;

        info!(repo = %repo.name, runner = self.runner.name(), "Rebuilding on request");
        self.runner
            .exec(&repo.build_command, Path::new(&repo.location))
            .await
    }
}
