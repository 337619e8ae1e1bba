//! Application state.

use sqlx::PgPool;
use std::sync::Arc;
use trackboard_core::credentials::CredentialCodec;
use trackboard_core::runner::BuildRunner;
use trackboard_core::sync::SyncClient;
use trackboard_db::{
    IterationRepo, PgIterationRepo, PgProjectRepo, PgRepositoryRepo, PgWorkItemRepo, ProjectRepo,
    RepositoryRepo, WorkItemRepo,
};
use trackboard_executor::LocalShellExecutor;

use crate::services::crypto::AesCredentialCodec;
use crate::services::git::GitSyncClient;
use crate::services::statistics::StatisticsService;
use crate::services::sync::SyncService;

/// Shared application state. Everything behind the trait seams so tests can
/// substitute in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<dyn ProjectRepo>,
    pub work_items: Arc<dyn WorkItemRepo>,
    pub iterations: Arc<dyn IterationRepo>,
    pub repositories: Arc<dyn RepositoryRepo>,
    pub codec: Arc<dyn CredentialCodec>,
    pub sync: Arc<SyncService>,
    pub statistics: Arc<StatisticsService>,
}

impl AppState {
    pub fn new(pool: PgPool, master_key: &str) -> Self {
        let projects: Arc<dyn ProjectRepo> = Arc::new(PgProjectRepo::new(pool.clone()));
        let work_items: Arc<dyn WorkItemRepo> = Arc::new(PgWorkItemRepo::new(pool.clone()));
        let iterations: Arc<dyn IterationRepo> = Arc::new(PgIterationRepo::new(pool.clone()));
        let repositories: Arc<dyn RepositoryRepo> = Arc::new(PgRepositoryRepo::new(pool.clone()));

        let codec: Arc<dyn CredentialCodec> = Arc::new(AesCredentialCodec::new(master_key));
        let sync_client: Arc<dyn SyncClient> = Arc::new(GitSyncClient::new());
        let runner: Arc<dyn BuildRunner> = Arc::new(LocalShellExecutor::new());

        let sync = Arc::new(SyncService::new(
            repositories.clone(),
            sync_client,
            runner,
            codec.clone(),
        ));
        let statistics = Arc::new(StatisticsService::new(
            projects.clone(),
            work_items.clone(),
            iterations.clone(),
            repositories.clone(),
        ));

        Self {
            projects,
            work_items,
            iterations,
            repositories,
            codec,
            sync,
            statistics,
        }
    }
}
