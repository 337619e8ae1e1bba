//! In-memory fakes shared by the service and route handler tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use trackboard_core::credentials::CredentialCodec;
use trackboard_core::runner::{BuildOutput, BuildRunner};
use trackboard_core::status::{IterationStatus, ProjectStatus, WorkItemState};
use trackboard_core::sync::{PullResult, SyncClient};
use trackboard_core::{Error, ResourceId, Result};
use trackboard_db::{
    DbError, DbResult, Iteration, IterationRepo, Member, Project, ProjectRepo, ProjectSummary,
    Repository, RepositoryRepo, RepositorySummary, UpdateProject, UpsertRepository, WorkItem,
    WorkItemRepo, WorkItemWithTasks,
};

use crate::AppState;
use crate::services::statistics::StatisticsService;
use crate::services::sync::SyncService;

/// Application state wired entirely from fakes, with [`PlainCodec`] as the
/// credential codec.
pub fn app_state(
    projects: Arc<dyn ProjectRepo>,
    work_items: Arc<dyn WorkItemRepo>,
    iterations: Arc<dyn IterationRepo>,
    repositories: Arc<dyn RepositoryRepo>,
    sync_client: Arc<dyn SyncClient>,
    runner: Arc<dyn BuildRunner>,
) -> AppState {
    let codec: Arc<dyn CredentialCodec> = Arc::new(PlainCodec);
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

    AppState {
        projects,
        work_items,
        iterations,
        repositories,
        codec,
        sync,
        statistics,
    }
}

pub fn make_project(name: &str, status: &str, tfs_id: &str) -> Project {
    Project {
        id: Uuid::now_v7(),
        name: name.to_string(),
        status: status.to_string(),
        tfs_id: tfs_id.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn make_member(project_id: Uuid, display_name: &str, unique_name: &str) -> Member {
    Member {
        id: Uuid::now_v7(),
        project_id,
        display_name: display_name.to_string(),
        unique_name: unique_name.to_string(),
    }
}

pub fn make_iteration(project_id: Uuid, name: &str, status: &str) -> Iteration {
    Iteration {
        id: Uuid::now_v7(),
        project_id,
        name: name.to_string(),
        status: status.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn make_repository(name: &str, previous_oid: Option<&str>) -> Repository {
    Repository {
        id: Uuid::now_v7(),
        project_id: Uuid::now_v7(),
        name: name.to_string(),
        location: "/srv/checkouts/app".to_string(),
        username: "ci".to_string(),
        password: None,
        branch: "main".to_string(),
        build_command: "make build".to_string(),
        previous_oid: previous_oid.map(String::from),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn make_work_item(id: i64, project: &str, kind: &str, state: &str) -> WorkItem {
    WorkItem {
        id,
        project: project.to_string(),
        title: format!("item {}", id),
        kind: kind.to_string(),
        state: state.to_string(),
        assigned_to: None,
        parent: None,
        iteration: None,
        is_accepted: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Reversible stand-in codec: hex with a marker prefix, so tests can assert
/// both "not plaintext" and the exact decrypted value.
pub struct PlainCodec;

impl CredentialCodec for PlainCodec {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        Ok(format!("enc:{}", hex::encode(plaintext)))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let encoded = ciphertext
            .strip_prefix("enc:")
            .ok_or_else(|| Error::CryptoFailed("not a test ciphertext".to_string()))?;
        let raw = hex::decode(encoded)
            .map_err(|_| Error::CryptoFailed("bad test ciphertext".to_string()))?;
        String::from_utf8(raw).map_err(|_| Error::CryptoFailed("bad utf-8".to_string()))
    }
}

/// Sync client answering every pull with a fixed revision id.
pub struct FixedSyncClient {
    oid: String,
    pub pulls: AtomicUsize,
    last_secret: Mutex<Option<String>>,
}

impl FixedSyncClient {
    pub fn new(oid: &str) -> Self {
        Self {
            oid: oid.to_string(),
            pulls: AtomicUsize::new(0),
            last_secret: Mutex::new(None),
        }
    }

    pub fn last_secret(&self) -> Option<String> {
        self.last_secret.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncClient for FixedSyncClient {
    async fn pull(
        &self,
        _location: &Path,
        _user: &str,
        secret: Option<&str>,
        _branch: &str,
    ) -> Result<PullResult> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        *self.last_secret.lock().unwrap() = secret.map(String::from);
        Ok(PullResult {
            oid: self.oid.clone(),
        })
    }
}

/// Build runner that records invocations instead of spawning anything.
#[derive(Default)]
pub struct CountingRunner {
    pub calls: AtomicUsize,
    fail: bool,
    last: Mutex<Option<(String, String)>>,
}

impl CountingRunner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// The (command, working dir) of the most recent invocation.
    pub fn last_invocation(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildRunner for CountingRunner {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn exec(&self, command: &str, working_dir: &Path) -> Result<BuildOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((
            command.to_string(),
            working_dir.to_string_lossy().into_owned(),
        ));

        if self.fail {
            return Err(Error::BuildFailed("failed to spawn build command".to_string()));
        }

        Ok(BuildOutput {
            command: command.to_string(),
            exit_code: Some(0),
            success: true,
            stdout: String::new(),
            stderr: String::new(),
            finished_at: Utc::now(),
        })
    }
}

/// Repository store over a mutex-guarded map.
pub struct InMemoryRepositoryRepo {
    repos: Mutex<HashMap<Uuid, Repository>>,
}

impl InMemoryRepositoryRepo {
    pub fn with(repos: Vec<Repository>) -> Self {
        Self {
            repos: Mutex::new(repos.into_iter().map(|r| (r.id, r)).collect()),
        }
    }

    pub fn previous_oid(&self, id: ResourceId) -> Option<String> {
        self.repos
            .lock()
            .unwrap()
            .get(id.as_uuid())
            .and_then(|r| r.previous_oid.clone())
    }

    pub fn stored_password(&self, id: ResourceId) -> Option<String> {
        self.repos
            .lock()
            .unwrap()
            .get(id.as_uuid())
            .and_then(|r| r.password.clone())
    }
}

#[async_trait]
impl RepositoryRepo for InMemoryRepositoryRepo {
    async fn find_by_id(&self, id: ResourceId) -> DbResult<Option<Repository>> {
        Ok(self.repos.lock().unwrap().get(id.as_uuid()).cloned())
    }

    async fn find_summary_by_id(&self, id: ResourceId) -> DbResult<Option<RepositorySummary>> {
        Ok(self
            .repos
            .lock()
            .unwrap()
            .get(id.as_uuid())
            .cloned()
            .map(RepositorySummary::from))
    }

    async fn list_names_by_project(&self, project_id: ResourceId) -> DbResult<Vec<String>> {
        let mut names: Vec<String> = self
            .repos
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.project_id == *project_id.as_uuid())
            .map(|r| r.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn create(&self, patch: &UpsertRepository) -> DbResult<Repository> {
        let repo = Repository {
            id: Uuid::now_v7(),
            project_id: patch
                .project_id
                .ok_or_else(|| DbError::InvalidData("project_id is required".to_string()))?,
            name: patch
                .name
                .clone()
                .ok_or_else(|| DbError::InvalidData("name is required".to_string()))?,
            location: patch
                .location
                .clone()
                .ok_or_else(|| DbError::InvalidData("location is required".to_string()))?,
            username: patch.username.clone().unwrap_or_default(),
            password: patch.password.clone(),
            branch: patch
                .branch
                .clone()
                .ok_or_else(|| DbError::InvalidData("branch is required".to_string()))?,
            build_command: patch
                .build_command
                .clone()
                .ok_or_else(|| DbError::InvalidData("build_command is required".to_string()))?,
            previous_oid: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.repos.lock().unwrap().insert(repo.id, repo.clone());
        Ok(repo)
    }

    async fn update(&self, id: ResourceId, patch: &UpsertRepository) -> DbResult<Repository> {
        let mut repos = self.repos.lock().unwrap();
        let repo = repos
            .get_mut(id.as_uuid())
            .ok_or_else(|| DbError::NotFound(format!("repository {}", id)))?;

        if let Some(name) = &patch.name {
            repo.name = name.clone();
        }
        if let Some(location) = &patch.location {
            repo.location = location.clone();
        }
        if let Some(username) = &patch.username {
            repo.username = username.clone();
        }
        if let Some(password) = &patch.password {
            repo.password = Some(password.clone());
        }
        if let Some(branch) = &patch.branch {
            repo.branch = branch.clone();
        }
        if let Some(build_command) = &patch.build_command {
            repo.build_command = build_command.clone();
        }
        repo.updated_at = Utc::now();
        Ok(repo.clone())
    }

    async fn set_previous_oid(&self, id: ResourceId, oid: &str) -> DbResult<()> {
        let mut repos = self.repos.lock().unwrap();
        let repo = repos
            .get_mut(id.as_uuid())
            .ok_or_else(|| DbError::NotFound(format!("repository {}", id)))?;
        repo.previous_oid = Some(oid.to_string());
        Ok(())
    }
}

/// Project store over mutex-guarded vectors.
pub struct InMemoryProjectRepo {
    projects: Mutex<Vec<Project>>,
    members: Vec<Member>,
    fail: bool,
}

impl InMemoryProjectRepo {
    pub fn with(projects: Vec<Project>, members: Vec<Member>) -> Self {
        Self {
            projects: Mutex::new(projects),
            members,
            fail: false,
        }
    }

    /// Store whose every query fails, for unavailable-datastore paths.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with(vec![], vec![])
        }
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.id == *id.as_uuid())
    }

    fn check(&self) -> DbResult<()> {
        if self.fail {
            return Err(DbError::InvalidData("canned failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectRepo for InMemoryProjectRepo {
    async fn list(&self) -> DbResult<Vec<ProjectSummary>> {
        self.check()?;
        let mut projects = self.projects.lock().unwrap().clone();
        projects.sort_by(|a, b| a.status.cmp(&b.status));
        Ok(projects
            .into_iter()
            .map(|p| ProjectSummary {
                id: p.id,
                name: p.name,
                status: p.status,
                tfs_id: p.tfs_id,
            })
            .collect())
    }

    async fn list_by_status(&self, status: ProjectStatus) -> DbResult<Vec<Project>> {
        self.check()?;
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.status == status.to_string())
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: ResourceId) -> DbResult<Project> {
        self.check()?;
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == *id.as_uuid())
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("project {}", id)))
    }

    async fn update(&self, id: ResourceId, patch: &UpdateProject) -> DbResult<Project> {
        self.check()?;
        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .iter_mut()
            .find(|p| p.id == *id.as_uuid())
            .ok_or_else(|| DbError::NotFound(format!("project {}", id)))?;

        if let Some(name) = &patch.name {
            project.name = name.clone();
        }
        if let Some(status) = patch.status {
            project.status = status.to_string();
        }
        if let Some(tfs_id) = &patch.tfs_id {
            project.tfs_id = tfs_id.clone();
        }
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn set_status(&self, id: ResourceId, status: ProjectStatus) -> DbResult<Project> {
        self.update(
            id,
            &UpdateProject {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    async fn delete(&self, id: ResourceId) -> DbResult<()> {
        self.check()?;
        self.projects
            .lock()
            .unwrap()
            .retain(|p| p.id != *id.as_uuid());
        Ok(())
    }

    async fn list_members(&self, project_id: ResourceId) -> DbResult<Vec<Member>> {
        self.check()?;
        Ok(self
            .members
            .iter()
            .filter(|m| m.project_id == *project_id.as_uuid())
            .cloned()
            .collect())
    }
}

/// Iteration store over a mutex-guarded vector.
pub struct InMemoryIterationRepo {
    iterations: Mutex<Vec<Iteration>>,
}

impl InMemoryIterationRepo {
    pub fn with(iterations: Vec<Iteration>) -> Self {
        Self {
            iterations: Mutex::new(iterations),
        }
    }

    pub fn status_of(&self, id: ResourceId) -> Option<String> {
        self.iterations
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == *id.as_uuid())
            .map(|i| i.status.clone())
    }
}

#[async_trait]
impl IterationRepo for InMemoryIterationRepo {
    async fn list_by_project(&self, project_id: ResourceId) -> DbResult<Vec<Iteration>> {
        Ok(self
            .iterations
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.project_id == *project_id.as_uuid())
            .cloned()
            .collect())
    }

    async fn set_status(&self, id: ResourceId, status: IterationStatus) -> DbResult<Iteration> {
        let mut iterations = self.iterations.lock().unwrap();
        let iteration = iterations
            .iter_mut()
            .find(|i| i.id == *id.as_uuid())
            .ok_or_else(|| DbError::NotFound(format!("iteration {}", id)))?;
        iteration.status = status.to_string();
        iteration.updated_at = Utc::now();
        Ok(iteration.clone())
    }
}

/// Work item store answering count queries from canned tables.
#[derive(Default)]
pub struct CannedWorkItemRepo {
    closed_parents: i64,
    /// (assignee, state) -> count
    assigned: HashMap<(String, String), i64>,
    /// iteration -> (total stories, closed stories)
    iterations: HashMap<String, (i64, i64)>,
    stories: Vec<WorkItemWithTasks>,
    fail: bool,
}

impl CannedWorkItemRepo {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_closed_parents(mut self, count: i64) -> Self {
        self.closed_parents = count;
        self
    }

    pub fn with_assigned(mut self, assignee: &str, new: i64, active: i64, closed: i64) -> Self {
        self.assigned
            .insert((assignee.to_string(), "New".to_string()), new);
        self.assigned
            .insert((assignee.to_string(), "Active".to_string()), active);
        self.assigned
            .insert((assignee.to_string(), "Closed".to_string()), closed);
        self
    }

    pub fn with_iteration(mut self, name: &str, total: i64, closed: i64) -> Self {
        self.iterations.insert(name.to_string(), (total, closed));
        self
    }

    pub fn with_stories(mut self, stories: Vec<WorkItemWithTasks>) -> Self {
        self.stories = stories;
        self
    }

    fn check(&self) -> DbResult<()> {
        if self.fail {
            return Err(DbError::InvalidData("canned failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkItemRepo for CannedWorkItemRepo {
    async fn count_closed_unaccepted_parents(&self, _project: &str) -> DbResult<i64> {
        self.check()?;
        Ok(self.closed_parents)
    }

    async fn count_assigned(
        &self,
        _project: &str,
        assigned_to: &str,
        state: WorkItemState,
    ) -> DbResult<i64> {
        self.check()?;
        Ok(self
            .assigned
            .get(&(assigned_to.to_string(), state.to_string()))
            .copied()
            .unwrap_or(0))
    }

    async fn count_iteration_stories(&self, _project: &str, iteration: &str) -> DbResult<i64> {
        self.check()?;
        Ok(self.iterations.get(iteration).map(|c| c.0).unwrap_or(0))
    }

    async fn count_iteration_closed_stories(
        &self,
        _project: &str,
        iteration: &str,
    ) -> DbResult<i64> {
        self.check()?;
        Ok(self.iterations.get(iteration).map(|c| c.1).unwrap_or(0))
    }

    async fn list_stories_with_tasks(&self, _project: &str) -> DbResult<Vec<WorkItemWithTasks>> {
        self.check()?;
        Ok(self.stories.clone())
    }
}
