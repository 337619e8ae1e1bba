//! Project, work-item and repository endpoints.

use axum::extract::{Path, State};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::services::statistics::ProjectStatistics;
use crate::services::sync::PullOutcome;
use trackboard_core::ResourceId;
use trackboard_core::runner::BuildOutput;
use trackboard_core::status::{IterationStatus, ProjectStatus};
use trackboard_db::{
    Project, ProjectSummary, RepositorySummary, UpdateProject, UpsertRepository, WorkItemWithTasks,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects))
        .route("/statistic", get(statistics))
        .route("/repo", patch(upsert_repo))
        .route("/repo/{id}", get(get_repo))
        .route("/repo/{repo}/pull", get(pull_repo))
        .route("/repo/{repo}/rebuild", get(rebuild_repo))
        .route(
            "/{id}",
            delete(remove_project)
                .put(update_project)
                .patch(update_project),
        )
        .route("/{project}/workitems", get(list_work_items))
        .route("/{project}/state/{state}", patch(set_project_state))
        .route("/{milestone}/release", patch(release_iteration))
}

async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProjectSummary>>>, ApiError> {
    let projects = state.projects.list().await?;
    Ok(Json(ApiResponse::success(projects)))
}

async fn statistics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProjectStatistics>>>, ApiError> {
    let data = state.statistics.collect().await?;
    Ok(Json(ApiResponse::success(data)))
}

async fn list_work_items(
    State(state): State<AppState>,
    Path(project): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<WorkItemWithTasks>>>, ApiError> {
    let project = state
        .projects
        .get_by_id(ResourceId::from_uuid(project))
        .await?;
    let items = state
        .work_items
        .list_stories_with_tasks(&project.tfs_id)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateProject>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state
        .projects
        .update(ResourceId::from_uuid(id), &patch)
        .await?;
    Ok(Json(ApiResponse::success(project)))
}

async fn remove_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.projects.delete(ResourceId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::success(())))
}

async fn set_project_state(
    State(state): State<AppState>,
    Path((project, status)): Path<(Uuid, String)>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let status: ProjectStatus = status.parse().map_err(ApiError::BadRequest)?;
    let project = state
        .projects
        .set_status(ResourceId::from_uuid(project), status)
        .await?;
    Ok(Json(ApiResponse::success(project)))
}

async fn release_iteration(
    State(state): State<AppState>,
    Path(milestone): Path<Uuid>,
) -> Result<Json<ApiResponse<trackboard_db::Iteration>>, ApiError> {
    let iteration = state
        .iterations
        .set_status(ResourceId::from_uuid(milestone), IterationStatus::Released)
        .await?;
    Ok(Json(ApiResponse::success(iteration)))
}

async fn upsert_repo(
    State(state): State<AppState>,
    Json(mut patch): Json<UpsertRepository>,
) -> Result<Json<ApiResponse<RepositorySummary>>, ApiError> {
    // Plaintext never reaches the data layer.
    if let Some(password) = patch.password.as_deref() {
        patch.password = Some(state.codec.encrypt(password)?);
    }

    let repo = match patch.id {
        Some(id) => {
            state
                .repositories
                .update(ResourceId::from_uuid(id), &patch)
                .await?
        }
        None => state.repositories.create(&patch).await?,
    };

    Ok(Json(ApiResponse::success(RepositorySummary::from(repo))))
}

async fn get_repo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RepositorySummary>>, ApiError> {
    let repo = state
        .repositories
        .find_summary_by_id(ResourceId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Repository not found".to_string()))?;
    Ok(Json(ApiResponse::success(repo)))
}

async fn pull_repo(
    State(state): State<AppState>,
    Path(repo): Path<Uuid>,
) -> Result<Json<ApiResponse<PullOutcome>>, ApiError> {
    let outcome = state.sync.pull(ResourceId::from_uuid(repo)).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

async fn rebuild_repo(
    State(state): State<AppState>,
    Path(repo): Path<Uuid>,
) -> Result<Json<ApiResponse<BuildOutput>>, ApiError> {
    let output = state.sync.rebuild(ResourceId::from_uuid(repo)).await?;
    Ok(Json(ApiResponse::success(output)))
}
