use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, patch, post},
};
use db::models::task::{CreateTask, Task, TaskStatus};
use serde::{Deserialize, Serialize};
use services::services::identity::AuthenticatedUser;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct GenerateTasksRequest {
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateTasksResponse {
    pub tasks: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveTaskRequest {
    pub title: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveTaskResponse {
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
}

fn require_field(value: Option<String>, name: &'static str) -> Result<String, ApiError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing required field: {name}")))
}

/// Candidate tasks only; nothing is persisted until an explicit save.
pub async fn generate_tasks(
    State(state): State<AppState>,
    Json(payload): Json<GenerateTasksRequest>,
) -> Result<ResponseJson<GenerateTasksResponse>, ApiError> {
    let topic = require_field(payload.topic, "topic")?;
    let tasks = state.generation().generate_tasks(&topic).await?;

    Ok(ResponseJson(GenerateTasksResponse { tasks }))
}

pub async fn save_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<SaveTaskRequest>,
) -> Result<(StatusCode, ResponseJson<SaveTaskResponse>), ApiError> {
    let title = require_field(payload.title, "title")?;
    let topic = payload
        .topic
        .map(|topic| topic.trim().to_string())
        .filter(|topic| !topic.is_empty());

    let task = Task::create(
        &state.db().pool,
        &CreateTask {
            user_id: user.subject_id,
            title,
            topic,
        },
        Uuid::new_v4(),
    )
    .await?;

    tracing::debug!(task_id = %task.id, "Saved task");
    Ok((StatusCode::CREATED, ResponseJson(SaveTaskResponse { task })))
}

pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ResponseJson<TaskListResponse>, ApiError> {
    let tasks = Task::find_by_owner(&state.db().pool, &user.subject_id).await?;

    Ok(ResponseJson(TaskListResponse { tasks }))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<ResponseJson<ActionResponse>, ApiError> {
    let status = payload
        .status
        .ok_or_else(|| ApiError::BadRequest("Missing required field: status".to_string()))?;

    Task::set_status(&state.db().pool, task_id, &user.subject_id, status).await?;

    Ok(ResponseJson(ActionResponse { success: true }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ActionResponse>, ApiError> {
    Task::delete(&state.db().pool, task_id, &user.subject_id).await?;

    Ok(ResponseJson(ActionResponse { success: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/task/generate-tasks", post(generate_tasks))
        .route("/task/save", post(save_task))
        .route("/task/my", get(my_tasks))
        .route("/task/{task_id}", patch(update_status).delete(delete_task))
}
