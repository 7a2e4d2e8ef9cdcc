/// Task endpoints
///
/// All routes live under `/api/:user_id/tasks` and require authentication.
/// The `user_id` segment must name the caller (403 otherwise); tasks owned by
/// anyone else are reported as 404.
///
/// | Method | Path | Success |
/// |---|---|---|
/// | `GET` | `/api/:user_id/tasks?skip&limit` | 200, list + `X-Total-Count` |
/// | `POST` | `/api/:user_id/tasks` | 201 |
/// | `GET` | `/api/:user_id/tasks/:task_id` | 200 |
/// | `PUT` | `/api/:user_id/tasks/:task_id` | 200 |
/// | `DELETE` | `/api/:user_id/tasks/:task_id` | 204 |
/// | `PATCH` | `/api/:user_id/tasks/:task_id/complete` | 200 (toggles) |

use axum::{
    extract::State,
    http::{HeaderName, StatusCode},
};
use serde::Deserialize;
use todo_shared::models::task::{CreateTask, Task, UpdateTask};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{AppJson, AppPath, AppQuery, OwnerScope},
    response::ApiResponse,
};

/// Header carrying the caller's total task count on list responses
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Query parameters for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    scope: OwnerScope,
    AppQuery(params): AppQuery<ListParams>,
) -> ApiResult<([(HeaderName, String); 1], ApiResponse<Vec<Task>>)> {
    let tasks = state
        .tasks
        .list(scope.user_id, params.skip, params.limit)
        .await?;
    let total = state.tasks.count(scope.user_id).await?;

    tracing::debug!(user_id = %scope.user_id, returned = tasks.len(), total, "Listed tasks");

    Ok((
        [(HeaderName::from_static(TOTAL_COUNT_HEADER), total.to_string())],
        ApiResponse::ok(tasks),
    ))
}

pub async fn create_task(
    State(state): State<AppState>,
    scope: OwnerScope,
    AppJson(input): AppJson<CreateTask>,
) -> ApiResult<ApiResponse<Task>> {
    let task = state.tasks.create(scope.user_id, input).await?;
    Ok(ApiResponse::created(task))
}

pub async fn get_task(
    State(state): State<AppState>,
    scope: OwnerScope,
    AppPath((_, task_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<Task>> {
    let task = state.tasks.get(scope.user_id, task_id).await?;
    Ok(ApiResponse::ok(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    scope: OwnerScope,
    AppPath((_, task_id)): AppPath<(Uuid, Uuid)>,
    AppJson(input): AppJson<UpdateTask>,
) -> ApiResult<ApiResponse<Task>> {
    let task = state.tasks.update(scope.user_id, task_id, input).await?;
    Ok(ApiResponse::ok(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    scope: OwnerScope,
    AppPath((_, task_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    if state.tasks.delete(scope.user_id, task_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Task not found".to_string()))
    }
}

pub async fn toggle_task(
    State(state): State<AppState>,
    scope: OwnerScope,
    AppPath((_, task_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<Task>> {
    let task = state.tasks.toggle_completion(scope.user_id, task_id).await?;
    Ok(ApiResponse::ok(task))
}
