use axum::{Json, extract::State, http::StatusCode};
use starfall_shared::api::{StarReq, TaskListQuery};
use starfall_shared::domain::{
    NewTaskList, NewUser, TaskItem, TaskList, TaskListPatch, User, UserPatch,
};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{AppError, AppState};

// Users

pub(super) async fn create_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.store.create_user(body).await?;
    tracing::info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub(super) async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<User>, AppError> {
    state
        .store
        .get_user(&id)
        .await?
        .map(Json)
        .ok_or_else(|| user_not_found(&id))
}

pub(super) async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<UserPatch>,
) -> Result<Json<User>, AppError> {
    state
        .store
        .update_user(&id, body)
        .await?
        .map(Json)
        .ok_or_else(|| user_not_found(&id))
}

pub(super) async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_user(&id).await? {
        return Err(user_not_found(&id));
    }
    tracing::info!(user_id = %id, "user deleted with their task lists");
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_user_task_lists(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> Result<Json<Vec<TaskList>>, AppError> {
    if state.store.get_user(&id).await?.is_none() {
        return Err(user_not_found(&id));
    }
    let lists = state.store.list_task_lists(&id, query.week_start).await?;
    Ok(Json(lists))
}

// Task lists

pub(super) async fn create_task_list(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewTaskList>,
) -> Result<(StatusCode, Json<TaskList>), AppError> {
    let list = state.store.create_task_list(body).await?;
    tracing::info!(
        list_id = %list.id,
        user_id = %list.user_id,
        week_start = %list.week_start,
        "task list created"
    );
    Ok((StatusCode::CREATED, Json(list)))
}

pub(super) async fn get_task_list(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<TaskList>, AppError> {
    state
        .store
        .get_task_list(&id)
        .await?
        .map(Json)
        .ok_or_else(|| list_not_found(&id))
}

pub(super) async fn update_task_list(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<TaskListPatch>,
) -> Result<Json<TaskList>, AppError> {
    state
        .store
        .update_task_list(&id, body)
        .await?
        .map(Json)
        .ok_or_else(|| list_not_found(&id))
}

pub(super) async fn delete_task_list(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_task_list(&id).await? {
        return Err(list_not_found(&id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn task_list_items(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Vec<TaskItem>>, AppError> {
    let list = state
        .store
        .get_task_list(&id)
        .await?
        .ok_or_else(|| list_not_found(&id))?;
    // Stored rows are validated on write, so a failure here means a corrupt row
    let items = list.items().map_err(AppError::internal)?;
    Ok(Json(items))
}

pub(super) async fn set_star(
    State(state): State<AppState>,
    ApiPath((id, index)): ApiPath<(String, usize)>,
    ApiJson(body): ApiJson<StarReq>,
) -> Result<Json<TaskList>, AppError> {
    let list = state
        .store
        .set_star(&id, index, body.starred)
        .await?
        .ok_or_else(|| list_not_found(&id))?;
    tracing::debug!(
        list_id = %id,
        index,
        starred = body.starred,
        earned = list.stars_earned(),
        "star updated"
    );
    Ok(Json(list))
}

fn user_not_found(id: &str) -> AppError {
    AppError::not_found(format!("user not found: {}", id))
}

fn list_not_found(id: &str) -> AppError {
    AppError::not_found(format!("task list not found: {}", id))
}
