use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::error::AppError;
use crate::extract::{JsonBody, TodoId};
use crate::model::{CreateTodo, Todo, UpdateTodo};
use crate::store::SharedStore;

pub async fn list_todos(State(store): State<SharedStore>) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(store.list().await?))
}

pub async fn get_todo(
    State(store): State<SharedStore>,
    TodoId(id): TodoId,
) -> Result<Json<Todo>, AppError> {
    find(&store, id).await.map(Json)
}

pub async fn create_todo(
    State(store): State<SharedStore>,
    JsonBody(input): JsonBody<CreateTodo>,
) -> Result<Json<Todo>, AppError> {
    let todo = store.create(&input).await?;
    info!(id = todo.id, "Todo created");
    Ok(Json(todo))
}

/// The row is looked up before the body is decoded, so a missing id is a 404
/// even when the body is malformed.
pub async fn update_todo(
    State(store): State<SharedStore>,
    TodoId(id): TodoId,
    payload: Result<JsonBody<UpdateTodo>, AppError>,
) -> Result<Json<Todo>, AppError> {
    let mut todo = find(&store, id).await?;

    let JsonBody(patch) = payload?;
    patch.apply_to(&mut todo);

    // A concurrent delete between lookup and save leaves nothing to update.
    let saved = store.save(&todo).await?.ok_or(AppError::NotFound(id))?;
    info!(id, "Todo updated");
    Ok(Json(saved))
}

/// Responds with the record as it was read, before `deleted_at` was stamped.
pub async fn delete_todo(
    State(store): State<SharedStore>,
    TodoId(id): TodoId,
) -> Result<Json<Todo>, AppError> {
    let todo = find(&store, id).await?;
    if !store.delete(id).await? {
        return Err(AppError::NotFound(id));
    }
    info!(id, "Todo deleted");
    Ok(Json(todo))
}

async fn find(store: &SharedStore, id: i64) -> Result<Todo, AppError> {
    match store.get(id).await? {
        Some(todo) => Ok(todo),
        None => {
            warn!(id, "Todo with ID {id} not found");
            Err(AppError::NotFound(id))
        }
    }
}
