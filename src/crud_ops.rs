use axum::{
    extract::{Extension, State},
    http::StatusCode,
};
use serde_json::{json, Value};

use crate::{
    entities::{NewTodoItem, NewTodoList, TodoItem, TodoList, UpdateItemInput, UpdateListInput, User},
    error::{Error, Result},
    extract::{Json, Path},
    service::Service,
};

pub async fn create_todo(
    State(service): State<Service>,
    Extension(user): Extension<User>,
    Json(list): Json<NewTodoList>,
) -> Result<(StatusCode, Json<TodoList>)> {
    let list = service.todo_lists.create(user.id, list).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

pub async fn get_todos(
    State(service): State<Service>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<TodoList>>> {
    let lists = service.todo_lists.get_all(user.id).await?;
    Ok(Json(lists))
}

pub async fn get_todo(
    State(service): State<Service>,
    Extension(user): Extension<User>,
    Path(list_id): Path<i64>,
) -> Result<Json<TodoList>> {
    let list = service
        .todo_lists
        .get_by_id(user.id, list_id)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(list))
}

pub async fn update_todo(
    State(service): State<Service>,
    Extension(user): Extension<User>,
    Path(list_id): Path<i64>,
    Json(input): Json<UpdateListInput>,
) -> Result<Json<TodoList>> {
    service.todo_lists.update(user.id, list_id, input).await?;

    let list = service
        .todo_lists
        .get_by_id(user.id, list_id)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(list))
}

pub async fn delete_todo(
    State(service): State<Service>,
    Extension(user): Extension<User>,
    Path(list_id): Path<i64>,
) -> Result<StatusCode> {
    service.todo_lists.delete(user.id, list_id).await?;
    Ok(StatusCode::OK)
}

pub async fn get_items(
    State(service): State<Service>,
    Extension(user): Extension<User>,
    Path(list_id): Path<i64>,
) -> Result<Json<Vec<TodoItem>>> {
    let items = service.todo_items.get_all(user.id, list_id).await?;
    Ok(Json(items))
}

pub async fn create_item(
    State(service): State<Service>,
    Extension(user): Extension<User>,
    Path(list_id): Path<i64>,
    Json(item): Json<NewTodoItem>,
) -> Result<Json<Value>> {
    let id = service.todo_items.create(user.id, list_id, item).await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn get_item(
    State(service): State<Service>,
    Extension(user): Extension<User>,
    Path((list_id, item_id)): Path<(i64, i64)>,
) -> Result<Json<TodoItem>> {
    let item = service
        .todo_items
        .get_by_id(user.id, list_id, item_id)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(item))
}

pub async fn update_item(
    State(service): State<Service>,
    Extension(user): Extension<User>,
    Path((list_id, item_id)): Path<(i64, i64)>,
    Json(input): Json<UpdateItemInput>,
) -> Result<Json<TodoItem>> {
    service
        .todo_items
        .update(user.id, list_id, item_id, input)
        .await?;

    let item = service
        .todo_items
        .get_by_id(user.id, list_id, item_id)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(service): State<Service>,
    Extension(user): Extension<User>,
    Path((list_id, item_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    service.todo_items.delete(user.id, list_id, item_id).await?;
    Ok(StatusCode::OK)
}
