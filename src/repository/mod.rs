//! Persistence for users, lists and items.
//!
//! Every list and item query is scoped by the requesting user through the
//! `users_lists` and `lists_items` ownership tables, so a record that exists
//! but belongs to someone else is indistinguishable from a missing one.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    entities::{
        NewTodoItem, NewTodoList, NewUser, TodoItem, TodoList, UpdateItemInput, UpdateListInput,
        User,
    },
    error::Result,
};

mod todo_items;
mod todo_lists;
mod users;

pub use todo_items::SqliteTodoItemRepository;
pub use todo_lists::SqliteTodoListRepository;
pub use users::SqliteUserRepository;

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Validates and stores a new user, hashing its password first.
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find(&self, id: i64) -> Result<Option<User>>;
}

#[async_trait::async_trait]
pub trait TodoListRepository: Send + Sync {
    async fn create(&self, user_id: i64, list: NewTodoList) -> Result<TodoList>;
    async fn get_all(&self, user_id: i64) -> Result<Vec<TodoList>>;
    async fn get_by_id(&self, user_id: i64, list_id: i64) -> Result<Option<TodoList>>;
    async fn update(&self, user_id: i64, list_id: i64, input: UpdateListInput) -> Result<()>;
    async fn delete(&self, user_id: i64, list_id: i64) -> Result<()>;
}

#[async_trait::async_trait]
pub trait TodoItemRepository: Send + Sync {
    /// Stores the item and links it to `list_id` atomically. Ownership of the
    /// list is not checked here.
    async fn create(&self, list_id: i64, item: NewTodoItem) -> Result<i64>;
    async fn get_all(&self, user_id: i64, list_id: i64) -> Result<Vec<TodoItem>>;
    /// Item lookups and writes only match an item linked to `list_id`.
    async fn get_by_id(&self, user_id: i64, list_id: i64, item_id: i64)
        -> Result<Option<TodoItem>>;
    async fn update(
        &self,
        user_id: i64,
        list_id: i64,
        item_id: i64,
        input: UpdateItemInput,
    ) -> Result<()>;
    async fn delete(&self, user_id: i64, list_id: i64, item_id: i64) -> Result<()>;
}

#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UserRepository>,
    pub todo_lists: Arc<dyn TodoListRepository>,
    pub todo_items: Arc<dyn TodoItemRepository>,
}

impl Repository {
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            users: Arc::new(SqliteUserRepository::new(pool.clone())),
            todo_lists: Arc::new(SqliteTodoListRepository::new(pool.clone())),
            todo_items: Arc::new(SqliteTodoItemRepository::new(pool)),
        }
    }
}
