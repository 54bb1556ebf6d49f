use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    entities::{NewTodoItem, TodoItem, UpdateItemInput},
    error::{Error, Result},
};

use super::TodoItemRepository;

/// Items linked to one list, restricted to lists the user owns.
const OWNED_ITEM_IDS: &str = "SELECT li.item_id FROM lists_items li
     INNER JOIN users_lists ul ON ul.list_id = li.list_id
     WHERE li.list_id = ";

fn push_owned_item_ids(query: &mut QueryBuilder<'_, Sqlite>, user_id: i64, list_id: i64) {
    query
        .push(" AND id IN (")
        .push(OWNED_ITEM_IDS)
        .push_bind(list_id)
        .push(" AND ul.user_id = ")
        .push_bind(user_id)
        .push(")");
}

#[derive(Debug, Clone)]
pub struct SqliteTodoItemRepository {
    pool: SqlitePool,
}

impl SqliteTodoItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TodoItemRepository for SqliteTodoItemRepository {
    async fn create(&self, list_id: i64, item: NewTodoItem) -> Result<i64> {
        // dropping `tx` without commit rolls back the item insert
        let mut tx = self.pool.begin().await?;

        let (item_id,): (i64,) = sqlx::query_as(
            "INSERT INTO todo_items (title, description, done) VALUES (?, ?, FALSE) RETURNING id",
        )
        .bind(&item.title)
        .bind(&item.description)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO lists_items (list_id, item_id) VALUES (?, ?)")
            .bind(list_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(list_id, item_id, "item created");
        Ok(item_id)
    }

    async fn get_all(&self, user_id: i64, list_id: i64) -> Result<Vec<TodoItem>> {
        let items = sqlx::query_as(
            "SELECT ti.id, ti.title, ti.description, ti.done FROM todo_items ti
             INNER JOIN lists_items li ON li.item_id = ti.id
             INNER JOIN users_lists ul ON ul.list_id = li.list_id
             WHERE li.list_id = ? AND ul.user_id = ?
             ORDER BY ti.id",
        )
        .bind(list_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn get_by_id(
        &self,
        user_id: i64,
        list_id: i64,
        item_id: i64,
    ) -> Result<Option<TodoItem>> {
        let item = sqlx::query_as(
            "SELECT ti.id, ti.title, ti.description, ti.done FROM todo_items ti
             INNER JOIN lists_items li ON li.item_id = ti.id
             INNER JOIN users_lists ul ON ul.list_id = li.list_id
             WHERE ti.id = ? AND li.list_id = ? AND ul.user_id = ?",
        )
        .bind(item_id)
        .bind(list_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn update(
        &self,
        user_id: i64,
        list_id: i64,
        item_id: i64,
        input: UpdateItemInput,
    ) -> Result<()> {
        input.check()?;

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE todo_items SET ");
        let mut assignments = query.separated(", ");
        if let Some(title) = input.title {
            assignments.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = input.description {
            assignments
                .push("description = ")
                .push_bind_unseparated(description);
        }
        if let Some(done) = input.done {
            assignments.push("done = ").push_bind_unseparated(done);
        }
        query.push(" WHERE id = ").push_bind(item_id);
        push_owned_item_ids(&mut query, user_id, list_id);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        tracing::debug!(user_id, list_id, item_id, "item updated");
        Ok(())
    }

    async fn delete(&self, user_id: i64, list_id: i64, item_id: i64) -> Result<()> {
        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM todo_items WHERE id = ");
        query.push_bind(item_id);
        push_owned_item_ids(&mut query, user_id, list_id);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        tracing::debug!(user_id, list_id, item_id, "item deleted");
        Ok(())
    }
}
