use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    entities::{NewTodoList, TodoList, UpdateListInput},
    error::{Error, Result},
};

use super::TodoListRepository;

#[derive(Debug, Clone)]
pub struct SqliteTodoListRepository {
    pool: SqlitePool,
}

impl SqliteTodoListRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TodoListRepository for SqliteTodoListRepository {
    async fn create(&self, user_id: i64, list: NewTodoList) -> Result<TodoList> {
        list.validate()?;

        let mut tx = self.pool.begin().await?;

        let created: TodoList = sqlx::query_as(
            "INSERT INTO todo_lists (title, description) VALUES (?, ?)
             RETURNING id, title, description",
        )
        .bind(&list.title)
        .bind(&list.description)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO users_lists (user_id, list_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(created.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(user_id, list_id = created.id, "list created");
        Ok(created)
    }

    async fn get_all(&self, user_id: i64) -> Result<Vec<TodoList>> {
        let lists = sqlx::query_as(
            "SELECT tl.id, tl.title, tl.description FROM todo_lists tl
             INNER JOIN users_lists ul ON tl.id = ul.list_id
             WHERE ul.user_id = ?
             ORDER BY tl.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lists)
    }

    async fn get_by_id(&self, user_id: i64, list_id: i64) -> Result<Option<TodoList>> {
        let list = sqlx::query_as(
            "SELECT tl.id, tl.title, tl.description FROM todo_lists tl
             INNER JOIN users_lists ul ON tl.id = ul.list_id
             WHERE ul.user_id = ? AND ul.list_id = ?",
        )
        .bind(user_id)
        .bind(list_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(list)
    }

    async fn update(&self, user_id: i64, list_id: i64, input: UpdateListInput) -> Result<()> {
        input.check()?;

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE todo_lists SET ");
        let mut assignments = query.separated(", ");
        if let Some(title) = input.title {
            assignments.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = input.description {
            assignments
                .push("description = ")
                .push_bind_unseparated(description);
        }
        query
            .push(" WHERE id = ")
            .push_bind(list_id)
            .push(" AND id IN (SELECT list_id FROM users_lists WHERE user_id = ")
            .push_bind(user_id)
            .push(")");

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        tracing::debug!(user_id, list_id, "list updated");
        Ok(())
    }

    async fn delete(&self, user_id: i64, list_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM todo_items WHERE id IN (
                SELECT li.item_id FROM lists_items li
                INNER JOIN users_lists ul ON ul.list_id = li.list_id
                WHERE li.list_id = ? AND ul.user_id = ?
             )",
        )
        .bind(list_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "DELETE FROM todo_lists
             WHERE id = ? AND id IN (SELECT list_id FROM users_lists WHERE user_id = ?)",
        )
        .bind(list_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        tx.commit().await?;

        tracing::debug!(user_id, list_id, "list deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::NewTodoItem,
        repository::{test_support, SqliteTodoItemRepository, TodoItemRepository},
    };

    #[tokio::test]
    async fn create_links_the_list_to_its_owner() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice@example.com").await;
        let repo = SqliteTodoListRepository::new(pool);

        let list = repo
            .create(alice, NewTodoList::new("Groceries", "weekly"))
            .await
            .unwrap();

        assert_eq!(list.title, "Groceries");
        assert_eq!(repo.get_all(alice).await.unwrap(), vec![list.clone()]);
        assert_eq!(repo.get_by_id(alice, list.id).await.unwrap(), Some(list));
    }

    #[tokio::test]
    async fn title_length_is_validated() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice@example.com").await;
        let repo = SqliteTodoListRepository::new(pool);

        let err = repo.create(alice, NewTodoList::new("G", "")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(repo.create(alice, NewTodoList::new("Go", "")).await.is_ok());
    }

    #[tokio::test]
    async fn lists_are_isolated_between_users() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice@example.com").await;
        let bob = test_support::user(&pool, "bob@example.com").await;
        let repo = SqliteTodoListRepository::new(pool);

        let list = repo
            .create(alice, NewTodoList::new("Private", ""))
            .await
            .unwrap();

        assert_eq!(repo.get_by_id(bob, list.id).await.unwrap(), None);
        assert!(repo.get_all(bob).await.unwrap().is_empty());

        let patch = UpdateListInput {
            title: Some("Hijacked".into()),
            ..Default::default()
        };
        assert!(matches!(
            repo.update(bob, list.id, patch).await,
            Err(Error::NotFound)
        ));
        assert!(matches!(repo.delete(bob, list.id).await, Err(Error::NotFound)));

        assert_eq!(
            repo.get_by_id(alice, list.id).await.unwrap().unwrap().title,
            "Private"
        );
    }

    #[tokio::test]
    async fn failed_link_rolls_back_the_list() {
        let pool = test_support::pool().await;
        let repo = SqliteTodoListRepository::new(pool.clone());

        // no such user: the foreign key on `users_lists` rejects the link row
        let result = repo.create(4242, NewTodoList::new("Orphan", "")).await;

        assert!(matches!(result, Err(Error::Sqlx(_))));
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todo_lists")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn update_applies_only_provided_fields() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice@example.com").await;
        let repo = SqliteTodoListRepository::new(pool);

        let list = repo
            .create(alice, NewTodoList::new("Chores", "house"))
            .await
            .unwrap();

        let patch = UpdateListInput {
            description: Some("garden".into()),
            ..Default::default()
        };
        repo.update(alice, list.id, patch).await.unwrap();

        let updated = repo.get_by_id(alice, list.id).await.unwrap().unwrap();
        assert_eq!(updated.title, "Chores");
        assert_eq!(updated.description, "garden");
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice@example.com").await;
        let repo = SqliteTodoListRepository::new(pool);

        let list = repo.create(alice, NewTodoList::new("Chores", "")).await.unwrap();
        let err = repo
            .update(alice, list.id, UpdateListInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn delete_removes_the_list_and_its_items() {
        let pool = test_support::pool().await;
        let alice = test_support::user(&pool, "alice@example.com").await;
        let lists = SqliteTodoListRepository::new(pool.clone());
        let items = SqliteTodoItemRepository::new(pool.clone());

        let list = lists.create(alice, NewTodoList::new("Chores", "")).await.unwrap();
        items
            .create(list.id, NewTodoItem::new("Dishes", ""))
            .await
            .unwrap();

        lists.delete(alice, list.id).await.unwrap();

        assert_eq!(lists.get_by_id(alice, list.id).await.unwrap(), None);
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todo_items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(matches!(lists.delete(alice, list.id).await, Err(Error::NotFound)));
    }
}
