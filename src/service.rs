//! Capability sets the HTTP layer talks to.
//!
//! The services delegate to the repositories. The one rule added here is that
//! items can only be created in, or listed from, a list the requesting user
//! owns.

use std::sync::Arc;

use crate::{
    entities::{
        NewTodoItem, NewTodoList, NewUser, TodoItem, TodoList, UpdateItemInput, UpdateListInput,
        User,
    },
    error::{Error, Result},
    password,
    repository::{Repository, TodoItemRepository, TodoListRepository, UserRepository},
};

#[async_trait::async_trait]
pub trait Authorization: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find(&self, id: i64) -> Result<Option<User>>;
    /// Returns the user when `password` matches the stored hash.
    async fn authenticate(&self, email: &str, password: String) -> Result<Option<User>>;
}

#[async_trait::async_trait]
pub trait TodoLists: Send + Sync {
    async fn create(&self, user_id: i64, list: NewTodoList) -> Result<TodoList>;
    async fn get_all(&self, user_id: i64) -> Result<Vec<TodoList>>;
    async fn get_by_id(&self, user_id: i64, list_id: i64) -> Result<Option<TodoList>>;
    async fn update(&self, user_id: i64, list_id: i64, input: UpdateListInput) -> Result<()>;
    async fn delete(&self, user_id: i64, list_id: i64) -> Result<()>;
}

#[async_trait::async_trait]
pub trait TodoItems: Send + Sync {
    async fn create(&self, user_id: i64, list_id: i64, item: NewTodoItem) -> Result<i64>;
    async fn get_all(&self, user_id: i64, list_id: i64) -> Result<Vec<TodoItem>>;
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
pub struct Service {
    pub authorization: Arc<dyn Authorization>,
    pub todo_lists: Arc<dyn TodoLists>,
    pub todo_items: Arc<dyn TodoItems>,
}

impl Service {
    pub fn new(repository: Repository) -> Self {
        Self {
            authorization: Arc::new(AuthService::new(repository.users)),
            todo_lists: Arc::new(TodoListService::new(repository.todo_lists.clone())),
            todo_items: Arc::new(TodoItemService::new(
                repository.todo_items,
                repository.todo_lists,
            )),
        }
    }
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait::async_trait]
impl Authorization for AuthService {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.users.create(user).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn find(&self, id: i64) -> Result<Option<User>> {
        self.users.find(id).await
    }

    async fn authenticate(&self, email: &str, password: String) -> Result<Option<User>> {
        let user = self.users.find_by_email(email).await?;

        // `verify_password()` is blocking, hence `spawn_blocking()`
        let user = tokio::task::spawn_blocking(move || {
            user.filter(|user| password::verify_password(&password, &user.password_hash))
        })
        .await?;

        Ok(user)
    }
}

pub struct TodoListService {
    lists: Arc<dyn TodoListRepository>,
}

impl TodoListService {
    pub fn new(lists: Arc<dyn TodoListRepository>) -> Self {
        Self { lists }
    }
}

#[async_trait::async_trait]
impl TodoLists for TodoListService {
    async fn create(&self, user_id: i64, list: NewTodoList) -> Result<TodoList> {
        self.lists.create(user_id, list).await
    }

    async fn get_all(&self, user_id: i64) -> Result<Vec<TodoList>> {
        self.lists.get_all(user_id).await
    }

    async fn get_by_id(&self, user_id: i64, list_id: i64) -> Result<Option<TodoList>> {
        self.lists.get_by_id(user_id, list_id).await
    }

    async fn update(&self, user_id: i64, list_id: i64, input: UpdateListInput) -> Result<()> {
        self.lists.update(user_id, list_id, input).await
    }

    async fn delete(&self, user_id: i64, list_id: i64) -> Result<()> {
        self.lists.delete(user_id, list_id).await
    }
}

pub struct TodoItemService {
    items: Arc<dyn TodoItemRepository>,
    lists: Arc<dyn TodoListRepository>,
}

impl TodoItemService {
    pub fn new(items: Arc<dyn TodoItemRepository>, lists: Arc<dyn TodoListRepository>) -> Self {
        Self { items, lists }
    }

    async fn require_list(&self, user_id: i64, list_id: i64) -> Result<()> {
        if self.lists.get_by_id(user_id, list_id).await?.is_none() {
            tracing::warn!(user_id, list_id, "item access through a list the user does not own");
            return Err(Error::NotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TodoItems for TodoItemService {
    async fn create(&self, user_id: i64, list_id: i64, item: NewTodoItem) -> Result<i64> {
        self.require_list(user_id, list_id).await?;
        self.items.create(list_id, item).await
    }

    async fn get_all(&self, user_id: i64, list_id: i64) -> Result<Vec<TodoItem>> {
        self.require_list(user_id, list_id).await?;
        self.items.get_all(user_id, list_id).await
    }

    async fn get_by_id(
        &self,
        user_id: i64,
        list_id: i64,
        item_id: i64,
    ) -> Result<Option<TodoItem>> {
        self.items.get_by_id(user_id, list_id, item_id).await
    }

    async fn update(
        &self,
        user_id: i64,
        list_id: i64,
        item_id: i64,
        input: UpdateItemInput,
    ) -> Result<()> {
        self.items.update(user_id, list_id, item_id, input).await
    }

    async fn delete(&self, user_id: i64, list_id: i64, item_id: i64) -> Result<()> {
        self.items.delete(user_id, list_id, item_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::repository::test_support;

    /// Owns exactly the lists it was built with.
    struct FakeLists {
        owned: Vec<(i64, i64)>,
    }

    #[async_trait::async_trait]
    impl TodoListRepository for FakeLists {
        async fn create(&self, _user_id: i64, _list: NewTodoList) -> Result<TodoList> {
            unimplemented!()
        }

        async fn get_all(&self, _user_id: i64) -> Result<Vec<TodoList>> {
            unimplemented!()
        }

        async fn get_by_id(&self, user_id: i64, list_id: i64) -> Result<Option<TodoList>> {
            Ok(self
                .owned
                .contains(&(user_id, list_id))
                .then(|| TodoList {
                    id: list_id,
                    title: "Fake".into(),
                    description: String::new(),
                }))
        }

        async fn update(
            &self,
            _user_id: i64,
            _list_id: i64,
            _input: UpdateListInput,
        ) -> Result<()> {
            unimplemented!()
        }

        async fn delete(&self, _user_id: i64, _list_id: i64) -> Result<()> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct RecordingItems {
        created: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait::async_trait]
    impl TodoItemRepository for RecordingItems {
        async fn create(&self, list_id: i64, item: NewTodoItem) -> Result<i64> {
            let mut created = self.created.lock().unwrap();
            created.push((list_id, item.title));
            Ok(created.len() as i64)
        }

        async fn get_all(&self, _user_id: i64, list_id: i64) -> Result<Vec<TodoItem>> {
            Ok(vec![TodoItem {
                id: 1,
                title: format!("In list {list_id}"),
                description: String::new(),
                done: false,
            }])
        }

        async fn get_by_id(
            &self,
            _user_id: i64,
            _list_id: i64,
            _item_id: i64,
        ) -> Result<Option<TodoItem>> {
            Ok(None)
        }

        async fn update(
            &self,
            _user_id: i64,
            _list_id: i64,
            _item_id: i64,
            _input: UpdateItemInput,
        ) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, _user_id: i64, _list_id: i64, _item_id: i64) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn item_creation_requires_list_ownership() {
        let items = Arc::new(RecordingItems::default());
        let lists = Arc::new(FakeLists {
            owned: vec![(1, 10)],
        });
        let service = TodoItemService::new(items.clone(), lists);

        let err = service
            .create(2, 10, NewTodoItem::new("Sneaky", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
        assert!(items.created.lock().unwrap().is_empty());

        let id = service
            .create(1, 10, NewTodoItem::new("Allowed", ""))
            .await
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(
            *items.created.lock().unwrap(),
            vec![(10, "Allowed".to_owned())]
        );
    }

    #[tokio::test]
    async fn item_listing_requires_list_ownership() {
        let lists = Arc::new(FakeLists {
            owned: vec![(1, 10)],
        });
        let service = TodoItemService::new(Arc::new(RecordingItems::default()), lists);

        assert!(matches!(service.get_all(2, 10).await, Err(Error::NotFound)));
        assert!(matches!(service.get_all(1, 99).await, Err(Error::NotFound)));

        let items = service.get_all(1, 10).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "In list 10");
    }

    #[tokio::test]
    async fn authenticate_checks_the_password() {
        let pool = test_support::pool().await;
        let service = Service::new(Repository::sqlite(pool));

        service
            .authorization
            .create_user(NewUser::new("Alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let user = service
            .authorization
            .authenticate("alice@example.com", "secret1".into())
            .await
            .unwrap();
        assert_eq!(user.map(|user| user.name), Some("Alice".to_owned()));

        let wrong = service
            .authorization
            .authenticate("alice@example.com", "secret2".into())
            .await
            .unwrap();
        assert!(wrong.is_none());

        let unknown = service
            .authorization
            .authenticate("bob@example.com", "secret1".into())
            .await
            .unwrap();
        assert!(unknown.is_none());
    }
}
