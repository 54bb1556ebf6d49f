use crate::{
    entities::{NewTodoItem, NewTodoList, NewUser},
    error::{Error, Result},
    service::Service,
};

const DEMO_USERS: [(&str, &str, &str); 2] = [
    ("Alice", "alice@example.com", "password1"),
    ("Bob", "bob@example.com", "password2"),
];

/// Populates the database with demo users, each owning one list with one item.
/// Users that already exist are left untouched.
pub async fn seed_data(service: &Service) -> Result<()> {
    for (name, email, password) in DEMO_USERS {
        let user = match service
            .authorization
            .create_user(NewUser::new(name, email, password))
            .await
        {
            Ok(user) => user,
            Err(Error::EmailTaken) => {
                tracing::debug!(email, "demo user already present");
                continue;
            }
            Err(err) => return Err(err),
        };

        let list = service
            .todo_lists
            .create(user.id, NewTodoList::new(format!("{name}'s chores"), "demo list"))
            .await?;
        service
            .todo_items
            .create(user.id, list.id, NewTodoItem::new("Water the plants", ""))
            .await?;

        tracing::info!(email, "seeded demo user");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{test_support, Repository};

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let pool = test_support::pool().await;
        let service = Service::new(Repository::sqlite(pool));

        seed_data(&service).await.unwrap();
        seed_data(&service).await.unwrap();

        let alice = service
            .authorization
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        let lists = service.todo_lists.get_all(alice.id).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(
            service
                .todo_items
                .get_all(alice.id, lists[0].id)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
