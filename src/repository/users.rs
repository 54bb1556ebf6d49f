use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    entities::{NewUser, User},
    error::{Error, Result},
};

use super::UserRepository;

#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn email_conflict(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::EmailTaken;
        }
    }
    err.into()
}

#[async_trait::async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        user.validate()?;

        // argon2 is blocking, hence `spawn_blocking()`
        let user = tokio::task::spawn_blocking(move || {
            let mut user = user;
            user.encrypt_password();
            user
        })
        .await?;
        let password_hash = user
            .password_hash
            .ok_or(Error::InvalidInput("password is required"))?;

        let created: User = sqlx::query_as(
            "INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)
             RETURNING id, name, email, password_hash",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(email_conflict)?;

        tracing::debug!(user_id = created.id, "user created");
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT id, name, email, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT id, name, email, password_hash FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
