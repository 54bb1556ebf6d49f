use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::{error::Error, password};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl axum_login::AuthUser for User {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }

    // when the password hash changes, existing sessions become invalid
    fn session_auth_hash(&self) -> &[u8] {
        self.password_hash.as_bytes()
    }
}

/// Registration input. The plaintext password is replaced by its hash before
/// the user is stored and is never persisted.
#[derive(Clone, Deserialize, Validate)]
#[validate(schema(function = "password_or_hash_present"))]
pub struct NewUser {
    #[serde(default)]
    #[validate(length(min = 2, max = 30, message = "name must be between 2 and 30 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(
        min = 6,
        max = 100,
        message = "password must be between 6 and 100 characters"
    ))]
    pub password: Option<String>,

    #[serde(skip)]
    pub password_hash: Option<String>,
}

fn password_or_hash_present(user: &NewUser) -> Result<(), ValidationError> {
    if user.password.is_none() && user.password_hash.is_none() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("password is required")));
    }
    Ok(())
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: Some(password.into()),
            password_hash: None,
        }
    }

    /// Builds a user whose password is already hashed.
    pub fn with_password_hash(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: None,
            password_hash: Some(password_hash.into()),
        }
    }

    /// Replaces the plaintext password with its hash. Once a hash is set the
    /// call is a no-op.
    pub fn encrypt_password(&mut self) {
        if self.password_hash.is_some() {
            return;
        }
        if let Some(plaintext) = self.password.take() {
            self.password_hash = Some(password::hash_password(&plaintext));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TodoList {
    pub id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTodoList {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "title must be between 2 and 100 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,
}

impl NewTodoList {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateListInput {
    #[validate(length(min = 2, max = 100, message = "title must be between 2 and 100 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
}

impl UpdateListInput {
    /// Rejects a patch without any field as well as invalid field values.
    pub fn check(&self) -> Result<(), Error> {
        if self.title.is_none() && self.description.is_none() {
            return Err(Error::InvalidInput("update structure has no values"));
        }
        Ok(self.validate()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub done: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTodoItem {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,
}

impl NewTodoItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,
}

impl UpdateItemInput {
    pub fn check(&self) -> Result<(), Error> {
        if self.title.is_none() && self.description.is_none() && self.done.is_none() {
            return Err(Error::InvalidInput("update structure has no values"));
        }
        Ok(())
    }
}
