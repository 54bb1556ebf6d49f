use std::{fmt, sync::Arc};

use axum::{
    extract::{Extension, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tower_sessions::cookie::Key;

use crate::{
    config::Config,
    entities::{NewUser, User},
    error::{Error, Result},
    extract::Json,
    service::{Authorization, Service},
};

pub type AuthSession = axum_login::AuthSession<Backend>;

#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Resolves credentials and session user ids through the `Authorization`
/// service.
#[derive(Clone)]
pub struct Backend {
    authorization: Arc<dyn Authorization>,
}

impl Backend {
    pub fn new(authorization: Arc<dyn Authorization>) -> Self {
        Self { authorization }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl axum_login::AuthnBackend for Backend {
    type User = User;
    type Credentials = self::Credentials;
    type Error = Error;

    async fn authenticate(&self, creds: Self::Credentials) -> Result<Option<Self::User>> {
        self.authorization
            .authenticate(&creds.email, creds.password)
            .await
    }

    async fn get_user(&self, user_id: &axum_login::UserId<Self>) -> Result<Option<Self::User>> {
        self.authorization.find(*user_id).await
    }
}

/// Signing key for session cookies.
pub fn session_key(config: &Config) -> Result<Key> {
    match &config.session_secret {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|_| Error::Config("session secret must be at least 64 bytes".to_owned())),
        None => {
            tracing::warn!("no session secret configured, sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}

/// Rejects requests without a logged-in user and hands the user to the
/// handler as an `Extension<User>`.
pub async fn require_user(auth_session: AuthSession, mut request: Request, next: Next) -> Result<Response> {
    let Some(user) = auth_session.user else {
        tracing::warn!(path = %request.uri().path(), "request without a valid session");
        return Err(Error::NotAuthenticated);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn sign_up(
    State(service): State<Service>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user = service.authorization.create_user(new_user).await?;
    tracing::info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn sign_in(
    mut auth_session: AuthSession,
    Json(creds): Json<Credentials>,
) -> Result<Json<User>> {
    let Some(user) = auth_session.authenticate(creds).await? else {
        tracing::warn!("rejected sign in");
        return Err(Error::IncorrectEmailOrPassword);
    };

    auth_session.login(&user).await?;
    tracing::info!(user_id = user.id, "user signed in");
    Ok(Json(user))
}

pub async fn sign_out(mut auth_session: AuthSession) -> Result<StatusCode> {
    match auth_session.logout().await? {
        Some(user) => {
            tracing::info!(user_id = user.id, "user signed out");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(Error::NotAuthenticated),
    }
}

pub async fn whoami(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
