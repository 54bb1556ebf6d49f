use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use axum_login::AuthManagerLayerBuilder;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::{
    authentication::{self, Backend},
    config::Config,
    crud_ops, database,
    error::Result,
    repository::Repository,
    seed,
    service::Service,
};

const EXPIRED_SESSION_SWEEP: std::time::Duration = std::time::Duration::from_secs(60);

fn routes() -> Router<Service> {
    let private = Router::new()
        .route("/whoami", get(authentication::whoami))
        .route("/todos", post(crud_ops::create_todo).get(crud_ops::get_todos))
        .route("/todos/", post(crud_ops::create_todo).get(crud_ops::get_todos))
        .route(
            "/todos/{id}",
            get(crud_ops::get_todo)
                .put(crud_ops::update_todo)
                .delete(crud_ops::delete_todo),
        )
        .route("/todos/{id}/items", get(crud_ops::get_items).post(crud_ops::create_item))
        .route("/todos/{id}/items/", get(crud_ops::get_items).post(crud_ops::create_item))
        .route(
            "/todos/{id}/items/{item_id}",
            get(crud_ops::get_item)
                .put(crud_ops::update_item)
                .delete(crud_ops::delete_item),
        )
        .route_layer(middleware::from_fn(authentication::require_user));

    Router::new()
        .route("/users", post(authentication::sign_up))
        .route(
            "/sessions",
            post(authentication::sign_in).delete(authentication::sign_out),
        )
        .nest("/private", private)
}

/// Builds the application on top of a migrated pool. Sessions are stored in
/// the same database.
pub async fn app(config: &Config, pool: SqlitePool) -> Result<Router> {
    let service = Service::new(Repository::sqlite(pool.clone()));
    if config.seed {
        seed::seed_data(&service).await?;
    }

    let session_store = SqliteStore::new(pool);
    session_store.migrate().await?;
    tokio::task::spawn(delete_expired_sessions(session_store.clone()));

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(i64::from(
            config.session_inactivity_minutes,
        ))))
        .with_signed(authentication::session_key(config)?);
    let auth_layer =
        AuthManagerLayerBuilder::new(Backend::new(service.authorization.clone()), session_layer)
            .build();

    Ok(routes()
        .layer(TraceLayer::new_for_http())
        .layer(auth_layer)
        .with_state(service))
}

async fn delete_expired_sessions(store: SqliteStore) {
    if let Err(err) = store.continuously_delete_expired(EXPIRED_SESSION_SWEEP).await {
        tracing::error!(error = %err, "expired session sweep stopped");
    }
}

pub async fn run(config: Config) -> Result<()> {
    let pool = database::connect(&config).await?;
    let app = app(&config, pool).await?;

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
