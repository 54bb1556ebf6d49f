use clap::Parser;
use todo_api::{config::Config, server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_api=debug,tower_http=debug")),
        )
        .init();

    let config = Config::parse();
    if let Err(e) = server::run(config).await {
        tracing::error!("run server error: {:?}", e);
        std::process::exit(1);
    }
}
