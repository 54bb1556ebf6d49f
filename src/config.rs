use std::net::SocketAddr;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "todo_api", version, about = "Multi-user to-do list backend")]
pub struct Config {
    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://todo.db?mode=rwc")]
    pub database_url: String,

    #[arg(long, env = "TODO_API_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    #[arg(long, env = "TODO_API_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Cookie signing secret, at least 64 bytes. A random key is generated
    /// when unset, which invalidates sessions on restart.
    #[arg(long, env = "TODO_API_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Sessions expire after this many minutes without a request
    #[arg(
        long,
        env = "TODO_API_SESSION_INACTIVITY_MINUTES",
        default_value_t = 1440,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub session_inactivity_minutes: u32,

    #[arg(long, env = "TODO_API_SECURE_COOKIES", default_value_t = false)]
    pub secure_cookies: bool,

    /// Insert demo users and lists on startup
    #[arg(long, default_value_t = false)]
    pub seed: bool,
}

impl Config {
    /// Configuration backed by a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            // every connection to `sqlite::memory:` opens a distinct database
            database_url: "sqlite::memory:".to_owned(),
            max_connections: 1,
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            session_secret: None,
            session_inactivity_minutes: 60,
            secure_cookies: false,
            seed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let config = Config::try_parse_from(["todo_api"]).unwrap();
        assert_eq!(config.bind, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.session_inactivity_minutes, 1440);
        assert!(!config.seed);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "todo_api",
            "--database-url",
            "sqlite::memory:",
            "--bind",
            "127.0.0.1:3000",
            "--seed",
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind.port(), 3000);
        assert!(config.seed);
    }

    #[test]
    fn session_inactivity_must_be_positive() {
        for minutes in ["0", "-5", "soon"] {
            let flag = format!("--session-inactivity-minutes={minutes}");
            assert!(Config::try_parse_from(["todo_api", flag.as_str()]).is_err());
        }

        let config =
            Config::try_parse_from(["todo_api", "--session-inactivity-minutes", "1"]).unwrap();
        assert_eq!(config.session_inactivity_minutes, 1);
    }
}
