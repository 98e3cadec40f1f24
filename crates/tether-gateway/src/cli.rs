use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tether_gateway::telemetry::LogFormat;
use tether_gateway::Timeouts;
use tether_storage::PostgresSettings;

pub const HOST_ENV: &str = "TETHER_HOST";
pub const PORT_ENV: &str = "TETHER_PORT";
pub const READ_TIMEOUT_ENV: &str = "TETHER_READ_TIMEOUT_SECS";
pub const WRITE_TIMEOUT_ENV: &str = "TETHER_WRITE_TIMEOUT_SECS";
pub const STORAGE_BACKEND_ENV: &str = "TETHER_STORAGE_BACKEND";
pub const DB_HOST_ENV: &str = "TETHER_DB_HOST";
pub const DB_PORT_ENV: &str = "TETHER_DB_PORT";
pub const DB_USER_ENV: &str = "TETHER_DB_USER";
pub const DB_PASSWORD_ENV: &str = "TETHER_DB_PASSWORD";
pub const DB_NAME_ENV: &str = "TETHER_DB_NAME";
pub const DB_SSLMODE_ENV: &str = "TETHER_DB_SSLMODE";
pub const DB_CONNECT_TIMEOUT_ENV: &str = "TETHER_DB_CONNECT_TIMEOUT_SECS";
pub const DB_MAX_CONNECTIONS_ENV: &str = "TETHER_DB_MAX_CONNECTIONS";
pub const NODE_ID_ENV: &str = "TETHER_NODE_ID";
pub const MIN_CODE_WIDTH_ENV: &str = "TETHER_MIN_CODE_WIDTH";
pub const LOG_FORMAT_ENV: &str = "TETHER_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "postgres")]
    Postgres,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tether", about = "URL shortener HTTP server")]
pub struct CLI {
    #[arg(long, env = HOST_ENV, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = PORT_ENV, default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = READ_TIMEOUT_ENV, default_value_t = 5)]
    pub read_timeout_secs: u64,

    #[arg(long, env = WRITE_TIMEOUT_ENV, default_value_t = 5)]
    pub write_timeout_secs: u64,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = DB_HOST_ENV, default_value = "localhost")]
    pub db_host: String,

    #[arg(long, env = DB_PORT_ENV, default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, env = DB_USER_ENV, default_value = "user")]
    pub db_user: String,

    #[arg(long, env = DB_PASSWORD_ENV, default_value = "password", hide_env_values = true)]
    pub db_password: String,

    #[arg(long, env = DB_NAME_ENV, default_value = "dbname")]
    pub db_name: String,

    #[arg(long, env = DB_SSLMODE_ENV, default_value = "disable")]
    pub db_sslmode: String,

    #[arg(long, env = DB_CONNECT_TIMEOUT_ENV, default_value_t = 60)]
    pub db_connect_timeout_secs: u64,

    #[arg(long, env = DB_MAX_CONNECTIONS_ENV, default_value_t = 10)]
    pub db_max_connections: u32,

    /// Distinguishes processes that share one store. Must be in 0..=15.
    #[arg(long, env = NODE_ID_ENV, default_value_t = 0)]
    pub node_id: u8,

    #[arg(long, env = MIN_CODE_WIDTH_ENV, default_value_t = 6)]
    pub min_code_width: usize,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CLI {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            read: Duration::from_secs(self.read_timeout_secs),
            write: Duration::from_secs(self.write_timeout_secs),
        }
    }

    pub fn postgres_settings(&self) -> PostgresSettings {
        PostgresSettings::builder()
            .host(self.db_host.as_str())
            .port(self.db_port)
            .username(self.db_user.as_str())
            .password(self.db_password.as_str())
            .database(self.db_name.as_str())
            .ssl_mode(self.db_sslmode.as_str())
            .connect_timeout(Duration::from_secs(self.db_connect_timeout_secs))
            .max_connections(self.db_max_connections)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = CLI::try_parse_from(["tether"]).unwrap();
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.node_id, 0);
        assert_eq!(cli.min_code_width, 6);
        assert_eq!(cli.log_format, LogFormat::Text);

        let timeouts = cli.timeouts();
        assert_eq!(timeouts.read, Duration::from_secs(5));
        assert_eq!(timeouts.write, Duration::from_secs(5));

        let settings = cli.postgres_settings();
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, 5432);
        assert_eq!(settings.database, "dbname");
        assert_eq!(settings.connect_timeout, Duration::from_secs(60));
        assert_eq!(settings.max_connections, 10);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = CLI::try_parse_from([
            "tether",
            "--storage",
            "postgres",
            "--db-host",
            "db.internal",
            "--node-id",
            "3",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.storage, StorageBackendArg::Postgres);
        assert_eq!(cli.postgres_settings().host, "db.internal");
        assert_eq!(cli.node_id, 3);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(CLI::try_parse_from(["tether", "--storage", "mysql"]).is_err());
    }
}
