/// Defines the runtime configuration for the clips service.
use std::{
    fmt::Display,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use clap::Args;

use crate::Error;

/// Settings shared by every subcommand. Each one can be supplied on the command line or through
/// the environment variable named alongside it.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Full PostgreSQL connection URL; takes precedence over the discrete POSTGRES_* settings
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    /// Database host used when DATABASE_URL is not set
    #[arg(long, env = "POSTGRES_SERVER", default_value = "localhost")]
    pub postgres_server: String,
    #[arg(long, env = "POSTGRES_USER", default_value = "postgres")]
    pub postgres_user: String,
    #[arg(long, env = "POSTGRES_PASSWORD", default_value = "postgres", hide_env_values = true)]
    pub postgres_password: String,
    #[arg(long, env = "POSTGRES_DB", default_value = "clips_db")]
    pub postgres_db: String,
    #[arg(long, env = "POSTGRES_PORT", default_value_t = 5432)]
    pub postgres_port: u16,
    /// Maximum number of pooled database connections
    #[arg(long, env = "CLIPS_DB_MAX_CONNECTIONS", default_value_t = 32)]
    pub max_connections: u32,
    /// How many times to check the database is reachable before giving up on seeding
    #[arg(long, env = "CLIPS_DB_CONNECT_RETRIES", default_value_t = 10)]
    pub db_connect_retries: u32,
    /// Seconds to wait between database connectivity checks
    #[arg(long, env = "CLIPS_DB_CONNECT_DELAY", default_value_t = 2)]
    pub db_connect_delay: u64,
    /// The address the HTTP server listens on
    #[arg(long, env = "CLIPS_LISTEN_ADDRESS", default_value = "0.0.0.0:8000")]
    pub listen_address: SocketAddr,
    /// Prefix the clip endpoints are mounted under
    #[arg(long, env = "CLIPS_API_PREFIX", default_value = "/api/v1")]
    pub api_prefix: String,
    /// Seconds to wait for a clip's remote audio before failing the stream request
    #[arg(long, env = "CLIPS_STREAM_TIMEOUT", default_value_t = 30)]
    pub stream_timeout: u64,
    /// The path to an x509 certificate the server should use for HTTPS.
    #[arg(long, env = "CLIPS_TLS_CERTIFICATE")]
    pub tls_certificate: Option<PathBuf>,
    /// The path to the key for the given certificate.
    #[arg(long, env = "CLIPS_TLS_KEY")]
    pub tls_key: Option<PathBuf>,
}

impl Config {
    /// The connection URL for the database, preferring an explicit `DATABASE_URL`.
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "postgresql://{}:{}@{}:{}/{}",
                self.postgres_user,
                self.postgres_password,
                self.postgres_server,
                self.postgres_port,
                self.postgres_db
            ),
        }
    }

    pub fn db_connect_delay(&self) -> Duration {
        Duration::from_secs(self.db_connect_delay)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout)
    }

    /// The API prefix without a trailing slash, so routes can be appended to it.
    pub fn api_prefix(&self) -> &str {
        self.api_prefix.trim_end_matches('/')
    }

    /// Checks settings that depend on each other.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tls_certificate.is_some() != self.tls_key.is_some() {
            return Err(Error::ConfigValueError(
                "'tls_certificate' and 'tls_key' must both be set or neither should be set."
                    .into(),
            ));
        }
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(Error::ConfigValueError(format!(
                "the API prefix must start with '/', got '{}'",
                self.api_prefix
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            postgres_server: "localhost".to_string(),
            postgres_user: "postgres".to_string(),
            postgres_password: "postgres".to_string(),
            postgres_db: "clips_db".to_string(),
            postgres_port: 5432,
            max_connections: 32,
            db_connect_retries: 10,
            db_connect_delay: 2,
            listen_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8000),
            api_prefix: "/api/v1".to_string(),
            stream_timeout: 30,
            tls_certificate: None,
            tls_key: None,
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let database = match &self.database_url {
            Some(url) if !url.is_empty() => "DATABASE_URL".to_string(),
            _ => format!(
                "{}@{}:{}/{}",
                self.postgres_user, self.postgres_server, self.postgres_port, self.postgres_db
            ),
        };
        write!(
            f,
            "database={} listen={} prefix={} stream_timeout={}s tls={}",
            database,
            self.listen_address,
            self.api_prefix(),
            self.stream_timeout,
            self.tls_certificate.is_some()
        )
    }
}
