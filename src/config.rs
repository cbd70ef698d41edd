use std::env;

use crate::domain::entities::DEFAULT_MAILBOX_INTERVAL;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub service_name: String,
    pub otel_exporter_endpoint: Option<String>,
    /// Prometheus exporter port; metrics are not exported when unset.
    pub metrics_port: Option<u16>,
    /// Check interval (minutes) given to new queues that do not set one.
    pub default_mailbox_interval: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://helpdesk.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort("SERVER_PORT"))?;

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "helpdesk".to_string());

        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

        let metrics_port = match env::var("METRICS_PORT") {
            Ok(port) => Some(
                port.parse()
                    .map_err(|_| ConfigError::InvalidPort("METRICS_PORT"))?,
            ),
            Err(_) => None,
        };

        let default_mailbox_interval = match env::var("DEFAULT_MAILBOX_INTERVAL") {
            Ok(value) => match value.parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => return Err(ConfigError::InvalidMailboxInterval(value)),
            },
            Err(_) => DEFAULT_MAILBOX_INTERVAL,
        };

        Ok(Config {
            database_url,
            server_host,
            server_port,
            service_name,
            otel_exporter_endpoint,
            metrics_port,
            default_mailbox_interval,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number in {0}")]
    InvalidPort(&'static str),

    #[error("DEFAULT_MAILBOX_INTERVAL must be a positive number of minutes, got '{0}'")]
    InvalidMailboxInterval(String),
}
