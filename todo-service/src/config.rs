use config::{Config as Cfg, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// sqlx connection string, e.g. `sqlite://todo_app.db`.
    #[serde(default = "default_database_url")]
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_url() -> Secret<String> {
    Secret::new("sqlite://todo_app.db".to_string())
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Reads `.env`, then an optional `configuration.*` file, then
    /// `TODO__*` environment variables (e.g. `TODO__DATABASE__URL`).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("TODO").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
