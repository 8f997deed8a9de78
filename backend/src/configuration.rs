use config::{Config, ConfigError};
use secrecy::Secret;
use serde::Deserialize;
use std::{net::SocketAddr, path::PathBuf};
use tracing::info;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub app: ApplicationSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub jwt_secret: Secret<String>,
    pub origin: String,
    #[serde(default)]
    pub secure_cookies: bool,
}

impl ApplicationSettings {
    pub fn get_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::Message(format!("Failed to parse address {addr}: {e}")))
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: "0.0.0.0".into(),
            port: get_env("PORT")?
                .parse::<u16>()
                .map_err(|_| ConfigError::Message("Invalid port number".into()))?,
            jwt_secret: Secret::new(get_env("JWT_SECRET")?),
            origin: get_env("WEBSITE_URL")?,
            secure_cookies: true,
        })
    }
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    database_url: Option<String>,
    is_migrating: Option<bool>,
}

impl DatabaseSettings {
    pub fn is_migrating(&self) -> bool {
        self.is_migrating.unwrap_or(false)
    }

    /// Field value first, `DATABASE_URL` second, an on-disk default last.
    pub fn get_connection_string(&self) -> String {
        if let Some(url) = self.database_url.clone() {
            info!("Using field database url");
            return url;
        }
        if let Some(url) = try_get_env("DATABASE_URL") {
            info!("Using env database url");
            return url;
        }
        info!("Using default database url");
        String::from("sqlite://studyhub.db?mode=rwc")
    }

    fn from_env() -> Self {
        Self {
            database_url: try_get_env("DATABASE_URL"),
            is_migrating: Some(true),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct StorageSettings {
    pub media_root: PathBuf,
}

impl StorageSettings {
    fn from_env() -> Self {
        Self {
            media_root: try_get_env("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("media")),
        }
    }
}

enum Environment {
    Local,
    Production,
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not supported environment. Use either `local` or `production`"
            )),
        }
    }
}

pub fn get_config() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {e}")))?;
    let config_dir = base_path.join("configuration");

    let environment = match std::env::var("APP_ENVIRONMENT") {
        Ok(env) => Environment::try_from(env).map_err(ConfigError::Message)?,
        Err(_) => Environment::Local,
    };

    match environment {
        Environment::Local => Config::builder()
            .add_source(config::File::from(config_dir.join("settings.toml")))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize(),
        Environment::Production => Ok(Settings {
            app: ApplicationSettings::from_env()?,
            database: DatabaseSettings::from_env(),
            storage: StorageSettings::from_env(),
        }),
    }
}

fn try_get_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn get_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::NotFound(name.into()))
}
