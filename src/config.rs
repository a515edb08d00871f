//! Layered settings: built-in defaults, then an optional TOML file, then
//! `ORGMAP__SECTION__KEY` environment variables.

use std::path::PathBuf;

use ::config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::Deserialize;

use crate::error::Result;
use crate::session::PersistenceMode;

pub const DEFAULT_CONFIG_FILE: &str = "orgmap.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Unset means an in-memory database that lives as long as
    /// the process.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Settings {
    /// Loads settings from `file` (missing is fine) and the environment.
    pub fn load(file: &str) -> Result<Self> {
        Self::builder()?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("ORGMAP").prefix_separator("__").separator("__"))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Defaults overlaid with TOML text; used where no environment should leak in.
    pub fn from_toml(text: &str) -> Result<Self> {
        Self::builder()?
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("log.filter", "orgmap=info,tower_http=info")?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        match &self.database.path {
            Some(path) => PersistenceMode::File(path.clone()),
            None => PersistenceMode::InMemory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_give_in_memory_store_on_localhost() {
        let settings = Settings::from_toml("").expect("defaults");
        assert_eq!(settings.bind_address(), "127.0.0.1:8000");
        assert_eq!(settings.persistence_mode(), PersistenceMode::InMemory);
        assert_eq!(settings.log.filter, "orgmap=info,tower_http=info");
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = Settings::from_toml(
            r#"
            [server]
            port = 9100

            [database]
            path = "orgs.db"
            "#,
        )
        .expect("settings");
        assert_eq!(settings.bind_address(), "127.0.0.1:9100");
        assert_eq!(settings.persistence_mode(), PersistenceMode::File(PathBuf::from("orgs.db")));
    }

    #[test]
    fn wrongly_typed_values_are_config_errors() {
        let err = Settings::from_toml("[server]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, crate::error::OrgmapError::Config(_)));
    }
}
