use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Application configuration loaded from an optional TOML file, overridden
/// by `TODOS_*` environment variables (`TODOS_SERVER__PORT=8080`).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}
impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_path = env::var("TODOS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load with `path` as the file layer; a missing file is skipped.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = config::Config::builder();

        let from_file = path.exists();
        if from_file {
            builder = builder.add_source(config::File::from(PathBuf::from(path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TODOS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        let mut config: Self = settings.try_deserialize().with_context(|| {
            if from_file {
                format!("invalid configuration in {} or TODOS_* environment", path.display())
            } else {
                "invalid configuration in TODOS_* environment".to_string()
            }
        })?;

        if config.logging.level.trim().is_empty() {
            config.logging.level = "info".to_string();
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Take host and scheme from `Forwarded`/`X-Forwarded-*` headers. Only
    /// safe behind a proxy that overwrites them.
    pub trust_proxy_headers: bool,
}
impl ServerConfig {
    /// `host:port`, resolved when the listener binds.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            trust_proxy_headers: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}
impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_without_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = AppConfig::load_from(&dir.path().join("missing.toml"))?;
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.server.trust_proxy_headers);
        assert_eq!(config.storage.path, PathBuf::from("db"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        Ok(())
    }

    #[test]
    fn reads_toml_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path)?;
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 8080
trust_proxy_headers = true

[storage]
path = "/var/lib/todos"

[logging]
format = "json"
"#
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.server.bind_addr(), "127.0.0.1:8080");
        assert!(config.server.trust_proxy_headers);
        assert_eq!(config.storage.path, PathBuf::from("/var/lib/todos"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        Ok(())
    }

    #[test]
    fn bad_file_value_names_the_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"not a port\"\n")?;

        let err = AppConfig::load_from(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains(&path.display().to_string()), "{message}");
        assert!(message.contains("TODOS_*"), "{message}");
        Ok(())
    }
}
