//! Configuration management
//!
//! Configuration is loaded from a `config.yml` file, with environment
//! variables overriding the file settings. Missing optional values are
//! filled with sensible defaults, so an empty file (or none at all) yields
//! a runnable development setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Media storage configuration
    #[serde(default)]
    pub media: MediaConfig,
    /// Template configuration
    #[serde(default)]
    pub templates: TemplateConfig,
    /// Optional superuser bootstrap credentials
    #[serde(default)]
    pub bootstrap: Option<BootstrapConfig>,
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used so the server can
    /// start with zero configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            tracing::info!("Config file {:?} not found, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Override file settings from environment variables.
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TINTERO_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TINTERO_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            } else {
                tracing::warn!("Ignoring invalid TINTERO_PORT: {}", port);
            }
        }
        if let Ok(url) = std::env::var("TINTERO_DATABASE_URL") {
            self.database.url = url;
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration (SQLite)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path, or `:memory:` for an in-memory database
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/tintero.db".to_string()
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in days
    #[serde(default = "default_session_days")]
    pub expiration_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiration_days: default_session_days(),
        }
    }
}

fn default_session_days() -> i64 {
    7
}

/// Media storage configuration
///
/// Post images and avatars are stored as paths relative to `root`. The
/// placeholder images are shared files and are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory holding uploaded media, served under `/media`
    #[serde(default = "default_media_root")]
    pub root: String,
    /// Placeholder shown for posts without an image
    #[serde(default = "default_post_placeholder")]
    pub post_placeholder: String,
    /// Placeholder shown for accounts without an avatar
    #[serde(default = "default_avatar_placeholder")]
    pub avatar_placeholder: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            post_placeholder: default_post_placeholder(),
            avatar_placeholder: default_avatar_placeholder(),
        }
    }
}

fn default_media_root() -> String {
    "media".to_string()
}

fn default_post_placeholder() -> String {
    "posts/post_default.png".to_string()
}

fn default_avatar_placeholder() -> String {
    "avatars/user_default.png".to_string()
}

/// Template configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Glob pattern for tera templates
    #[serde(default = "default_template_glob")]
    pub glob: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            glob: default_template_glob(),
        }
    }
}

fn default_template_glob() -> String {
    "templates/**/*.html".to_string()
}

/// Superuser bootstrap credentials.
///
/// When present, a superuser account with these credentials is created on
/// startup if the username is not taken yet. This is the only way a
/// superuser comes into existence; registration always creates members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "data/tintero.db");
        assert_eq!(config.session.expiration_days, 7);
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
server:
  port: 3000
database:
  url: ":memory:"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 3000);
        // Unset fields fall back to defaults
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.media.post_placeholder, "posts/post_default.png");
    }

    #[test]
    fn test_parse_bootstrap_section() {
        let yaml = r#"
bootstrap:
  username: root
  email: root@example.com
  password: hunter2
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let bootstrap = config.bootstrap.expect("bootstrap should be set");
        assert_eq!(bootstrap.username, "root");
        assert_eq!(bootstrap.email, "root@example.com");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load(Path::new("does/not/exist.yml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "server:\n  host: 127.0.0.1\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
    }
}
