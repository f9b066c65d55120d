//! Configuration for issuetrack
//!
//! Read from a TOML file, then overridden by `ISSUETRACK_*` environment
//! variables. Command-line flags are applied on top by the server binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "issuetrack";
const CONFIG_FILE: &str = "config.toml";

pub const CONFIG_ENV: &str = "ISSUETRACK_CONFIG";
pub const HOST_ENV: &str = "ISSUETRACK_HOST";
pub const PORT_ENV: &str = "ISSUETRACK_PORT";

/// issuetrack configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener settings
    pub server: ServerConfig,

    /// Logging settings
    pub log: LogConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port`, ready for a listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive (e.g. "info", "issuetrack_api=debug"); RUST_LOG wins
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, or defaults if it does not exist
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_required(path)
    }

    /// Load config from a TOML file that must exist
    pub fn load_required(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Resolve config from an explicit path, `$ISSUETRACK_CONFIG`, or the
    /// default location, then apply environment overrides
    ///
    /// An explicitly named file must exist; the default one may be absent.
    pub fn resolve(explicit: Option<&Path>) -> crate::Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load_required(&path)?,
            None => match default_path() {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `ISSUETRACK_HOST` / `ISSUETRACK_PORT` from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup(PORT_ENV).filter(|p| !p.is_empty()) {
            self.server.port = port
                .parse()
                .map_err(|e| crate::Error::Config(format!("{PORT_ENV}={port}: {e}")))?;
        }
        Ok(())
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# issuetrack configuration

[server]
# Address and port the API listens on
host = "127.0.0.1"
port = 3000

[log]
# tracing filter directive; RUST_LOG takes precedence when set
filter = "info"
"#
        .to_string()
    }
}

/// `<config_dir>/issuetrack/config.toml`, when a config dir is known
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
