//! Configuration for the hello world server.
//!
//! Supports both command-line arguments and a TOML configuration file.
//! CLI arguments take precedence over config file values, which take
//! precedence over the built-in defaults.

use clap::Parser;
use hwserver_core::endpoint::{Endpoint, EndpointError};
use hwserver_core::options::SocketOptions;
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Port the hello world server listens on by default
pub const DEFAULT_PORT: u16 = 5560;

/// Command-line arguments for the server
#[derive(Parser, Debug, Default)]
#[command(name = "hwserver")]
#[command(version)]
#[command(about = "Request/reply hello world server", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Endpoint to bind (e.g., tcp://*:5560)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Reply sent for every request
    #[arg(short, long)]
    pub reply: Option<String>,

    /// Simulated work per request, in milliseconds
    #[arg(short, long)]
    pub work_ms: Option<u64>,

    /// Stop after this many replies (default: run forever)
    #[arg(short = 'n', long)]
    pub max_requests: Option<u64>,

    /// ZMTP handshake timeout in milliseconds (0 = no timeout)
    #[arg(long)]
    pub handshake_timeout_ms: Option<u64>,

    /// Largest accepted request body in bytes
    #[arg(long)]
    pub max_msg_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_reply")]
    pub reply: String,
    #[serde(default = "default_work_ms")]
    pub work_ms: u64,
    pub max_requests: Option<u64>,
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    pub max_msg_size: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            reply: default_reply(),
            work_ms: default_work_ms(),
            max_requests: None,
            handshake_timeout_ms: default_handshake_timeout_ms(),
            max_msg_size: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_bind() -> String {
    format!("tcp://*:{DEFAULT_PORT}")
}

fn default_reply() -> String {
    "World".to_string()
}

fn default_work_ms() -> u64 {
    1000
}

fn default_handshake_timeout_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: Endpoint,
    pub reply: String,
    /// Simulated work before each reply
    pub work: Duration,
    pub max_requests: Option<u64>,
    pub handshake_timeout: Duration,
    pub max_msg_size: Option<usize>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let server = ServerConfig::default();
        Self {
            bind: Endpoint::Tcp(SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), DEFAULT_PORT)),
            reply: server.reply,
            work: Duration::from_millis(server.work_ms),
            max_requests: server.max_requests,
            handshake_timeout: Duration::from_millis(server.handshake_timeout_ms),
            max_msg_size: server.max_msg_size,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the process arguments and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Resolve already-parsed CLI arguments, reading `--config` if given.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = match cli.config {
            Some(ref path) => read_toml(path)?,
            None => TomlConfig::default(),
        };
        Self::resolve(cli, toml_config)
    }

    /// Merge CLI args over file values and validate the result.
    pub fn resolve(cli: CliArgs, file: TomlConfig) -> Result<Self, ConfigError> {
        let bind = cli.bind.unwrap_or(file.server.bind);
        let bind = Endpoint::parse(&bind).map_err(|e| ConfigError::InvalidBind(bind, e))?;

        let config = Config {
            bind,
            reply: cli.reply.unwrap_or(file.server.reply),
            work: Duration::from_millis(cli.work_ms.unwrap_or(file.server.work_ms)),
            max_requests: cli.max_requests.or(file.server.max_requests),
            handshake_timeout: Duration::from_millis(
                cli.handshake_timeout_ms
                    .unwrap_or(file.server.handshake_timeout_ms),
            ),
            max_msg_size: cli.max_msg_size.or(file.server.max_msg_size),
            log_level: cli.log_level.unwrap_or(file.logging.level),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reply.is_empty() {
            return Err(ConfigError::EmptyReply);
        }
        if self.max_requests == Some(0) {
            return Err(ConfigError::ZeroMaxRequests);
        }
        Ok(())
    }

    /// Socket options for each accepted peer.
    pub fn socket_options(&self) -> SocketOptions {
        let options = SocketOptions::default().with_handshake_timeout(self.handshake_timeout);
        match self.max_msg_size {
            Some(max) => options.with_max_msg_size(max),
            None => options,
        }
    }
}

fn read_toml(path: &Path) -> Result<TomlConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::TomlParse(path.to_path_buf(), e))
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {}", .0.display(), .1)]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{}': {}", .0.display(), .1)]
    TomlParse(PathBuf, #[source] toml::de::Error),

    #[error("Invalid bind endpoint '{0}': {1}")]
    InvalidBind(String, #[source] EndpointError),

    #[error("Reply must not be empty")]
    EmptyReply,

    #[error("max_requests must be at least 1")]
    ZeroMaxRequests,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.bind.socket_addr(),
            "0.0.0.0:5560".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.reply, "World");
        assert_eq!(config.work, Duration::from_secs(1));
        assert_eq!(config.max_requests, None);
        assert_eq!(config.handshake_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            bind = "tcp://127.0.0.1:6000"
            reply = "Welt"
            work_ms = 250
            max_requests = 3

            [logging]
            level = "debug"
        "#;

        let file: TomlConfig = toml::from_str(toml_str).unwrap();
        let config = Config::resolve(CliArgs::default(), file).unwrap();
        assert_eq!(config.bind.to_string(), "tcp://127.0.0.1:6000");
        assert_eq!(config.reply, "Welt");
        assert_eq!(config.work, Duration::from_millis(250));
        assert_eq!(config.max_requests, Some(3));
        assert_eq!(config.handshake_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_cli_overrides_file() {
        let file: TomlConfig = toml::from_str(
            r#"
            [server]
            bind = "tcp://127.0.0.1:6000"
            work_ms = 250
        "#,
        )
        .unwrap();
        let cli = CliArgs::try_parse_from([
            "hwserver",
            "--bind",
            "tcp://localhost:7000",
            "--work-ms",
            "0",
            "--log-level",
            "warn",
        ])
        .unwrap();

        let config = Config::resolve(cli, file).unwrap();
        assert_eq!(config.bind.to_string(), "tcp://127.0.0.1:7000");
        assert_eq!(config.work, Duration::ZERO);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let cli = CliArgs::try_parse_from(["hwserver", "--bind", "udp://*:5560"]).unwrap();
        let err = Config::resolve(cli, TomlConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBind(..)));
    }

    #[test]
    fn test_empty_reply_rejected() {
        let cli = CliArgs::try_parse_from(["hwserver", "--reply", ""]).unwrap();
        let err = Config::resolve(cli, TomlConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyReply));
    }

    #[test]
    fn test_missing_file_reported() {
        let cli = CliArgs::try_parse_from(["hwserver", "--config", "/nonexistent/hwserver.toml"])
            .unwrap();
        let err = Config::from_args(cli).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(..)));
    }

    #[test]
    fn test_socket_options_follow_config() {
        let cli = CliArgs::try_parse_from([
            "hwserver",
            "--handshake-timeout-ms",
            "0",
            "--max-msg-size",
            "64",
        ])
        .unwrap();
        let config = Config::resolve(cli, TomlConfig::default()).unwrap();
        let options = config.socket_options();
        assert_eq!(options.handshake_deadline(), None);
        assert_eq!(options.max_msg_size, Some(64));
    }
}
