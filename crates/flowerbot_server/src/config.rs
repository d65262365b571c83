//! Server configuration: TOML file, environment overrides, CLI overrides.

use derive_getters::Getters;
use derive_more::{Display, Error};
use flowerbot_core::GeneratorSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Environment variable overriding [`ServerConfig::host`].
pub const HOST_ENV: &str = "FLOWERBOT_HOST";

/// Environment variable overriding [`ServerConfig::port`].
pub const PORT_ENV: &str = "PORT";

/// Configuration for the game server.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Board size used when a client does not pick one.
    #[serde(default = "default_board_size")]
    default_board_size: u32,

    /// Upper bound on actions performed by one autoplay run.
    #[serde(default = "default_autoplay_max_steps")]
    autoplay_max_steps: usize,

    /// Declare a game over once its log holds this many entries.
    #[serde(default)]
    move_limit: Option<usize>,

    /// Seed for reproducible board generation.
    #[serde(default)]
    seed: Option<u64>,

    /// Content density of generated boards.
    #[serde(default)]
    generator: GeneratorSettings,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_board_size() -> u32 {
    10
}

fn default_autoplay_max_steps() -> usize {
    5_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_board_size: default_board_size(),
            autoplay_max_steps: default_autoplay_max_steps(),
            move_limit: None,
            seed: None,
            generator: GeneratorSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Applies [`HOST_ENV`] and [`PORT_ENV`] from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Applies host/port overrides from `lookup`.
    #[instrument(skip_all)]
    pub fn with_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup(HOST_ENV) {
            debug!(%host, "Host overridden by environment");
            self.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid {PORT_ENV} '{port}': {e}")))?;
            debug!(port = self.port, "Port overridden by environment");
        }
        Ok(self)
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Sets the move limit.
    pub fn with_move_limit(mut self, move_limit: Option<usize>) -> Self {
        self.move_limit = move_limit;
        self
    }

    /// Sets the generator seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the autoplay step bound.
    pub fn with_autoplay_max_steps(mut self, steps: usize) -> Self {
        self.autoplay_max_steps = steps;
        self
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
