//! Configuration management for safersnap
//!
//! All configuration is loaded from `./config/safersnap.toml`.
//! No hardcoded defaults exist in source code - all defaults are in the config template.

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/safersnap.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/safersnap.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("URL template in '{field}' is missing the '{placeholder}' placeholder: {template}")]
    MissingPlaceholder {
        field: String,
        placeholder: String,
        template: String,
    },

    #[error("At least two proxy templates must be configured for the proxy chain")]
    ProxyChainTooShort,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub endpoints: EndpointsConfig,
    pub proxies: Vec<ProxyConfig>,
    pub scrape: ScrapeConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

/// Upstream lookup endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    /// Carrier snapshot query URL; `{mc}` is replaced with the MC number
    pub snapshot_url: String,
    /// Carrier registration detail URL; `{dot}` is replaced with the DOT number
    pub registration_url: String,
}

impl EndpointsConfig {
    pub fn snapshot_url_for(&self, mc_number: &str) -> String {
        self.snapshot_url.replace("{mc}", mc_number)
    }

    pub fn registration_url_for(&self, dot_number: &str) -> String {
        self.registration_url.replace("{dot}", dot_number)
    }
}

/// One CORS-bypass relay in the proxy chain, tried in file order
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    pub name: String,
    /// Relay URL; `{url}` is replaced with the percent-encoded target URL
    pub url_template: String,
    /// How the relay returns the upstream body
    pub response_shape: ProxyResponseShape,
}

/// Response shape of a proxy relay
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyResponseShape {
    /// Body is the upstream content verbatim
    Raw,
    /// Body is a JSON envelope with the upstream content under "contents"
    JsonContents,
}

/// Scrape-run behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Delay between consecutive snapshot requests in a range scan (ms)
    pub request_delay_ms: u64,
    /// Account identifier presented to the insurance access check
    #[serde(default)]
    pub insurance_account: String,
    /// Base URL of the insurance lookup service
    pub insurance_api_base: String,
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.request_timeout_secs".to_string(),
            });
        }

        Self::require_placeholder("endpoints.snapshot_url", &self.endpoints.snapshot_url, "{mc}")?;
        Self::require_placeholder(
            "endpoints.registration_url",
            &self.endpoints.registration_url,
            "{dot}",
        )?;

        if self.proxies.len() < 2 {
            return Err(ConfigError::ProxyChainTooShort);
        }
        for (i, proxy) in self.proxies.iter().enumerate() {
            if proxy.name.is_empty() {
                return Err(ConfigError::EmptyRequired {
                    field: format!("proxies[{}].name", i),
                });
            }
            Self::require_placeholder(
                &format!("proxies[{}].url_template", i),
                &proxy.url_template,
                "{url}",
            )?;
        }

        if self.scrape.insurance_api_base.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "scrape.insurance_api_base".to_string(),
            });
        }

        Ok(())
    }

    fn require_placeholder(
        field: &str,
        template: &str,
        placeholder: &str,
    ) -> Result<(), ConfigError> {
        if template.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: field.to_string(),
            });
        }
        if !template.contains(placeholder) {
            return Err(ConfigError::MissingPlaceholder {
                field: field.to_string(),
                placeholder: placeholder.to_string(),
                template: template.to_string(),
            });
        }
        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        atty::is(atty::Stream::Stdin)
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config() -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("Configuration file not found. Create default config? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config()?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}
