//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides. The
//! configuration file path defaults to `config.yaml` but can be specified via `-f` flag or
//! `TEXTRACT_CONFIG` environment variable. A missing file is not an error: every field has a
//! default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `TEXTRACT_` override YAML values
//! 3. **API_KEY / PORT** - Unprefixed variables used by existing deployments of the service
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `TEXTRACT_LIMITS__MAX_FILE_SIZE=5242880` sets the `limits.max_file_size` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use text_extractor::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Shared secret expected in the x-api-key header
//! API_KEY="super-secret"
//!
//! # Override server port
//! PORT=8080
//!
//! # Prefixed forms work too, and are the only way to reach nested values
//! TEXTRACT_HOST=127.0.0.1
//! TEXTRACT_ENABLE_METRICS=true
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::Error;

/// Default upload cap: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "TEXTRACT_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Loaded once at startup and cloned into the router state; nothing mutates it afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Shared secret clients must send in the `x-api-key` header.
    ///
    /// When unset (or empty) every extraction request is rejected as unauthorized.
    #[serde(deserialize_with = "deserialize_secret", skip_serializing)]
    pub api_key: Option<String>,
    /// Resource limits for uploads
    pub limits: LimitsConfig,
    /// Expose Prometheus metrics at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Resource limits for protecting the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum size in bytes of the uploaded file.
    /// Default: 10MB
    pub max_file_size: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_key: None,
            limits: LimitsConfig::default(),
            enable_metrics: false,
            enable_otel_export: false,
        }
    }
}

/// Environment values are parsed loosely, so a purely numeric key such as `API_KEY=12345` arrives
/// as a number. Accept any scalar and keep its textual form.
fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
        Bool(bool),
    }

    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|scalar| match scalar {
        Scalar::Text(s) => s,
        Scalar::Signed(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), Error> {
        if self.limits.max_file_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: limits.max_file_size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Prefixed environment variables override specific values
            .merge(Env::prefixed("TEXTRACT_").split("__").ignore(&["config"]))
            // Unprefixed API_KEY and PORT, as existing deployments set them
            .merge(Env::raw().only(&["API_KEY", "PORT"]))
    }

    /// The shared secret, if one is configured and non-empty.
    pub fn configured_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
