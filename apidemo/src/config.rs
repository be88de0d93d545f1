//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `APIDEMO_CONFIG`
//! environment variable. A missing file is not an error: every field has a default.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `APIDEMO_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `APIDEMO_UPLOADS__DIRECTORY=/var/tmp/uploads` sets the `uploads.directory` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use apidemo::config::{Args, Config};
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
//! APIDEMO_PORT=9090
//! APIDEMO_REQUEST_TIMEOUT=2m
//! APIDEMO_UPLOADS__FORM_FIELD_LIMIT=1048576
//! APIDEMO_DOCS__ENABLED=false
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::errors::Error;
use crate::materializer::safe_join;

/// Default inline multipart field limit: 100 MiB
pub const DEFAULT_FORM_FIELD_LIMIT: usize = 100 * 1024 * 1024;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "APIDEMO_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Upper bound on the time spent handling a single request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
    /// Where and how request bodies are materialized on disk
    pub uploads: UploadsConfig,
    /// Generated API documentation
    pub docs: DocsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Base directory for every file written by the service. Relative paths resolve
    /// against the working directory.
    pub directory: PathBuf,
    /// Maximum size in bytes of an inline (non-file) multipart field
    pub form_field_limit: usize,
    /// File name used by the streamed save-file endpoint
    pub stream_file_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// Serve the OpenAPI document and the documentation UI
    pub enabled: bool,
    /// Mount path of the documentation UI
    pub path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout: Duration::from_secs(30),
            enable_otel_export: false,
            uploads: UploadsConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("temp"),
            form_field_limit: DEFAULT_FORM_FIELD_LIMIT,
            stream_file_name: "file.txt".to_string(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/swagger".to_string(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.uploads.form_field_limit == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.form_field_limit must be a positive number of bytes".to_string(),
            });
        }

        if safe_join(&self.uploads.directory, &self.uploads.stream_file_name).is_err() {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: uploads.stream_file_name '{}' must be a relative name inside the upload directory",
                    self.uploads.stream_file_name
                ),
            });
        }

        if self.request_timeout < Duration::from_secs(1) {
            return Err(Error::Internal {
                operation: "Config validation: request_timeout is too short (minimum 1 second)".to_string(),
            });
        }

        if self.docs.enabled && !self.docs.path.starts_with('/') {
            return Err(Error::Internal {
                operation: format!("Config validation: docs.path '{}' must start with '/'", self.docs.path),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values; APIDEMO_CONFIG names the file itself
            .merge(Env::prefixed("APIDEMO_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
