//! Service configuration from an optional `config.toml` and `PDFCOVER__*`
//! environment variables (e.g. `PDFCOVER__SERVER__PORT=8080`).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    #[serde(default = "default_limits")]
    pub limits: LimitsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where uploads and finished artifacts are kept
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Width of the thumbnails returned with an upload
    #[serde(default = "default_thumbnail_width")]
    pub thumbnail_width: u32,
}

pub fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

pub fn default_storage() -> StorageConfig {
    StorageConfig {
        upload_dir: default_upload_dir(),
        output_dir: default_output_dir(),
    }
}

pub fn default_limits() -> LimitsConfig {
    LimitsConfig {
        max_upload_bytes: default_max_upload_bytes(),
        thumbnail_width: default_thumbnail_width(),
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_thumbnail_width() -> u32 {
    200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            limits: default_limits(),
        }
    }
}

impl AppConfig {
    /// Load from `config.toml` (if present) and the environment
    pub fn load() -> ServiceResult<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("PDFCOVER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ServiceError::Config {
                message: format!("Failed to build config: {}", e),
            })?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> ServiceResult<Self> {
        config.try_deserialize().map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize config: {}", e),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
