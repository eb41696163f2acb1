use std::path::PathBuf;
use std::str::FromStr;

use catalog_core::upload::{ImagePolicy, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_BYTES};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory uploaded images are written to and served from.
    pub upload_root: PathBuf,
    /// Largest accepted image upload in bytes.
    pub upload_max_bytes: usize,
    /// JPEG re-encoding quality, 1-100.
    pub image_quality: u8,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default             |
    /// |------------------------|---------------------|
    /// | `HOST`                 | `0.0.0.0`           |
    /// | `PORT`                 | `3000`              |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                |
    /// | `UPLOAD_ROOT`          | `storage/uploads`   |
    /// | `UPLOAD_MAX_BYTES`     | `40960000`          |
    /// | `IMAGE_QUALITY`        | `50`                |
    pub fn from_env() -> Result<Self, String> {
        let image_quality: u8 = env_or("IMAGE_QUALITY", DEFAULT_JPEG_QUALITY)?;
        if !(1..=100).contains(&image_quality) {
            return Err(format!(
                "IMAGE_QUALITY must be between 1 and 100, got {image_quality}"
            ));
        }

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000)?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            upload_root: std::env::var("UPLOAD_ROOT")
                .unwrap_or_else(|_| "storage/uploads".into())
                .into(),
            upload_max_bytes: env_or("UPLOAD_MAX_BYTES", DEFAULT_MAX_BYTES)?,
            image_quality,
        })
    }

    /// Image checks derived from the upload settings.
    pub fn image_policy(&self) -> ImagePolicy {
        ImagePolicy {
            max_bytes: self.upload_max_bytes,
            quality: Some(self.image_quality),
        }
    }

    /// Request body ceiling for upload routes: the image plus room for the
    /// text fields and multipart framing.
    pub fn upload_body_limit(&self) -> usize {
        self.upload_max_bytes.saturating_add(1024 * 1024)
    }
}

/// Database settings, read separately so the pool can be created first.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// | Env Var              | Default    |
    /// |----------------------|------------|
    /// | `DATABASE_URL`       | (required) |
    /// | `DB_MAX_CONNECTIONS` | `20`       |
    pub fn from_env() -> Result<Self, String> {
        let url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
        Ok(Self {
            url,
            max_connections: env_or("DB_MAX_CONNECTIONS", catalog_db::DEFAULT_MAX_CONNECTIONS)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{key} is invalid ({raw:?}): {e}")),
        Err(_) => Ok(default),
    }
}
