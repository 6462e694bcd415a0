//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - Postgres or SQLite connection string
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 10000)
//! - `UPLOAD_DIR` - Directory for product images (default: uploads)
//! - `STORAGE_BACKEND` - `orm` or `sql` (default: orm)
//! - `CATALOG_CATEGORIES` - Comma-separated category choices
//! - `CATALOG_SIZES` - Comma-separated size choices
//! - `ALLOWED_IMAGE_EXTENSIONS` - Comma-separated image extensions
//! - `SHOP_NAME` - Name used in WhatsApp order messages
//! - `WHATSAPP_NUMBER` - Number that receives orders
//! - `MAX_UPLOAD_BYTES` - Request body limit for the add-product form

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_PORT: u16 = 10000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_CATEGORIES: &[&str] = &["Kurti", "Gown", "Saree", "Dress", "Top"];
const DEFAULT_SIZES: &[&str] = &["Free", "S", "M", "L", "XL"];
const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
const DEFAULT_SHOP_NAME: &str = "Kainat Selection";
const DEFAULT_WHATSAPP_NUMBER: &str = "919898617889";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which `ProductStore` implementation backs the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// sea-orm entity API.
    #[default]
    Orm,
    /// Hand-written parameterized SQL.
    Sql,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orm" => Ok(Self::Orm),
            "sql" => Ok(Self::Sql),
            other => Err(format!("expected `orm` or `sql`, got `{other}`")),
        }
    }
}

/// Choices offered by the add-product form and enforced on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    pub categories: Vec<String>,
    pub sizes: Vec<String>,
    /// Lowercase, without the leading dot.
    pub image_extensions: Vec<String>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            categories: owned(DEFAULT_CATEGORIES),
            sizes: owned(DEFAULT_SIZES),
            image_extensions: owned(DEFAULT_IMAGE_EXTENSIONS),
        }
    }
}

/// Where shop order links point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderContact {
    pub shop_name: String,
    pub whatsapp_number: String,
}

impl Default for OrderContact {
    fn default() -> Self {
        Self {
            shop_name: DEFAULT_SHOP_NAME.to_string(),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub storage_backend: StorageBackend,
    pub catalog: CatalogOptions,
    pub contact: OrderContact,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or an optional
    /// variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            get("DATABASE_URL").ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".into()))?;

        let host = parse_or(get("HOST"), "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let storage_backend = parse_or(get("STORAGE_BACKEND"), "STORAGE_BACKEND", StorageBackend::Orm)?;
        let max_upload_bytes =
            parse_or(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let upload_dir = get("UPLOAD_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR), PathBuf::from);

        let catalog = CatalogOptions {
            categories: list_or(get("CATALOG_CATEGORIES"), "CATALOG_CATEGORIES", DEFAULT_CATEGORIES)?,
            sizes: list_or(get("CATALOG_SIZES"), "CATALOG_SIZES", DEFAULT_SIZES)?,
            image_extensions: list_or(
                get("ALLOWED_IMAGE_EXTENSIONS"),
                "ALLOWED_IMAGE_EXTENSIONS",
                DEFAULT_IMAGE_EXTENSIONS,
            )?
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect(),
        };

        let contact = OrderContact {
            shop_name: get("SHOP_NAME").unwrap_or_else(|| DEFAULT_SHOP_NAME.to_string()),
            whatsapp_number: get("WHATSAPP_NUMBER")
                .map(|n| n.trim().trim_start_matches('+').to_string())
                .unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            upload_dir,
            storage_backend,
            catalog,
            contact,
            max_upload_bytes,
        })
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

fn list_or(raw: Option<String>, key: &str, default: &[&str]) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(owned(default));
    };

    let values: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    if values.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "expected at least one comma-separated value".to_string(),
        ));
    }
    Ok(values)
}
