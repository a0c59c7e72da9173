//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use worldline_checkpoint::domain::retention::RetentionPolicy;
use worldline_checkpoint::domain::store::{DEFAULT_ASSET_INLINE_LIMIT, StoreSettings};

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STORE_PATH: &str = "worldline-store.json";

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// JSON file holding the persisted checkpoint store.
    pub store_path: PathBuf,
    /// Largest store file accepted; `None` means unlimited.
    pub store_quota_bytes: Option<usize>,
    pub store: StoreSettings,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value
    /// or `None` when it is unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let store_path = lookup("WORLDLINE_STORE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from);
        let store_quota_bytes = lookup("WORLDLINE_STORE_QUOTA_BYTES")
            .map(|raw| {
                raw.parse().map_err(|e| {
                    AppError::Config(format!("WORLDLINE_STORE_QUOTA_BYTES must be a byte count: {e}"))
                })
            })
            .transpose()?;
        let retention = lookup("WORLDLINE_RETENTION")
            .map(|raw| {
                raw.parse::<RetentionPolicy>()
                    .map_err(|e| AppError::Config(format!("WORLDLINE_RETENTION: {e}")))
            })
            .transpose()?
            .unwrap_or_default();
        let asset_inline_limit = match lookup("WORLDLINE_ASSET_INLINE_LIMIT") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("WORLDLINE_ASSET_INLINE_LIMIT must be a byte count: {e}"))
            })?,
            None => DEFAULT_ASSET_INLINE_LIMIT,
        };

        Ok(Self {
            host,
            port,
            store_path,
            store_quota_bytes,
            store: StoreSettings {
                retention,
                asset_inline_limit,
            },
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
