//! Environment configuration for native storefront processes.

use std::path::PathBuf;

use anyhow::Context;
use storefront_cart::DEFAULT_CART_KEY;
use storefront_core::DomainError;

pub const CATALOG_URL_VAR: &str = "STOREFRONT_CATALOG_URL";
pub const CART_KEY_VAR: &str = "STOREFRONT_CART_KEY";
pub const STATE_DB_VAR: &str = "STOREFRONT_STATE_DB";

pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Base URL of the catalog API (`{base}/products`).
    pub catalog_url: String,
    /// Slot key the cart is persisted under.
    pub cart_key: String,
    /// SQLite file backing the cart slot.
    pub state_db: PathBuf,
}

impl StorefrontConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve using `lookup` in place of the environment.
    ///
    /// Unset variables fall back to defaults; a variable that is set but
    /// blank is a configuration mistake and is rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let catalog_url = match setting(&lookup, CATALOG_URL_VAR)? {
            Some(url) => url,
            None => {
                tracing::info!(default = DEFAULT_CATALOG_URL, "{CATALOG_URL_VAR} not set; using default");
                DEFAULT_CATALOG_URL.to_string()
            }
        };

        let cart_key = match setting(&lookup, CART_KEY_VAR)? {
            Some(key) => key,
            None => {
                tracing::debug!(default = DEFAULT_CART_KEY, "{CART_KEY_VAR} not set; using default");
                DEFAULT_CART_KEY.to_string()
            }
        };

        let state_db = match setting(&lookup, STATE_DB_VAR)? {
            Some(path) => PathBuf::from(path),
            None => {
                let path = storefront_storage::default_state_db_path()
                    .with_context(|| format!("{STATE_DB_VAR} not set and no default location"))?;
                tracing::info!(path = %path.display(), "{STATE_DB_VAR} not set; using default");
                path
            }
        };

        Ok(Self {
            catalog_url,
            cart_key,
            state_db,
        })
    }
}

fn setting(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<String>> {
    match lookup(name) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => {
            Err(DomainError::validation(format!("{name} is set but empty")).into())
        }
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}
