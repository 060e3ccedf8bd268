//! Client configuration

use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ClientError;

/// Where the collaborators live and where local state is kept
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the catalog, order and upload API
    pub api_url: String,
    /// Base URL of the auth service
    pub auth_url: String,
    /// Directory holding the persisted cart, favorites and session
    pub state_dir: PathBuf,
    /// Shipping fee added to checkout totals, must match the API's
    pub shipping_fee: Decimal,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3001".to_string(),
            auth_url: "http://localhost:3000".to_string(),
            state_dir: PathBuf::from(".storefront"),
            shipping_fee: shop::DEFAULT_SHIPPING_FEE,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `STOREFRONT_API_URL`: API service base URL (default: "http://localhost:3001")
    /// - `STOREFRONT_AUTH_URL`: Auth service base URL (default: "http://localhost:3000")
    /// - `STOREFRONT_STATE_DIR`: Local state directory (default: ".storefront")
    /// - `STOREFRONT_SHIPPING_FEE`: Shipping fee (default: 60)
    pub fn from_env() -> Result<Self, ClientError> {
        let defaults = Self::default();

        let shipping_fee = match env::var("STOREFRONT_SHIPPING_FEE") {
            Ok(raw) => Decimal::from_str(raw.trim()).map_err(|e| {
                ClientError::Config(format!("STOREFRONT_SHIPPING_FEE: {}", e))
            })?,
            Err(_) => defaults.shipping_fee,
        };
        if shipping_fee < Decimal::ZERO {
            return Err(ClientError::Config(
                "STOREFRONT_SHIPPING_FEE must not be negative".to_string(),
            ));
        }

        Ok(ClientConfig {
            api_url: env::var("STOREFRONT_API_URL").unwrap_or(defaults.api_url),
            auth_url: env::var("STOREFRONT_AUTH_URL").unwrap_or(defaults.auth_url),
            state_dir: env::var("STOREFRONT_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_dir),
            shipping_fee,
        })
    }
}
