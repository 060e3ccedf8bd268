//! Storefront settings for the API service
//!
//! Read from `API_*` environment variables, e.g. `API_SHIPPING_FEE=80`.

use common::{error::SettingsError, settings};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Ten mebibytes
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiSettings {
    /// Flat fee added to every order total
    pub shipping_fee: Decimal,
    /// Largest accepted image upload
    pub max_upload_bytes: usize,
}

impl ApiSettings {
    pub fn load() -> Result<Self, SettingsError> {
        let max_upload_bytes = DEFAULT_MAX_UPLOAD_BYTES.to_string();
        let settings: Self = settings::load(
            "API",
            &[
                ("shipping_fee", "60"),
                ("max_upload_bytes", max_upload_bytes.as_str()),
            ],
        )?;

        if settings.shipping_fee < Decimal::ZERO {
            return Err(SettingsError::Invalid {
                key: "shipping_fee",
                reason: "must not be negative".to_string(),
            });
        }

        Ok(settings)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            shipping_fee: shop::DEFAULT_SHIPPING_FEE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        unsafe {
            std::env::remove_var("API_SHIPPING_FEE");
            std::env::remove_var("API_MAX_UPLOAD_BYTES");
        }

        assert_eq!(ApiSettings::load().unwrap(), ApiSettings::default());
    }

    #[test]
    #[serial]
    fn test_shipping_fee_override() {
        unsafe {
            std::env::set_var("API_SHIPPING_FEE", "80.50");
        }
        assert_eq!(ApiSettings::load().unwrap().shipping_fee, dec!(80.50));

        unsafe {
            std::env::set_var("API_SHIPPING_FEE", "-1");
        }
        assert!(matches!(
            ApiSettings::load(),
            Err(SettingsError::Invalid { .. })
        ));

        unsafe {
            std::env::remove_var("API_SHIPPING_FEE");
        }
    }
}
