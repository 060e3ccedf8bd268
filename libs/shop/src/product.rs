//! Product model and the discount pricing rule
//!
//! Every place that decides whether a "was" price exists goes through
//! [`effective_original_price`]: admin create, admin update and rendering.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Size label used when a product offers no sizes
pub const DEFAULT_SIZE: &str = "One Size";

/// Color label used when a product offers no colors
pub const DEFAULT_COLOR: &str = "Default";

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub image_url: String,
    pub category: String,
    pub description: String,
    pub count_in_stock: i32,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Original price as the storefront should treat it
    pub fn effective_original_price(&self) -> Option<Decimal> {
        effective_original_price(self.price, self.original_price)
    }

    /// Whether the product is sold out
    pub fn is_out_of_stock(&self) -> bool {
        self.count_in_stock <= 0
    }
}

/// Return the candidate original price only when it is strictly above `price`.
pub fn effective_original_price(price: Decimal, candidate: Option<Decimal>) -> Option<Decimal> {
    candidate.filter(|original| *original > price)
}

/// Rounded discount percentage, `None` whenever the pricing rule rejects the original.
pub fn discount_percent(price: Decimal, candidate: Option<Decimal>) -> Option<u32> {
    let original = effective_original_price(price, candidate)?;
    if original <= Decimal::ZERO {
        return None;
    }

    ((original - price) / original * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

/// Price display decision for a catalog card or detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTag {
    pub price: Decimal,
    /// Struck-through "was" price
    pub original_price: Option<Decimal>,
    /// SALE badge percentage
    pub discount_percent: Option<u32>,
}

impl PriceTag {
    pub fn new(price: Decimal, candidate: Option<Decimal>) -> Self {
        let original_price = effective_original_price(price, candidate);
        Self {
            price,
            original_price,
            discount_percent: original_price.and_then(|_| discount_percent(price, candidate)),
        }
    }

    pub fn for_product(product: &Product) -> Self {
        Self::new(product.price, product.original_price)
    }

    pub fn on_sale(&self) -> bool {
        self.original_price.is_some()
    }
}

/// Admin create/update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub image_url: String,
    pub category: String,
    pub description: String,
    pub count_in_stock: i32,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl ProductInput {
    /// Apply the pricing rule and tidy label lists.
    ///
    /// An original price of zero, or one not above the price, is dropped.
    pub fn normalized(mut self) -> Self {
        self.original_price = effective_original_price(self.price, self.original_price);
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self.colors = tidy_labels(self.colors);
        self.sizes = tidy_labels(self.sizes);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("name"));
        }
        if self.image_url.trim().is_empty() {
            return Err(ValidationError::Required("imageUrl"));
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::Required("category"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::Required("description"));
        }
        if self.price < Decimal::ZERO {
            return Err(ValidationError::invalid("price", "must not be negative"));
        }
        check_money("price", self.price)?;
        if let Some(original) = self.original_price {
            check_money("originalPrice", original)?;
        }
        if self.count_in_stock < 0 {
            return Err(ValidationError::invalid(
                "countInStock",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            original_price: product.original_price,
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            description: product.description.clone(),
            count_in_stock: product.count_in_stock,
            colors: product.colors.clone(),
            sizes: product.sizes.clone(),
        }
    }
}

/// Decimal places stored for every amount of money
pub const MONEY_SCALE: u32 = 2;

/// Reject amounts the database would round on write
pub(crate) fn check_money(field: &'static str, amount: Decimal) -> Result<(), ValidationError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::invalid(
            field,
            format!("at most {MONEY_SCALE} decimal places"),
        ));
    }
    Ok(())
}

/// Split a comma separated label field as typed in the admin form
pub fn parse_labels(raw: &str) -> Vec<String> {
    tidy_labels(raw.split(',').map(str::to_string).collect())
}

fn tidy_labels(labels: Vec<String>) -> Vec<String> {
    labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}
