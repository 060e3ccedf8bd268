//! Cart items and the pure list operations the store reducer is built from

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::product::{DEFAULT_COLOR, DEFAULT_SIZE, Product};

/// Identity of a cart line: same product in another size or color is a different line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey {
    pub product_id: Uuid,
    pub size: String,
    pub color: String,
}

impl CartKey {
    pub fn new(product_id: Uuid, size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            product_id,
            size: size.into(),
            color: color.into(),
        }
    }
}

/// One configured product in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    pub size: String,
    pub color: String,
}

impl CartItem {
    /// Build a cart line from a product page selection.
    ///
    /// Products without sizes or colors get the default labels; products that
    /// offer them require a pick. Sold out products cannot be selected.
    pub fn select(
        product: Product,
        size: Option<&str>,
        color: Option<&str>,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        if product.is_out_of_stock() {
            return Err(ValidationError::OutOfStock);
        }
        let size = pick_label(&product.sizes, size, DEFAULT_SIZE)
            .ok_or(ValidationError::SizeNotSelected)?;
        let color = pick_label(&product.colors, color, DEFAULT_COLOR)
            .ok_or(ValidationError::ColorNotSelected)?;
        if quantity == 0 {
            return Err(ValidationError::invalid("quantity", "must be at least 1"));
        }

        Ok(Self {
            product,
            quantity,
            size,
            color,
        })
    }

    pub fn key(&self) -> CartKey {
        CartKey::new(self.product.id, self.size.clone(), self.color.clone())
    }

    pub fn matches(&self, key: &CartKey) -> bool {
        self.product.id == key.product_id && self.size == key.size && self.color == key.color
    }

    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

fn pick_label(offered: &[String], chosen: Option<&str>, default: &str) -> Option<String> {
    if offered.is_empty() {
        return Some(default.to_string());
    }
    chosen
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}

/// Merge `item` into `cart`, summing quantities on a key match.
pub fn add(cart: &[CartItem], item: CartItem) -> Vec<CartItem> {
    let key = item.key();
    if cart.iter().any(|existing| existing.matches(&key)) {
        cart.iter()
            .map(|existing| {
                if existing.matches(&key) {
                    CartItem {
                        quantity: existing.quantity.saturating_add(item.quantity),
                        ..existing.clone()
                    }
                } else {
                    existing.clone()
                }
            })
            .collect()
    } else {
        let mut next = cart.to_vec();
        next.push(item);
        next
    }
}

pub fn remove(cart: &[CartItem], key: &CartKey) -> Vec<CartItem> {
    cart.iter()
        .filter(|existing| !existing.matches(key))
        .cloned()
        .collect()
}

/// Replace a line's quantity; zero or below removes the line.
///
/// Quantities past `u32::MAX` saturate.
pub fn set_quantity(cart: &[CartItem], key: &CartKey, quantity: i64) -> Vec<CartItem> {
    if quantity <= 0 {
        return remove(cart, key);
    }
    let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

    cart.iter()
        .map(|existing| {
            if existing.matches(key) {
                CartItem {
                    quantity,
                    ..existing.clone()
                }
            } else {
                existing.clone()
            }
        })
        .collect()
}

pub fn subtotal(cart: &[CartItem]) -> Decimal {
    cart.iter().map(CartItem::line_total).sum()
}

pub fn item_count(cart: &[CartItem]) -> u64 {
    cart.iter().map(|item| u64::from(item.quantity)).sum()
}
