//! Orders, frozen line items and the order total rule
//!
//! A placed order never references live catalog data for its price or
//! content: each cart line is frozen into a [`LineItem`] at submission time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::cart::CartItem;
use crate::error::ValidationError;
use crate::product::check_money;

/// Flat shipping fee charged per order
pub const DEFAULT_SHIPPING_FEE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    #[serde(rename = "Manual Payment")]
    ManualPayment,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::ManualPayment => "Manual Payment",
        }
    }

    /// Whether a transaction reference must accompany the order
    pub fn requires_transaction_id(&self) -> bool {
        matches!(self, PaymentMethod::ManualPayment)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash on Delivery" => Ok(PaymentMethod::CashOnDelivery),
            "Manual Payment" => Ok(PaymentMethod::ManualPayment),
            other => Err(ValidationError::invalid(
                "paymentMethod",
                format!("unknown payment method {other:?}"),
            )),
        }
    }
}

/// Frozen copy of one purchased product configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub price: Decimal,
    pub image_url: String,
    pub product_id: Uuid,
}

impl LineItem {
    /// Snapshot a cart line as it is at this instant
    pub fn freeze(item: &CartItem) -> Self {
        Self {
            name: item.product.name.clone(),
            quantity: item.quantity,
            size: item.size.clone(),
            color: item.color.clone(),
            price: item.product.price,
            image_url: item.product.image_url.clone(),
            product_id: item.product.id,
        }
    }

    pub fn priced(&self) -> (Decimal, u32) {
        (self.price, self.quantity)
    }
}

/// Sum of `unit price * quantity` over all lines plus the shipping fee
pub fn compute_order_total<I>(lines: I, shipping_fee: Decimal) -> Decimal
where
    I: IntoIterator<Item = (Decimal, u32)>,
{
    lines
        .into_iter()
        .map(|(unit_price, quantity)| unit_price * Decimal::from(quantity))
        .sum::<Decimal>()
        + shipping_fee
}

/// Customer contact snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
}

/// Owner summary attached to an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user: OrderOwner,
    pub customer_info: CustomerInfo,
    pub order_items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub total_price: Decimal,
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Admin delivery confirmation: payment is confirmed in the same step.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) {
        self.is_delivered = true;
        self.delivered_at = Some(now);
        self.is_paid = true;
        self.paid_at = Some(now);
        self.updated_at = now;
    }

    pub fn items_subtotal(&self) -> Decimal {
        compute_order_total(self.order_items.iter().map(LineItem::priced), Decimal::ZERO)
    }
}

/// Body of an order creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    pub order_items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub total_price: Decimal,
}

impl NewOrderRequest {
    /// Check a submitted order against the rules in force at `shipping_fee`.
    ///
    /// Blank transaction ids are dropped, and cash on delivery never keeps one.
    pub fn verified(mut self, shipping_fee: Decimal) -> Result<Self, ValidationError> {
        if self.order_items.is_empty() {
            return Err(ValidationError::invalid("orderItems", "No order items"));
        }
        if self.order_items.iter().any(|line| line.quantity == 0) {
            return Err(ValidationError::invalid(
                "orderItems",
                "quantity must be at least 1",
            ));
        }
        if self.order_items.iter().any(|line| line.price < Decimal::ZERO) {
            return Err(ValidationError::invalid("orderItems", "price must not be negative"));
        }
        for line in &self.order_items {
            check_money("orderItems", line.price)?;
        }
        check_money("totalPrice", self.total_price)?;
        require(&self.customer_info.name, "customerInfo.name")?;
        require(&self.customer_info.phone, "customerInfo.phone")?;
        require(&self.shipping_address.address, "shippingAddress.address")?;
        require(&self.shipping_address.city, "shippingAddress.city")?;

        self.transaction_id = normalize_transaction_id(self.payment_method, self.transaction_id)?;

        let expected = compute_order_total(
            self.order_items.iter().map(LineItem::priced),
            shipping_fee,
        );
        if expected != self.total_price {
            return Err(ValidationError::TotalMismatch {
                expected: expected.to_string(),
                submitted: self.total_price.to_string(),
            });
        }

        Ok(self)
    }
}

/// Checkout page input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
}

impl CheckoutForm {
    /// Client-side checks run before any network call
    pub fn validate(&self, cart: &[CartItem]) -> Result<(), ValidationError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        if self.payment_method.requires_transaction_id() && self.transaction_id.trim().is_empty() {
            return Err(ValidationError::MissingTransactionId);
        }
        require(&self.name, "name")?;
        require(&self.phone, "phone")?;
        require(&self.address, "address")?;
        require(&self.city, "city")?;
        Ok(())
    }

    /// Freeze the cart and price the order
    pub fn into_request(
        self,
        cart: &[CartItem],
        email: &str,
        shipping_fee: Decimal,
    ) -> Result<NewOrderRequest, ValidationError> {
        self.validate(cart)?;

        let order_items: Vec<LineItem> = cart.iter().map(LineItem::freeze).collect();
        let total_price = compute_order_total(order_items.iter().map(LineItem::priced), shipping_fee);
        let transaction_id =
            normalize_transaction_id(self.payment_method, Some(self.transaction_id))?;

        Ok(NewOrderRequest {
            order_items,
            shipping_address: ShippingAddress {
                address: self.address.trim().to_string(),
                city: self.city.trim().to_string(),
            },
            customer_info: CustomerInfo {
                name: self.name.trim().to_string(),
                phone: self.phone.trim().to_string(),
                email: email.to_string(),
            },
            payment_method: self.payment_method,
            transaction_id,
            total_price,
        })
    }
}

fn normalize_transaction_id(
    method: PaymentMethod,
    transaction_id: Option<String>,
) -> Result<Option<String>, ValidationError> {
    let transaction_id = transaction_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    match method {
        PaymentMethod::ManualPayment if transaction_id.is_none() => {
            Err(ValidationError::MissingTransactionId)
        }
        PaymentMethod::ManualPayment => Ok(transaction_id),
        PaymentMethod::CashOnDelivery => Ok(None),
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}
