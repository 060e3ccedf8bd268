//! Fixtures shared by the client integration tests

#![allow(dead_code)]

use chrono::Utc;
use client::{ApiClient, ClientConfig, Storefront};
use rust_decimal::Decimal;
use shop::{
    Action, CustomerInfo, LineItem, MemoryStore, Order, OrderOwner, PaymentMethod, Product,
    ShippingAddress, Store, UserSession,
};
use uuid::Uuid;
use wiremock::MockServer;

pub const TOKEN: &str = "token-abc";

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_url: server.uri(),
        auth_url: server.uri(),
        ..ClientConfig::default()
    }
}

pub fn storefront(server: &MockServer) -> Storefront<MemoryStore> {
    storefront_with(server, None)
}

/// Storefront whose store already holds `session`
pub fn storefront_with(
    server: &MockServer,
    session: Option<UserSession>,
) -> Storefront<MemoryStore> {
    let config = config(server);
    let mut store = Store::open(MemoryStore::new()).unwrap();
    if let Some(session) = session {
        store.dispatch(Action::SessionSet(session)).unwrap();
    }
    Storefront::new(store, ApiClient::new(&config), config.shipping_fee)
}

pub fn session(is_admin: bool) -> UserSession {
    UserSession {
        id: Uuid::new_v4(),
        name: "Rahim".to_string(),
        email: "rahim@example.com".to_string(),
        is_admin,
        token: TOKEN.to_string(),
    }
}

pub fn product(price: Decimal, original_price: Option<Decimal>) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: "Linen Panjabi".to_string(),
        price,
        original_price,
        image_url: "https://cdn.example.com/panjabi.jpg".to_string(),
        category: "Men".to_string(),
        description: "Breathable summer linen".to_string(),
        count_in_stock: 5,
        colors: vec!["White".to_string()],
        sizes: vec!["M".to_string(), "L".to_string()],
        created_at: None,
        updated_at: None,
    }
}

pub fn order(owner: &UserSession, items: Vec<LineItem>, total_price: Decimal) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4(),
        user: OrderOwner {
            id: owner.id,
            name: owner.name.clone(),
            email: owner.email.clone(),
        },
        customer_info: CustomerInfo {
            name: owner.name.clone(),
            phone: "01700000000".to_string(),
            email: owner.email.clone(),
        },
        order_items: items,
        shipping_address: ShippingAddress {
            address: "House 4, Road 2".to_string(),
            city: "Dhaka".to_string(),
        },
        payment_method: PaymentMethod::CashOnDelivery,
        transaction_id: None,
        total_price,
        is_paid: false,
        paid_at: None,
        is_delivered: false,
        delivered_at: None,
        created_at: now,
        updated_at: now,
    }
}
