//! End-to-end storefront flows against mock collaborators

mod support;

use client::{ApiClient, ClientError, Storefront, ViewState};
use rust_decimal_macros::dec;
use serde_json::json;
use shop::{
    Access, Action, Boundary, CheckoutForm, FileStore, LineItem, PaymentMethod, ProductInput, Redirect,
    Store, ValidationError,
};
use support::{config, order, product, session, storefront, storefront_with};
use uuid::Uuid;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn checkout_form(payment_method: PaymentMethod, transaction_id: &str) -> CheckoutForm {
    CheckoutForm {
        name: "Rahim".to_string(),
        phone: "01700000000".to_string(),
        address: "House 4, Road 2".to_string(),
        city: "Dhaka".to_string(),
        payment_method,
        transaction_id: transaction_id.to_string(),
    }
}

#[tokio::test]
async fn login_sets_session_and_opens_protected_views() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session(false)))
        .mount(&server)
        .await;

    let mut app = storefront(&server);
    assert_eq!(app.enter(Boundary::Protected), Err(Redirect::Login));

    let snapshot = app.login("Rahim@Example.com", "secret-pass").await.unwrap();

    assert!(snapshot.user_info.is_some());
    assert_eq!(app.access(), Access::Customer);
    assert_eq!(app.enter(Boundary::Protected), Ok(()));
    assert_eq!(app.enter(Boundary::AdminOnly), Err(Redirect::AdminLogin));
}

#[tokio::test]
async fn failed_login_leaves_state_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid email or password"})),
        )
        .mount(&server)
        .await;

    let mut app = storefront(&server);
    let err = app.login("rahim@example.com", "wrong").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(app.access(), Access::Anonymous);
}

#[tokio::test]
async fn register_checks_confirmation_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut app = storefront(&server);
    let err = app
        .register("Rahim", "rahim@example.com", "secret-pass", "secret-typo")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::PasswordMismatch)
    ));
}

#[tokio::test]
async fn logout_clears_everything_even_when_revocation_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = storefront_with(&server, Some(session(false)));
    let shirt = product(dec!(500), None);
    app.add_to_cart(shirt.clone(), Some("M"), Some("White"), 1)
        .unwrap();
    app.toggle_favorite(shirt).unwrap();

    let snapshot = app.logout().await.unwrap();

    assert!(snapshot.user_info.is_none());
    assert!(snapshot.cart.is_empty());
    assert!(snapshot.favorites.is_empty());
    assert_eq!(app.enter(Boundary::Protected), Err(Redirect::Login));
}

#[tokio::test]
async fn add_to_cart_requires_offered_size() {
    let server = MockServer::start().await;
    let mut app = storefront(&server);

    let err = app
        .add_to_cart(product(dec!(500), None), None, Some("White"), 1)
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::SizeNotSelected)
    ));
    assert!(app.snapshot().cart.is_empty());
}

#[tokio::test]
async fn sold_out_product_stays_out_of_the_cart() {
    let server = MockServer::start().await;
    let mut app = storefront(&server);
    let mut sold_out = product(dec!(500), None);
    sold_out.count_in_stock = 0;

    let err = app
        .add_to_cart(sold_out, Some("M"), Some("White"), 1)
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::OutOfStock)
    ));
    assert!(app.snapshot().cart.is_empty());
}

#[tokio::test]
async fn toggle_favorite_flips() {
    let server = MockServer::start().await;
    let mut app = storefront(&server);
    let shirt = product(dec!(500), None);

    assert!(app.toggle_favorite(shirt.clone()).unwrap());
    assert!(app.store().is_favorite(shirt.id));
    assert!(!app.toggle_favorite(shirt.clone()).unwrap());
    assert!(!app.store().is_favorite(shirt.id));
}

#[tokio::test]
async fn product_detail_distinguishes_not_found_from_failure() {
    let server = MockServer::start().await;
    let on_sale = product(dec!(500), Some(dec!(800)));
    let missing = Uuid::new_v4();
    let broken = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/products/{}", on_sale.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&on_sale))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/products/{missing}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/products/{broken}")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = storefront(&server);

    let view = app.product_detail(on_sale.id).await.unwrap().ready().unwrap();
    assert_eq!(view.price_tag.original_price, Some(dec!(800)));
    assert_eq!(view.price_tag.discount_percent, Some(38));
    assert!(!view.is_favorite);

    assert_eq!(
        app.product_detail(missing).await.unwrap(),
        ViewState::NotFound
    );
    assert_eq!(app.product_detail(broken).await.unwrap_err().status(), Some(503));
}

#[tokio::test]
async fn checkout_submits_frozen_items_and_clears_cart() {
    let server = MockServer::start().await;
    let customer = session(false);
    let shirt = product(dec!(500), None);
    let cap = product(dec!(300), None);

    let mut app = storefront_with(&server, Some(customer.clone()));
    app.add_to_cart(shirt.clone(), Some("M"), Some("White"), 2)
        .unwrap();
    app.add_to_cart(cap.clone(), Some("L"), Some("White"), 1)
        .unwrap();

    let lines: Vec<LineItem> = app.snapshot().cart.iter().map(LineItem::freeze).collect();
    let placed = order(&customer, lines, dec!(1360));

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("Authorization", "Bearer token-abc"))
        .and(body_partial_json(json!({
            "paymentMethod": "Cash on Delivery",
            "customerInfo": {"email": "rahim@example.com"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&placed))
        .expect(1)
        .mount(&server)
        .await;

    let got = app
        .checkout(checkout_form(PaymentMethod::CashOnDelivery, ""))
        .await
        .unwrap();

    assert_eq!(got.id, placed.id);
    assert!(app.snapshot().cart.is_empty());

    let requests = server.received_requests().await.unwrap();
    let body: shop::NewOrderRequest = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body.total_price, dec!(1360));
    assert_eq!(body.order_items.len(), 2);
    assert_eq!(body.transaction_id, None);
}

#[tokio::test]
async fn failed_checkout_keeps_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "Internal server error"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = storefront_with(&server, Some(session(false)));
    app.add_to_cart(product(dec!(500), None), Some("M"), Some("White"), 1)
        .unwrap();

    let err = app
        .checkout(checkout_form(PaymentMethod::CashOnDelivery, ""))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(app.snapshot().cart.len(), 1);
}

#[tokio::test]
async fn placed_order_is_returned_when_cart_cannot_be_cleared() {
    let server = MockServer::start().await;
    let customer = session(false);

    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("state");
    let mut store = Store::open(FileStore::new(&state_dir)).unwrap();
    store.dispatch(Action::SessionSet(customer.clone())).unwrap();
    let mut app = Storefront::new(store, ApiClient::new(&config(&server)), dec!(60));
    app.add_to_cart(product(dec!(500), None), Some("M"), Some("White"), 1)
        .unwrap();

    let lines: Vec<LineItem> = app.snapshot().cart.iter().map(LineItem::freeze).collect();
    let placed = order(&customer, lines, dec!(560));
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&placed))
        .expect(1)
        .mount(&server)
        .await;

    // A regular file where the state directory should be
    std::fs::remove_dir_all(&state_dir).unwrap();
    std::fs::write(&state_dir, b"").unwrap();

    let got = app
        .checkout(checkout_form(PaymentMethod::CashOnDelivery, ""))
        .await
        .unwrap();
    assert_eq!(got.id, placed.id);
}

#[tokio::test]
async fn manual_payment_without_transaction_id_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut app = storefront_with(&server, Some(session(false)));
    app.add_to_cart(product(dec!(500), None), Some("M"), Some("White"), 1)
        .unwrap();

    let err = app
        .checkout(checkout_form(PaymentMethod::ManualPayment, "  "))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::MissingTransactionId)
    ));
    assert_eq!(app.snapshot().cart.len(), 1);
}

#[tokio::test]
async fn checkout_requires_sign_in() {
    let server = MockServer::start().await;
    let mut app = storefront(&server);
    app.add_to_cart(product(dec!(500), None), Some("M"), Some("White"), 1)
        .unwrap();

    let err = app
        .checkout(checkout_form(PaymentMethod::CashOnDelivery, ""))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Gate(Redirect::Login)));
}

#[tokio::test]
async fn admin_helpers_are_gated() {
    let server = MockServer::start().await;
    let app = storefront_with(&server, Some(session(false)));

    let err = app.confirm_delivery(Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, ClientError::Gate(Redirect::AdminLogin)));
}

#[tokio::test]
async fn save_product_normalizes_original_price() {
    let server = MockServer::start().await;
    let saved = product(dec!(500), None);

    Mock::given(method("POST"))
        .and(path("/api/products"))
        .and(header("Authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&saved))
        .expect(1)
        .mount(&server)
        .await;

    let app = storefront_with(&server, Some(session(true)));
    let mut input = ProductInput::from(&saved);
    input.original_price = Some(dec!(400));

    let got = app.save_product(None, input).await.unwrap();
    assert_eq!(got.id, saved.id);

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(sent.get("originalPrice").is_none());
}

#[tokio::test]
async fn confirm_delivery_returns_paid_order() {
    let server = MockServer::start().await;
    let admin = session(true);
    let mut delivered = order(&session(false), Vec::new(), dec!(60));
    delivered.mark_delivered(chrono::Utc::now());

    Mock::given(method("PUT"))
        .and(path(format!("/api/orders/{}/deliver", delivered.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&delivered))
        .expect(1)
        .mount(&server)
        .await;

    let app = storefront_with(&server, Some(admin));
    let got = app.confirm_delivery(delivered.id).await.unwrap();

    assert!(got.is_delivered);
    assert!(got.is_paid);
}

#[tokio::test]
async fn state_survives_restart() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server);
    config.state_dir = dir.path().join("state");

    let shirt = product(dec!(500), None);
    {
        let mut app = Storefront::open(&config).unwrap();
        app.add_to_cart(shirt.clone(), Some("L"), Some("White"), 3)
            .unwrap();
    }

    let reopened = Storefront::open(&config).unwrap();
    let snapshot = reopened.snapshot();
    let cart = &snapshot.cart;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 3);
    assert_eq!(cart[0].product, shirt);

    let store = Store::open(FileStore::new(config.state_dir.clone())).unwrap();
    assert_eq!(store.cart_count(), 3);
}
