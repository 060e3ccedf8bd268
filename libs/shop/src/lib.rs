//! Storefront domain library
//!
//! Products and the discount pricing rule, cart and favorites, orders and
//! their totals, sessions and the authorization gate, and the state store
//! that keeps all of it in sync with durable storage. Nothing in this crate
//! performs network I/O.

pub mod cart;
pub mod error;
pub mod order;
pub mod persistence;
pub mod product;
pub mod session;
pub mod store;
pub mod validation;

pub use cart::{CartItem, CartKey};
pub use error::{StoreError, StoreResult, ValidationError};
pub use order::{
    CheckoutForm, CustomerInfo, DEFAULT_SHIPPING_FEE, LineItem, NewOrderRequest, Order,
    OrderOwner, PaymentMethod, ShippingAddress, compute_order_total,
};
pub use persistence::{DurableStore, FileStore, MemoryStore};
pub use product::{PriceTag, Product, ProductInput, discount_percent, effective_original_price};
pub use session::{Access, Boundary, Claims, Redirect, UserSession, admit};
pub use store::{Action, Snapshot, Store};
