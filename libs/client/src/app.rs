//! Storefront flows tying the state store to the collaborators
//!
//! Every flow validates locally first, talks to the network second and only
//! touches persisted state once the collaborator has answered successfully.

use rust_decimal::Decimal;
use shop::validation::{
    normalize_email, validate_email, validate_name, validate_password,
    validate_password_confirmation,
};
use shop::{
    Access, Action, Boundary, CartItem, CheckoutForm, DurableStore, FileStore, Order, PriceTag,
    Product, ProductInput, Redirect, Snapshot, Store, UserSession, admit,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Outcome of loading something that may legitimately not exist
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Ready(T),
    NotFound,
}

impl<T> ViewState<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            ViewState::Ready(value) => Some(value),
            ViewState::NotFound => None,
        }
    }
}

/// Everything the product page shows
#[derive(Debug, Clone, PartialEq)]
pub struct ProductView {
    pub price_tag: PriceTag,
    pub is_favorite: bool,
    pub out_of_stock: bool,
    pub product: Product,
}

/// Storefront application core
pub struct Storefront<S: DurableStore> {
    store: Store<S>,
    api: ApiClient,
    shipping_fee: Decimal,
}

impl Storefront<FileStore> {
    /// Rehydrate from `config.state_dir` and point at the configured services
    pub fn open(config: &ClientConfig) -> ClientResult<Self> {
        let store = Store::open(FileStore::new(config.state_dir.clone()))?;
        Ok(Self::new(store, ApiClient::new(config), config.shipping_fee))
    }
}

impl<S: DurableStore> Storefront<S> {
    pub fn new(store: Store<S>, api: ApiClient, shipping_fee: Decimal) -> Self {
        Self {
            store,
            api,
            shipping_fee,
        }
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    /// Gate check for a view about to be entered
    pub fn enter(&self, boundary: Boundary) -> Result<(), Redirect> {
        admit(self.store.access(), boundary)
    }

    fn session_for(&self, boundary: Boundary) -> ClientResult<UserSession> {
        self.enter(boundary).map_err(ClientError::Gate)?;
        self.store
            .session()
            .cloned()
            .ok_or(ClientError::Gate(Redirect::Login))
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<Arc<Snapshot>> {
        let email = normalize_email(email);
        validate_email(&email)?;
        if password.is_empty() {
            return Err(shop::ValidationError::Required("password").into());
        }

        let session = self.api.login(&email, password).await?;
        info!("Signed in as {} (admin: {})", session.email, session.is_admin);
        Ok(self.store.dispatch(Action::SessionSet(session))?)
    }

    /// Create an account. The confirmation is checked before anything is sent.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> ClientResult<Arc<Snapshot>> {
        validate_password_confirmation(password, confirm_password)?;
        let name = name.trim();
        let email = normalize_email(email);
        validate_name(name)?;
        validate_email(&email)?;
        validate_password(password)?;

        let session = self.api.register(name, &email, password).await?;
        info!("Registered {}", session.email);
        Ok(self.store.dispatch(Action::SessionSet(session))?)
    }

    /// Sign out, dropping the session together with the cart and favorites.
    ///
    /// Local state is cleared even when the server cannot revoke the token.
    pub async fn logout(&mut self) -> ClientResult<Arc<Snapshot>> {
        if let Some(session) = self.store.session().cloned() {
            if let Err(e) = self.api.logout(&session.token).await {
                warn!("Token revocation failed, clearing local session anyway: {}", e);
            }
        }
        Ok(self.store.dispatch(Action::Logout)?)
    }

    pub fn add_to_cart(
        &mut self,
        product: Product,
        size: Option<&str>,
        color: Option<&str>,
        quantity: u32,
    ) -> ClientResult<Arc<Snapshot>> {
        let item = CartItem::select(product, size, color, quantity)?;
        Ok(self.store.dispatch(Action::CartAdd(item))?)
    }

    /// Flip the favorite flag; returns whether the product is now a favorite
    pub fn toggle_favorite(&mut self, product: Product) -> ClientResult<bool> {
        if self.store.is_favorite(product.id) {
            self.store.dispatch(Action::FavoriteRemove(product.id))?;
            Ok(false)
        } else {
            self.store.dispatch(Action::FavoriteAdd(product))?;
            Ok(true)
        }
    }

    pub async fn product_detail(&self, id: Uuid) -> ClientResult<ViewState<ProductView>> {
        match self.api.get_product(id).await {
            Ok(product) => Ok(ViewState::Ready(ProductView {
                price_tag: PriceTag::for_product(&product),
                is_favorite: self.store.is_favorite(product.id),
                out_of_stock: product.is_out_of_stock(),
                product,
            })),
            Err(ClientError::NotFound(_)) => Ok(ViewState::NotFound),
            Err(e) => Err(e),
        }
    }

    pub async fn my_orders(&self) -> ClientResult<Vec<Order>> {
        let session = self.session_for(Boundary::Protected)?;
        self.api.my_orders(&session.token).await
    }

    pub async fn order_detail(&self, id: Uuid) -> ClientResult<ViewState<Order>> {
        let session = self.session_for(Boundary::Protected)?;
        match self.api.get_order(&session.token, id).await {
            Ok(order) => Ok(ViewState::Ready(order)),
            Err(ClientError::NotFound(_)) => Ok(ViewState::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Place an order for the current cart.
    ///
    /// The cart is emptied only after the order service accepted the order.
    /// A placed order is returned even when the cart cannot be cleared.
    pub async fn checkout(&mut self, form: CheckoutForm) -> ClientResult<Order> {
        let session = self.session_for(Boundary::Protected)?;
        let request = form.into_request(&self.store.state().cart, &session.email, self.shipping_fee)?;

        let order = self.api.create_order(&session.token, &request).await?;
        info!("Order {} placed, total {}", order.id, order.total_price);

        if let Err(e) = self.store.dispatch(Action::CartClear) {
            warn!("Order {} placed but the cart could not be cleared: {}", order.id, e);
        }
        Ok(order)
    }

    /// Create (`id == None`) or update a catalog product
    pub async fn save_product(&self, id: Option<Uuid>, input: ProductInput) -> ClientResult<Product> {
        let session = self.session_for(Boundary::AdminOnly)?;
        let input = input.normalized();
        input.validate()?;

        match id {
            Some(id) => self.api.update_product(&session.token, id, &input).await,
            None => self.api.create_product(&session.token, &input).await,
        }
    }

    pub async fn delete_product(&self, id: Uuid) -> ClientResult<()> {
        let session = self.session_for(Boundary::AdminOnly)?;
        self.api.delete_product(&session.token, id).await
    }

    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> ClientResult<String> {
        let session = self.session_for(Boundary::AdminOnly)?;
        self.api
            .upload_image(&session.token, bytes, file_name, content_type)
            .await
    }

    /// Admin delivery confirmation, which the order service also records as paid
    pub async fn confirm_delivery(&self, order_id: Uuid) -> ClientResult<Order> {
        let session = self.session_for(Boundary::AdminOnly)?;
        self.api.deliver_order(&session.token, order_id).await
    }

    pub fn access(&self) -> Access {
        self.store.access()
    }
}
