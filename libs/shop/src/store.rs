//! Application state store
//!
//! Holds the cart, the favorites list and the signed-in user. State only
//! changes through [`Store::dispatch`], which runs the pure [`reduce`]
//! function, writes every changed slice to the durable store and only then
//! publishes the new snapshot. Build one `Store` at startup and pass it to
//! whatever needs it.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cart::{self, CartItem, CartKey};
use crate::error::StoreResult;
use crate::persistence::{
    CART_KEY, DurableStore, FAVORITES_KEY, USER_INFO_KEY, load_json, save_json,
};
use crate::product::Product;
use crate::session::{Access, UserSession};

/// Immutable view of the storefront state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub cart: Vec<CartItem>,
    pub favorites: Vec<Product>,
    pub user_info: Option<UserSession>,
}

/// Every way the state can change
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CartAdd(CartItem),
    CartRemove(CartKey),
    /// Zero or negative quantities remove the line
    CartSetQuantity { key: CartKey, quantity: i64 },
    CartClear,
    FavoriteAdd(Product),
    FavoriteRemove(Uuid),
    SessionSet(UserSession),
    /// Drops the session only
    SessionClear,
    /// Drops the session, the cart and the favorites
    Logout,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::CartAdd(_) => "cart_add",
            Action::CartRemove(_) => "cart_remove",
            Action::CartSetQuantity { .. } => "cart_set_quantity",
            Action::CartClear => "cart_clear",
            Action::FavoriteAdd(_) => "favorite_add",
            Action::FavoriteRemove(_) => "favorite_remove",
            Action::SessionSet(_) => "session_set",
            Action::SessionClear => "session_clear",
            Action::Logout => "logout",
        }
    }
}

/// Compute the snapshot that follows `state` under `action`.
pub fn reduce(state: &Snapshot, action: Action) -> Snapshot {
    match action {
        Action::CartAdd(item) => Snapshot {
            cart: cart::add(&state.cart, item),
            ..state.clone()
        },
        Action::CartRemove(key) => Snapshot {
            cart: cart::remove(&state.cart, &key),
            ..state.clone()
        },
        Action::CartSetQuantity { key, quantity } => Snapshot {
            cart: cart::set_quantity(&state.cart, &key, quantity),
            ..state.clone()
        },
        Action::CartClear => Snapshot {
            cart: Vec::new(),
            ..state.clone()
        },
        Action::FavoriteAdd(product) => {
            if state.favorites.iter().any(|p| p.id == product.id) {
                return state.clone();
            }
            let mut favorites = state.favorites.clone();
            favorites.push(product);
            Snapshot {
                favorites,
                ..state.clone()
            }
        }
        Action::FavoriteRemove(product_id) => Snapshot {
            favorites: state
                .favorites
                .iter()
                .filter(|p| p.id != product_id)
                .cloned()
                .collect(),
            ..state.clone()
        },
        Action::SessionSet(session) => Snapshot {
            user_info: Some(session),
            ..state.clone()
        },
        Action::SessionClear => Snapshot {
            user_info: None,
            ..state.clone()
        },
        Action::Logout => Snapshot::default(),
    }
}

/// Independently persisted part of a [`Snapshot`]
#[derive(Debug, Clone, Copy)]
enum Slice {
    Cart,
    Favorites,
    UserInfo,
}

impl Slice {
    const ALL: [Slice; 3] = [Slice::Cart, Slice::Favorites, Slice::UserInfo];

    fn key(self) -> &'static str {
        match self {
            Slice::Cart => CART_KEY,
            Slice::Favorites => FAVORITES_KEY,
            Slice::UserInfo => USER_INFO_KEY,
        }
    }

    fn differs(self, a: &Snapshot, b: &Snapshot) -> bool {
        match self {
            Slice::Cart => a.cart != b.cart,
            Slice::Favorites => a.favorites != b.favorites,
            Slice::UserInfo => a.user_info != b.user_info,
        }
    }

    fn save<S: DurableStore>(self, backend: &S, snapshot: &Snapshot) -> StoreResult<()> {
        match self {
            Slice::Cart => save_json(backend, self.key(), &snapshot.cart),
            Slice::Favorites => save_json(backend, self.key(), &snapshot.favorites),
            Slice::UserInfo => save_json(backend, self.key(), &snapshot.user_info),
        }
    }
}

/// Reducer-driven store mirrored to a [`DurableStore`]
#[derive(Debug)]
pub struct Store<S: DurableStore> {
    backend: S,
    current: Arc<Snapshot>,
}

impl<S: DurableStore> Store<S> {
    /// Rehydrate the state from `backend`
    pub fn open(backend: S) -> StoreResult<Self> {
        let snapshot = Snapshot {
            cart: load_json(&backend, CART_KEY)?,
            favorites: load_json(&backend, FAVORITES_KEY)?,
            user_info: load_json(&backend, USER_INFO_KEY)?,
        };
        info!(
            "Store rehydrated: {} cart lines, {} favorites, signed in: {}",
            snapshot.cart.len(),
            snapshot.favorites.len(),
            snapshot.user_info.is_some()
        );

        Ok(Self {
            backend,
            current: Arc::new(snapshot),
        })
    }

    /// Apply `action`, persist, then publish.
    ///
    /// When persisting fails the published snapshot is left as it was.
    pub fn dispatch(&mut self, action: Action) -> StoreResult<Arc<Snapshot>> {
        let name = action.name();
        let next = reduce(&self.current, action);
        self.persist(&next)?;

        debug!("Dispatched {}", name);
        self.current = Arc::new(next);
        Ok(Arc::clone(&self.current))
    }

    /// Write every slice that differs from the published snapshot.
    ///
    /// If one write fails the slices already written are restored, so the
    /// durable store keeps matching the published snapshot.
    fn persist(&self, next: &Snapshot) -> StoreResult<()> {
        let mut written = Vec::with_capacity(Slice::ALL.len());
        for slice in Slice::ALL {
            if !slice.differs(&self.current, next) {
                continue;
            }
            if let Err(e) = slice.save(&self.backend, next) {
                self.restore(&written);
                return Err(e);
            }
            written.push(slice);
        }
        Ok(())
    }

    fn restore(&self, written: &[Slice]) {
        for slice in written {
            if let Err(e) = slice.save(&self.backend, &self.current) {
                warn!("Could not restore {} after a failed write: {}", slice.key(), e);
            }
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    pub fn state(&self) -> &Snapshot {
        &self.current
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.current.user_info.as_ref()
    }

    pub fn access(&self) -> Access {
        Access::of(self.session())
    }

    pub fn is_favorite(&self, product_id: Uuid) -> bool {
        self.current.favorites.iter().any(|p| p.id == product_id)
    }

    pub fn cart_count(&self) -> u64 {
        cart::item_count(&self.current.cart)
    }

    pub fn subtotal(&self) -> Decimal {
        cart::subtotal(&self.current.cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::persistence::{FileStore, MemoryStore};
    use crate::product::tests::sample_product;
    use crate::session::tests::session;
    use rust_decimal_macros::dec;

    /// Memory backend that can be told to fail writes to one key
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing_key: Arc<std::sync::Mutex<Option<&'static str>>>,
    }

    impl FlakyStore {
        fn fail_on(&self, key: &'static str) {
            *self.failing_key.lock().unwrap() = Some(key);
        }
    }

    impl DurableStore for FlakyStore {
        fn load(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.load(key)
        }

        fn save(&self, key: &str, value: &str) -> StoreResult<()> {
            if *self.failing_key.lock().unwrap() == Some(key) {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.save(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }
    }

    fn item(product: &Product, size: &str, quantity: u32) -> CartItem {
        CartItem::select(product.clone(), Some(size), Some("White"), quantity).unwrap()
    }

    #[test]
    fn favorite_add_is_idempotent() {
        let mut store = Store::open(MemoryStore::new()).unwrap();
        let product = sample_product(dec!(500));
        store.dispatch(Action::FavoriteAdd(product.clone())).unwrap();
        store.dispatch(Action::FavoriteAdd(product.clone())).unwrap();

        assert_eq!(store.state().favorites.len(), 1);
        assert!(store.is_favorite(product.id));

        store.dispatch(Action::FavoriteRemove(product.id)).unwrap();
        store.dispatch(Action::FavoriteRemove(product.id)).unwrap();
        assert!(store.state().favorites.is_empty());
    }

    #[test]
    fn set_quantity_zero_matches_remove() {
        let product = sample_product(dec!(500));
        let start = reduce(&Snapshot::default(), Action::CartAdd(item(&product, "M", 2)));
        let key = CartKey::new(product.id, "M", "White");

        assert_eq!(
            reduce(&start, Action::CartSetQuantity { key: key.clone(), quantity: 0 }),
            reduce(&start, Action::CartRemove(key))
        );
    }

    #[test]
    fn session_clear_keeps_cart_but_logout_clears_everything() {
        let product = sample_product(dec!(500));
        let signed_in = reduce(
            &reduce(&Snapshot::default(), Action::CartAdd(item(&product, "M", 1))),
            Action::SessionSet(session(false)),
        );

        let cleared = reduce(&signed_in, Action::SessionClear);
        assert!(cleared.user_info.is_none());
        assert_eq!(cleared.cart.len(), 1);

        assert_eq!(reduce(&signed_in, Action::Logout), Snapshot::default());
    }

    #[test]
    fn session_set_replaces_previous_session() {
        let mut store = Store::open(MemoryStore::new()).unwrap();
        store.dispatch(Action::SessionSet(session(false))).unwrap();
        assert_eq!(store.access(), Access::Customer);
        store.dispatch(Action::SessionSet(session(true))).unwrap();
        assert_eq!(store.access(), Access::Admin);
        store.dispatch(Action::SessionClear).unwrap();
        assert_eq!(store.access(), Access::Anonymous);
    }

    #[test]
    fn restart_rehydrates_identical_state() {
        let dir = tempfile::tempdir().unwrap();
        let product = sample_product(dec!(499.50));
        let other = sample_product(dec!(120));

        let before = {
            let mut store = Store::open(FileStore::new(dir.path())).unwrap();
            store.dispatch(Action::CartAdd(item(&product, "M", 2))).unwrap();
            store.dispatch(Action::CartAdd(item(&other, "L", 1))).unwrap();
            store.dispatch(Action::FavoriteAdd(other.clone())).unwrap();
            store.dispatch(Action::SessionSet(session(false))).unwrap();
            serde_json::to_string(store.state()).unwrap()
        };

        let restarted = Store::open(FileStore::new(dir.path())).unwrap();
        assert_eq!(serde_json::to_string(restarted.state()).unwrap(), before);
        assert_eq!(
            restarted.backend().load(CART_KEY).unwrap().unwrap(),
            serde_json::to_string(&restarted.state().cart).unwrap()
        );
        assert_eq!(restarted.subtotal(), dec!(1119.00));
        assert_eq!(restarted.cart_count(), 3);
    }

    #[test]
    fn untouched_slices_are_not_rewritten() {
        let backend = MemoryStore::new();
        let mut store = Store::open(backend.clone()).unwrap();
        store
            .dispatch(Action::FavoriteAdd(sample_product(dec!(1))))
            .unwrap();

        assert!(backend.load(FAVORITES_KEY).unwrap().is_some());
        assert!(backend.load(CART_KEY).unwrap().is_none());
        assert!(backend.load(USER_INFO_KEY).unwrap().is_none());
    }

    #[test]
    fn failed_persist_keeps_published_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("state");
        let mut store = Store::open(FileStore::new(&state_dir)).unwrap();

        // A regular file where the state directory should be
        std::fs::write(&state_dir, b"").unwrap();
        let result = store.dispatch(Action::CartAdd(item(&sample_product(dec!(5)), "M", 1)));

        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert!(store.state().cart.is_empty());
    }

    #[test]
    fn partial_write_failure_restores_earlier_slices() {
        let backend = FlakyStore::default();
        let mut store = Store::open(backend.clone()).unwrap();
        let product = sample_product(dec!(500));
        store.dispatch(Action::CartAdd(item(&product, "M", 1))).unwrap();
        store.dispatch(Action::FavoriteAdd(product.clone())).unwrap();
        store.dispatch(Action::SessionSet(session(false))).unwrap();

        backend.fail_on(FAVORITES_KEY);
        let result = store.dispatch(Action::Logout);

        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert_eq!(store.state().cart.len(), 1);

        let rehydrated = Store::open(backend.inner.clone()).unwrap();
        assert_eq!(rehydrated.state(), store.state());
    }
}
