//! Carts service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::{
    database::Db,
    domain::{
        accounts::records::AccountUuid,
        carts::{
            errors::CartsServiceError,
            models::{Cart, CartLine, CartOwner, CartSummary},
            repository::PgCartItemsRepository,
        },
        products::{
            records::{ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
        sessions::{SessionKey, SessionStore},
    },
};

/// Session entry holding an anonymous visitor's cart.
pub const CART_SESSION_NAME: &str = "cart";

#[derive(Clone)]
pub struct PgCartsService {
    db: Db,
    sessions: Arc<dyn SessionStore>,
    items: PgCartItemsRepository,
    products: PgProductsRepository,
}

impl fmt::Debug for PgCartsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCartsService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            db,
            sessions,
            items: PgCartItemsRepository::new(),
            products: PgProductsRepository::new(),
        }
    }

    async fn load(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError> {
        match owner {
            CartOwner::Session(session) => self.load_session_cart(session).await,
            CartOwner::Account(account) => {
                let mut tx = self.db.begin_transaction().await?;

                let cart = self.items.get_cart(&mut tx, *account).await?;

                tx.commit().await?;

                Ok(cart)
            }
        }
    }

    async fn load_session_cart(&self, session: &SessionKey) -> Result<Cart, CartsServiceError> {
        let Some(value) = self.sessions.get(session, CART_SESSION_NAME).await? else {
            return Ok(Cart::new());
        };

        match Cart::from_value(value) {
            Ok(cart) => Ok(cart),
            Err(error) => {
                warn!(%session, %error, "discarding malformed session cart");

                Ok(Cart::new())
            }
        }
    }

    /// Persist `cart` for `owner` when it has unsaved changes.
    async fn save(&self, owner: &CartOwner, cart: &mut Cart) -> Result<(), CartsServiceError> {
        if !cart.is_modified() {
            return Ok(());
        }

        match owner {
            CartOwner::Session(session) => {
                self.sessions
                    .set(session, CART_SESSION_NAME, cart.to_value()?)
                    .await?;
            }
            CartOwner::Account(account) => {
                let mut tx = self.db.begin_transaction().await?;

                self.items.save_cart(&mut tx, *account, cart).await?;

                tx.commit().await?;
            }
        }

        cart.mark_saved();

        Ok(())
    }

    async fn catalog(
        &self,
        cart: &Cart,
    ) -> Result<FxHashMap<ProductUuid, ProductRecord>, CartsServiceError> {
        if cart.is_empty() {
            return Ok(FxHashMap::default());
        }

        let mut tx = self.db.begin_transaction().await?;

        let products = self
            .products
            .get_products(&mut tx, &cart.product_uuids())
            .await?;

        tx.commit().await?;

        Ok(products
            .into_iter()
            .map(|product| (product.uuid, product))
            .collect())
    }

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let product = self.products.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }
}

/// Refuse a changed line the product cannot currently supply.
fn check_stock(cart: &Cart, product: &ProductRecord) -> Result<(), CartsServiceError> {
    if !cart.is_modified() {
        return Ok(());
    }

    match cart.get(product.uuid) {
        Some(item) if !product.has_stock_for(item.quantity) => {
            debug!(product = %product.uuid, requested = item.quantity, "cart line exceeds stock");

            Err(CartsServiceError::InsufficientStock(product.uuid))
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError> {
        self.load(owner).await
    }

    async fn get_summary(&self, owner: &CartOwner) -> Result<CartSummary, CartsServiceError> {
        let cart = self.load(owner).await?;
        let catalog = self.catalog(&cart).await?;

        Ok(cart.summary(&catalog))
    }

    async fn get_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<Option<CartLine>, CartsServiceError> {
        let cart = self.load(owner).await?;

        if cart.get(product).is_none() {
            return Ok(None);
        }

        let catalog = self.catalog(&cart).await?;

        Ok(cart.line(product, &catalog))
    }

    async fn add_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: i64,
        override_quantity: bool,
    ) -> Result<Cart, CartsServiceError> {
        let product = self.get_product(product).await?;

        if !product.is_active {
            return Err(CartsServiceError::NotFound);
        }

        let mut cart = self.load(owner).await?;

        cart.add(&product, quantity, override_quantity);

        check_stock(&cart, &product)?;

        self.save(owner, &mut cart).await?;

        Ok(cart)
    }

    async fn remove_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError> {
        let mut cart = self.load(owner).await?;

        cart.remove(product);

        self.save(owner, &mut cart).await?;

        Ok(cart)
    }

    async fn update_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError> {
        let mut cart = self.load(owner).await?;

        if quantity <= 0 {
            cart.remove(product);
        } else {
            let product = self.get_product(product).await?;

            if !product.is_active && cart.get(product.uuid).is_none() {
                return Err(CartsServiceError::NotFound);
            }

            cart.update_quantity(&product, quantity);

            check_stock(&cart, &product)?;
        }

        self.save(owner, &mut cart).await?;

        Ok(cart)
    }

    async fn clear(&self, owner: &CartOwner) -> Result<(), CartsServiceError> {
        match owner {
            CartOwner::Session(_) => {
                let mut cart = Cart::new();

                cart.clear();

                self.save(owner, &mut cart).await
            }
            CartOwner::Account(account) => {
                let mut tx = self.db.begin_transaction().await?;

                self.items.clear_cart(&mut tx, *account).await?;

                tx.commit().await?;

                Ok(())
            }
        }
    }

    async fn merge(
        &self,
        session: &SessionKey,
        account: AccountUuid,
    ) -> Result<Cart, CartsServiceError> {
        let session_cart = self.load_session_cart(session).await?;

        let mut tx = self.db.begin_transaction().await?;

        let mut cart = self.items.get_cart(&mut tx, account).await?;

        if !session_cart.is_empty() {
            let known = self
                .products
                .get_products(&mut tx, &session_cart.product_uuids())
                .await?;

            let incoming = Cart::from_items(
                session_cart
                    .items()
                    .filter(|item| known.iter().any(|p| p.uuid == item.product_uuid))
                    .copied(),
            );

            cart.merge(&incoming);

            self.items.save_cart(&mut tx, account, &cart).await?;
        }

        tx.commit().await?;

        cart.mark_saved();

        if !session_cart.is_empty() {
            self.sessions.remove(session, CART_SESSION_NAME).await?;

            info!(%account, lines = session_cart.len(), "merged session cart into account cart");
        }

        Ok(cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Load the stored cart for `owner`; missing carts are empty.
    async fn get_cart(&self, owner: &CartOwner) -> Result<Cart, CartsServiceError>;

    /// Lines joined against the live catalog, with totals.
    async fn get_summary(&self, owner: &CartOwner) -> Result<CartSummary, CartsServiceError>;

    async fn get_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<Option<CartLine>, CartsServiceError>;

    /// Add units of an active product, capturing its current price on first add.
    async fn add_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: i64,
        override_quantity: bool,
    ) -> Result<Cart, CartsServiceError>;

    async fn remove_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Set a line's quantity; zero or less removes it.
    async fn update_quantity(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError>;

    async fn clear(&self, owner: &CartOwner) -> Result<(), CartsServiceError>;

    /// Move a visitor's session cart into an account cart and empty the session cart.
    async fn merge(
        &self,
        session: &SessionKey,
        account: AccountUuid,
    ) -> Result<Cart, CartsServiceError>;
}
