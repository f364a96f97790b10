//! Storefront landing view and cart.

use bazaar_core::{Category, CategoryFields, Price, Product, ProductFields, ProductId};
use tracing::instrument;

use crate::error::ConsoleError;
use crate::notify::Notifications;
use crate::resource::Collection;
use crate::session::Session;

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Products picked by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `product`. Returns the new quantity of that product.
    ///
    /// A product without a price is added at zero.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }
        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.fields.name.clone(),
            unit_price: product.fields.price.unwrap_or(Price::ZERO),
            quantity: 1,
        });
        1
    }

    /// Drop a product entirely. Returns whether it was in the cart.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product_id != id);
        self.lines.len() != before
    }

    /// Quantity of one product.
    #[must_use]
    pub fn quantity(&self, id: &ProductId) -> u32 {
        self.lines
            .iter()
            .find(|l| &l.product_id == id)
            .map_or(0, |l| l.quantity)
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines
            .iter()
            .fold(Price::ZERO, |sum, line| sum + line.total())
    }

    /// Lines in the order products were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The landing page: categories, products and the shopper's cart.
#[derive(Debug)]
pub struct Storefront<P, K> {
    products_client: P,
    categories_client: K,
    products: Vec<Product>,
    categories: Vec<Category>,
    cart: Cart,
    notifications: Notifications,
}

impl<P, K> Storefront<P, K>
where
    P: Collection<ProductFields>,
    K: Collection<CategoryFields>,
{
    /// Storefront over the two catalog collections.
    #[must_use]
    pub const fn new(products: P, categories: K, notifications: Notifications) -> Self {
        Self {
            products_client: products,
            categories_client: categories,
            products: Vec::new(),
            categories: Vec::new(),
            cart: Cart::new(),
            notifications,
        }
    }

    /// Fetch categories and products concurrently.
    ///
    /// A collection that fails to load is logged and shown empty; the other
    /// one still renders.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let (categories, products) =
            tokio::join!(self.categories_client.list(), self.products_client.list());

        self.categories = categories.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to load categories");
            Vec::new()
        });
        self.products = products.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to load products");
            Vec::new()
        });
        tracing::debug!(
            categories = self.categories.len(),
            products = self.products.len(),
            "Storefront loaded"
        );
    }

    /// Put one unit of `product` in the cart.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::LoginRequired` when nobody is logged in; the
    /// cart is unchanged and a warning is shown.
    pub fn add_to_cart(
        &mut self,
        session: &Session,
        product: &Product,
    ) -> Result<u32, ConsoleError> {
        if !session.is_logged_in() {
            let error = ConsoleError::LoginRequired;
            tracing::warn!(product = %product.id, "Add to cart without login");
            self.notifications.warning(error.user_message(""));
            return Err(error);
        }

        let quantity = self.cart.add(product);
        tracing::info!(product = %product.id, quantity, "Added to cart");
        self.notifications
            .success(format!("{} added to cart!", product.fields.name));
        Ok(quantity)
    }

    /// Products currently displayed.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products in one category.
    pub fn products_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |p| p.fields.category == category)
    }

    /// Categories currently displayed.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The shopper's cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The view's notification slot.
    #[must_use]
    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }
}
