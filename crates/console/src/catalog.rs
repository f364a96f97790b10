//! Product and category management.
//!
//! Products reference categories by name, so the product form validates
//! against whatever categories are currently listed. Every change to the
//! category list refreshes that check.

use bazaar_core::{CategoryField, CategoryFields, CategoryId, ProductField, ProductFields, ProductId};

use crate::confirm::Confirmer;
use crate::controller::{CrudController, Outcome};
use crate::error::ConsoleError;
use crate::notify::Notifications;
use crate::resource::Collection;
use crate::validation::{DraftCheck, KnownCategories};

/// Product and category views of the admin console.
#[derive(Debug)]
pub struct CatalogConsole<P, K> {
    products: CrudController<ProductFields, P>,
    categories: CrudController<CategoryFields, K>,
}

impl<P, K> CatalogConsole<P, K>
where
    P: Collection<ProductFields>,
    K: Collection<CategoryFields>,
{
    /// Console over the two collection clients.
    #[must_use]
    pub fn new(products: P, categories: K, notifications: &Notifications) -> Self {
        Self {
            products: CrudController::new(products, notifications.clone()),
            categories: CrudController::new(categories, notifications.clone()),
        }
    }

    /// Load categories, then products.
    ///
    /// # Errors
    ///
    /// Returns the first listing failure.
    pub async fn mount(&mut self) -> Result<(), ConsoleError> {
        self.categories.mount().await?;
        self.refresh_known_categories();
        self.products.mount().await
    }

    /// Load only the categories.
    ///
    /// # Errors
    ///
    /// Returns the listing failure.
    pub async fn mount_categories(&mut self) -> Result<(), ConsoleError> {
        self.categories.mount().await?;
        self.refresh_known_categories();
        Ok(())
    }

    fn refresh_known_categories(&mut self) {
        let known = KnownCategories::capture(self.categories.list().items());
        let checks: Vec<Box<dyn DraftCheck<ProductFields>>> = vec![Box::new(known)];
        self.products.set_checks(checks);
    }

    /// Open a new product form.
    pub fn open_product_create(&mut self) {
        self.products.open_create();
    }

    /// Open the edit form for listed product `id`.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::NotFound` if the product is not listed.
    pub fn open_product_edit(&mut self, id: &ProductId) -> Result<(), ConsoleError> {
        self.products.open_edit(id)
    }

    /// Apply raw input to one product draft field.
    ///
    /// # Errors
    ///
    /// See [`CrudController::edit_field`].
    pub fn edit_product(&mut self, field: ProductField, raw: &str) -> Result<(), ConsoleError> {
        self.products.edit_field(field, raw)
    }

    /// Submit the product form.
    ///
    /// # Errors
    ///
    /// See [`CrudController::submit`].
    pub async fn submit_product<C>(
        &mut self,
        confirmer: &mut C,
    ) -> Result<Outcome<ProductFields>, ConsoleError>
    where
        C: Confirmer + ?Sized,
    {
        self.products.submit(confirmer).await
    }

    /// Delete product `id` after confirmation.
    ///
    /// # Errors
    ///
    /// See [`CrudController::delete`].
    pub async fn delete_product<C>(
        &mut self,
        id: &ProductId,
        confirmer: &mut C,
    ) -> Result<Outcome<ProductFields>, ConsoleError>
    where
        C: Confirmer + ?Sized,
    {
        self.products.delete(id, confirmer).await
    }

    /// Open a new category form.
    pub fn open_category_create(&mut self) {
        self.categories.open_create();
    }

    /// Open the edit form for listed category `id`.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::NotFound` if the category is not listed.
    pub fn open_category_edit(&mut self, id: &CategoryId) -> Result<(), ConsoleError> {
        self.categories.open_edit(id)
    }

    /// Apply raw input to one category draft field.
    ///
    /// # Errors
    ///
    /// See [`CrudController::edit_field`].
    pub fn edit_category(&mut self, field: CategoryField, raw: &str) -> Result<(), ConsoleError> {
        self.categories.edit_field(field, raw)
    }

    /// Submit the category form and refresh the product category check.
    ///
    /// # Errors
    ///
    /// See [`CrudController::submit`].
    pub async fn submit_category<C>(
        &mut self,
        confirmer: &mut C,
    ) -> Result<Outcome<CategoryFields>, ConsoleError>
    where
        C: Confirmer + ?Sized,
    {
        let outcome = self.categories.submit(confirmer).await?;
        self.refresh_known_categories();
        Ok(outcome)
    }

    /// Delete category `id` after confirmation and refresh the product check.
    ///
    /// # Errors
    ///
    /// See [`CrudController::delete`].
    pub async fn delete_category<C>(
        &mut self,
        id: &CategoryId,
        confirmer: &mut C,
    ) -> Result<Outcome<CategoryFields>, ConsoleError>
    where
        C: Confirmer + ?Sized,
    {
        let outcome = self.categories.delete(id, confirmer).await?;
        self.refresh_known_categories();
        Ok(outcome)
    }

    /// Product view state.
    #[must_use]
    pub const fn products(&self) -> &CrudController<ProductFields, P> {
        &self.products
    }

    /// Category view state.
    #[must_use]
    pub const fn categories(&self) -> &CrudController<CategoryFields, K> {
        &self.categories
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::{Matcher, Server, ServerGuard};
    use url::Url;

    use super::*;
    use crate::confirm::AutoConfirm;
    use crate::error::ValidationError;
    use crate::resource::ResourceClient;

    type Catalog = CatalogConsole<ResourceClient<ProductFields>, ResourceClient<CategoryFields>>;

    fn catalog(server: &ServerGuard) -> Catalog {
        let origin = Url::parse(&server.url()).unwrap();
        let http = reqwest::Client::new();
        CatalogConsole::new(
            ResourceClient::new(http.clone(), &origin).unwrap(),
            ResourceClient::new(http, &origin).unwrap(),
            &Notifications::default(),
        )
    }

    async fn mounted(server: &mut ServerGuard) -> Catalog {
        server
            .mock("GET", "/categories")
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1,"name":"Shoes","image":"/img/shoes.png"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/products")
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":10,"name":"Runner","price":"49.99","category":"Shoes","brand":"Fleet","description":"Road shoe","image":"/img/runner.png"}]"#,
            )
            .create_async()
            .await;
        let mut catalog = catalog(server);
        catalog.mount().await.unwrap();
        catalog
    }

    fn fill_cap(catalog: &mut Catalog) {
        catalog.edit_product(ProductField::Name, "Cap").unwrap();
        catalog.edit_product(ProductField::Price, "12.50").unwrap();
        catalog.edit_product(ProductField::Brand, "Crown").unwrap();
        catalog.edit_product(ProductField::Description, "Wool cap").unwrap();
        catalog.edit_product(ProductField::Category, "Hats").unwrap();
        catalog.edit_product(ProductField::Image, "/img/cap.png").unwrap();
    }

    #[tokio::test]
    async fn test_mount_loads_both_lists() {
        let mut server = Server::new_async().await;
        let catalog = mounted(&mut server).await;

        assert_eq!(catalog.categories().list().len(), 1);
        let runner = &catalog.products().list().items()[0];
        assert_eq!(runner.fields.price.map(|p| p.to_string()), Some("49.99".to_owned()));
        assert_eq!(runner.fields.image.primary(), Some("/img/runner.png"));
    }

    #[tokio::test]
    async fn test_product_needs_known_category() {
        let mut server = Server::new_async().await;
        let mut catalog = mounted(&mut server).await;
        let post = server
            .mock("POST", "/products")
            .expect(0)
            .create_async()
            .await;

        catalog.open_product_create();
        fill_cap(&mut catalog);
        let err = catalog.submit_product(&mut AutoConfirm).await.unwrap_err();

        post.assert_async().await;
        assert!(matches!(
            err,
            ConsoleError::Validation(ValidationError::UnknownCategory(ref c)) if c == "Hats"
        ));
    }

    #[tokio::test]
    async fn test_new_category_unlocks_products() {
        let mut server = Server::new_async().await;
        let mut catalog = mounted(&mut server).await;
        server
            .mock("POST", "/categories")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":2,"name":"Hats","image":"/img/hats.png"}"#)
            .create_async()
            .await;
        let post = server
            .mock("POST", "/products")
            .match_body(Matcher::PartialJson(serde_json::json!({"category": "Hats", "price": 12.5})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":11,"name":"Cap","price":12.5,"category":"Hats","brand":"Crown","description":"Wool cap","image":["/img/cap.png"]}"#)
            .expect(1)
            .create_async()
            .await;

        catalog.open_category_create();
        catalog.edit_category(CategoryField::Name, "Hats").unwrap();
        catalog.edit_category(CategoryField::Image, "/img/hats.png").unwrap();
        catalog.submit_category(&mut AutoConfirm).await.unwrap();

        catalog.open_product_create();
        fill_cap(&mut catalog);
        let outcome = catalog.submit_product(&mut AutoConfirm).await.unwrap();

        post.assert_async().await;
        assert!(matches!(outcome, Outcome::Created(ref r) if r.id == ProductId::from(11)));
        assert_eq!(catalog.products().list().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_price_input_rejected() {
        let mut server = Server::new_async().await;
        let mut catalog = mounted(&mut server).await;

        catalog.open_product_edit(&ProductId::from(10)).unwrap();
        assert!(matches!(
            catalog.edit_product(ProductField::Price, "cheap"),
            Err(ConsoleError::Field(_))
        ));
        assert_eq!(
            catalog.products().form().draft().price.map(|p| p.to_string()),
            Some("49.99".to_owned())
        );
    }

    #[tokio::test]
    async fn test_new_product_needs_images() {
        let mut server = Server::new_async().await;
        let mut catalog = mounted(&mut server).await;
        let post = server
            .mock("POST", "/products")
            .expect(0)
            .create_async()
            .await;

        catalog.open_product_create();
        catalog.edit_product(ProductField::Name, "Trail").unwrap();
        catalog.edit_product(ProductField::Price, "79").unwrap();
        catalog.edit_product(ProductField::Brand, "Fleet").unwrap();
        catalog.edit_product(ProductField::Description, "Grippy").unwrap();
        catalog.edit_product(ProductField::Category, "Shoes").unwrap();
        let err = catalog.submit_product(&mut AutoConfirm).await.unwrap_err();

        post.assert_async().await;
        assert!(matches!(
            err,
            ConsoleError::Validation(ValidationError::MissingField(ref f)) if f == "image"
        ));
    }
}
