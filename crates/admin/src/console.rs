//! The back-office entry point.

use tienda_core::{Category, CategoryId, Page, Product, ProductId, ProductSummary};
use tienda_storefront::navigation::AdminSection;
use tienda_storefront::session::SessionStorage;
use tienda_storefront::{BearerToken, Route, Shop};
use tracing::instrument;

use crate::api::AdminApi;
use crate::error::AdminError;
use crate::form::{CategoryForm, ProductForm};
use crate::stats::DashboardStats;

/// Back-office operations for a logged-in user.
///
/// Each operation first navigates to its admin section, so a 401 from the
/// server ends the session and redirects to login through
/// [`Shop::settle`]. The console borrows the shop mutably for its lifetime.
pub struct AdminConsole<'a, S> {
    shop: &'a mut Shop<S>,
    admin: AdminApi,
}

impl<'a, S: SessionStorage> AdminConsole<'a, S> {
    /// Open the console on the dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotLoggedIn`] without an active session; the
    /// shop is left on the login screen.
    pub fn open(shop: &'a mut Shop<S>) -> Result<Self, AdminError> {
        let admin = AdminApi::new(shop.api().clone());
        let mut console = Self { shop, admin };
        console.enter(AdminSection::Dashboard)?;
        Ok(console)
    }

    /// Fetch products, categories and pages concurrently and total them.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] if any of the three lists fails to load.
    #[instrument(skip(self))]
    pub async fn dashboard(&mut self) -> Result<DashboardStats, AdminError> {
        let token = self.enter(AdminSection::Dashboard)?;
        let api = self.shop.api().clone();

        let (products, categories, pages) = tokio::join!(
            api.list_products(Some(&token)),
            api.list_categories(Some(&token)),
            api.list_pages(Some(&token)),
        );
        let products = self.shop.settle(products)?;
        let categories = self.shop.settle(categories)?;
        let pages = self.shop.settle(pages)?;

        Ok(DashboardStats::compute(&products, &categories, &pages))
    }

    /// # Errors
    ///
    /// Returns [`AdminError`] if the list cannot be loaded.
    pub async fn products(&mut self) -> Result<Vec<ProductSummary>, AdminError> {
        let token = self.enter(AdminSection::Products)?;
        let result = self.shop.api().list_products(Some(&token)).await;
        Ok(self.shop.settle(result)?)
    }

    /// Full product detail, e.g. to open it in a [`ProductForm`].
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] if the product cannot be loaded.
    pub async fn product(&mut self, id: ProductId) -> Result<Product, AdminError> {
        let token = self.enter(AdminSection::Products)?;
        let result = self.shop.api().get_product(id, Some(&token)).await;
        Ok(self.shop.settle(result)?)
    }

    /// Create or update a product depending on how the form was opened.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Form`] without sending anything if the form is
    /// invalid, otherwise any API failure.
    #[instrument(skip(self, form), fields(editing = ?form.editing_id()))]
    pub async fn save_product(&mut self, form: &ProductForm) -> Result<(), AdminError> {
        form.validate()?;
        let token = self.enter(AdminSection::Products)?;
        let result = match form.editing_id() {
            Some(id) => self.admin.update_product(id, form, &token).await,
            None => self.admin.create_product(form, &token).await,
        };
        Ok(self.shop.settle(result)?)
    }

    /// # Errors
    ///
    /// Returns [`AdminError`] if the delete fails.
    pub async fn delete_product(&mut self, id: ProductId) -> Result<(), AdminError> {
        let token = self.enter(AdminSection::Products)?;
        let result = self.admin.delete_product(id, &token).await;
        Ok(self.shop.settle(result)?)
    }

    /// # Errors
    ///
    /// Returns [`AdminError`] if the list cannot be loaded.
    pub async fn categories(&mut self) -> Result<Vec<Category>, AdminError> {
        let token = self.enter(AdminSection::Categories)?;
        let result = self.shop.api().list_categories(Some(&token)).await;
        Ok(self.shop.settle(result)?)
    }

    /// # Errors
    ///
    /// Returns [`AdminError`] if the category cannot be loaded.
    pub async fn category(&mut self, id: CategoryId) -> Result<Category, AdminError> {
        let token = self.enter(AdminSection::Categories)?;
        let result = self.shop.api().get_category(id, Some(&token)).await;
        Ok(self.shop.settle(result)?)
    }

    /// Create or update a category depending on how the form was opened.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Form`] without sending anything if the form is
    /// invalid, otherwise any API failure.
    #[instrument(skip(self, form), fields(editing = ?form.editing_id()))]
    pub async fn save_category(&mut self, form: &CategoryForm) -> Result<(), AdminError> {
        form.validate()?;
        let token = self.enter(AdminSection::Categories)?;
        let result = match form.editing_id() {
            Some(id) => self.admin.update_category(id, form, &token).await,
            None => self.admin.create_category(form, &token).await,
        };
        Ok(self.shop.settle(result)?)
    }

    /// # Errors
    ///
    /// Returns [`AdminError`] if the delete fails.
    pub async fn delete_category(&mut self, id: CategoryId) -> Result<(), AdminError> {
        let token = self.enter(AdminSection::Categories)?;
        let result = self.admin.delete_category(id, &token).await;
        Ok(self.shop.settle(result)?)
    }

    /// # Errors
    ///
    /// Returns [`AdminError`] if the list cannot be loaded.
    pub async fn pages(&mut self) -> Result<Vec<Page>, AdminError> {
        let token = self.enter(AdminSection::Pages)?;
        let result = self.shop.api().list_pages(Some(&token)).await;
        Ok(self.shop.settle(result)?)
    }

    /// Navigate to `section` and return the credential to use there.
    fn enter(&mut self, section: AdminSection) -> Result<BearerToken, AdminError> {
        let route = Route::Admin(section);
        if self.shop.visit(&route.path()) != &route {
            return Err(AdminError::NotLoggedIn);
        }
        self.shop.credential().cloned().ok_or(AdminError::NotLoggedIn)
    }
}
