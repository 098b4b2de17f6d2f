//! The shop facade.
//!
//! [`Shop`] owns the API client, the session, the cart and the navigator, and
//! is the only place that mutates any of them. Every credentialed response is
//! passed through [`Shop::settle`], which applies the auth-failure protocol:
//!
//! - **401 on a protected route**: end the session and go to the login
//!   screen. The login screen itself is exempt so there is no redirect loop.
//! - **401 anywhere else**: returned to the caller; the session is untouched.
//! - **403**: returned as a permission error; the session is untouched.
//! - **5xx**: returned with the server's message; not retried.

use chrono::Utc;
use secrecy::SecretString;
use tienda_core::{Cart, Category, Page, Product, ProductId, ProductSummary};
use tracing::{error, info, instrument, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::navigation::{AdminSection, Navigator, Route};
use crate::session::{BearerToken, Session, SessionError, SessionStorage, SessionStore};
use crate::views::{Screen, featured};

/// Client-side shop state.
#[derive(Debug)]
pub struct Shop<S> {
    api: ApiClient,
    session: SessionStore<S>,
    cart: Cart,
    nav: Navigator,
}

impl<S: SessionStorage> Shop<S> {
    /// A shop at the home page with an empty cart and no session. Call
    /// [`Shop::restore`] to pick up a persisted session.
    pub const fn new(api: ApiClient, storage: S) -> Self {
        Self {
            api,
            session: SessionStore::new(storage),
            cart: Cart::new(),
            nav: Navigator::new(),
        }
    }

    /// Adopt the persisted session if it is still valid.
    pub fn restore(&mut self) -> Option<&Session> {
        self.session.restore()
    }

    /// Log in and open the back-office dashboard.
    ///
    /// Login failures are not settled: a 401 here means bad credentials and
    /// goes straight back to the caller for display.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if authentication or persisting fails.
    pub async fn login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<&Session, SessionError> {
        let session = self.session.login(&self.api, email, password).await?;
        self.nav.go(Route::Admin(AdminSection::Dashboard));
        Ok(session)
    }

    /// End the session and show the login screen.
    pub fn logout(&mut self) {
        self.session.logout();
        self.nav.go(Route::AdminLogin);
    }

    /// Navigate to `path`.
    ///
    /// Entering a protected route without a valid session lands on the login
    /// screen instead. A session whose token expired since it was restored
    /// is dropped here.
    pub fn visit(&mut self, path: &str) -> &Route {
        let route = Route::parse(path);
        if route.is_protected() {
            self.session.expire_if_stale(Utc::now());
            if !self.session.is_active() {
                info!(path, "no session for admin route");
                return self.nav.go(Route::AdminLogin);
            }
        }
        self.nav.go(route)
    }

    /// Apply the auth-failure protocol to a response and hand it back.
    ///
    /// This is the one place failed requests are logged.
    pub fn settle<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match &result {
            Err(ApiError::Unauthorized { message }) => {
                if self.nav.is_protected() {
                    warn!(route = %self.nav.current(), message = ?message, "session rejected, logging out");
                    self.session.logout();
                    self.nav.redirect_to_login();
                } else {
                    info!(route = %self.nav.current(), "unauthorized on public route");
                }
            }
            Err(ApiError::Forbidden(message)) => {
                warn!(message, "permission denied");
            }
            Err(ApiError::Server { status, message }) => {
                error!(status = status.as_u16(), message, "server error");
            }
            Err(e) => warn!(error = %e, "request failed"),
            Ok(_) => {}
        }
        result
    }

    /// Settle `result` and store it in `screen` if the screen is still
    /// current. A 401 that redirects to login makes the screen stale.
    ///
    /// Returns `true` if the screen was updated.
    pub fn complete<T>(&mut self, screen: &mut Screen<T>, result: Result<T, ApiError>) -> bool {
        let result = self.settle(result);
        screen.apply(&self.nav, result)
    }

    /// All products, for `/productos`.
    #[instrument(skip(self))]
    pub async fn load_products(&mut self) -> Screen<Vec<ProductSummary>> {
        let mut screen = Screen::loading(&self.nav);
        let result = self.api.list_products(self.session.credential()).await;
        self.complete(&mut screen, result);
        screen
    }

    /// The home page's featured products.
    #[instrument(skip(self))]
    pub async fn load_featured(&mut self) -> Screen<Vec<ProductSummary>> {
        let mut screen = Screen::loading(&self.nav);
        let result = self
            .api
            .list_products(self.session.credential())
            .await
            .map(featured);
        self.complete(&mut screen, result);
        screen
    }

    /// One product, for `/producto/:id`.
    #[instrument(skip(self))]
    pub async fn load_product(&mut self, id: ProductId) -> Screen<Product> {
        let mut screen = Screen::loading(&self.nav);
        let result = self.api.get_product(id, self.session.credential()).await;
        self.complete(&mut screen, result);
        screen
    }

    #[instrument(skip(self))]
    pub async fn load_categories(&mut self) -> Screen<Vec<Category>> {
        let mut screen = Screen::loading(&self.nav);
        let result = self.api.list_categories(self.session.credential()).await;
        self.complete(&mut screen, result);
        screen
    }

    #[instrument(skip(self))]
    pub async fn load_pages(&mut self) -> Screen<Vec<Page>> {
        let mut screen = Screen::loading(&self.nav);
        let result = self.api.list_pages(self.session.credential()).await;
        self.complete(&mut screen, result);
        screen
    }

    #[instrument(skip(self))]
    pub async fn load_page(&mut self, slug: &str) -> Screen<Page> {
        let mut screen = Screen::loading(&self.nav);
        let result = self.api.get_page(slug, self.session.credential()).await;
        self.complete(&mut screen, result);
        screen
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// Credential to thread into an [`ApiClient`] call.
    #[must_use]
    pub fn credential(&self) -> Option<&BearerToken> {
        self.session.credential()
    }

    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.nav
    }

    #[must_use]
    pub const fn route(&self) -> &Route {
        self.nav.current()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }
}
