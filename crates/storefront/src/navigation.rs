//! Client-side routing state.
//!
//! The [`Navigator`] tracks where the user is. Every navigation bumps a
//! generation counter; screens capture it in a [`ViewTicket`] when they start
//! loading and results that come back under an older generation are dropped.

use std::fmt;

use tienda_core::ProductId;
use tracing::{debug, info};

/// Path of the login screen; the only `/admin` path that is not protected.
pub const LOGIN_PATH: &str = "/admin/login";

/// A section of the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    Dashboard,
    Products,
    Categories,
    Pages,
}

impl AdminSection {
    const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/admin",
            Self::Products => "/admin/productos",
            Self::Categories => "/admin/categorias",
            Self::Pages => "/admin/paginas",
        }
    }
}

/// A resolved storefront location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Products,
    Product(ProductId),
    Cart,
    Page(String),
    AdminLogin,
    Admin(AdminSection),
}

impl Route {
    /// Resolve a path. Anything unrecognised resolves to [`Route::Home`],
    /// including a non-numeric product id. Unknown sections under `/admin/`
    /// resolve to the dashboard.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["productos"] => Self::Products,
            ["producto", id] => id.parse().map_or(Self::Home, Self::Product),
            ["carrito"] => Self::Cart,
            ["paginas", slug] => Self::Page((*slug).to_string()),
            ["admin", "login"] => Self::AdminLogin,
            ["admin"] => Self::Admin(AdminSection::Dashboard),
            ["admin", "productos", ..] => Self::Admin(AdminSection::Products),
            ["admin", "categorias", ..] => Self::Admin(AdminSection::Categories),
            ["admin", "paginas", ..] => Self::Admin(AdminSection::Pages),
            ["admin", ..] => Self::Admin(AdminSection::Dashboard),
            _ => Self::Home,
        }
    }

    /// Canonical path for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Products => "/productos".to_string(),
            Self::Product(id) => format!("/producto/{id}"),
            Self::Cart => "/carrito".to_string(),
            Self::Page(slug) => format!("/paginas/{slug}"),
            Self::AdminLogin => LOGIN_PATH.to_string(),
            Self::Admin(section) => section.path().to_string(),
        }
    }

    /// `true` for back-office routes other than the login screen.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::Admin(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Proof that a load was started under a particular navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTicket {
    generation: u64,
}

/// Current location plus a navigation counter.
#[derive(Debug)]
pub struct Navigator {
    route: Route,
    generation: u64,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    /// Start at the home page.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            route: Route::Home,
            generation: 0,
        }
    }

    #[must_use]
    pub const fn current(&self) -> &Route {
        &self.route
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Go to `path`. Always counts as a navigation, even to the same route.
    pub fn navigate(&mut self, path: &str) -> &Route {
        self.go(Route::parse(path))
    }

    /// Go to an already-resolved route.
    pub fn go(&mut self, route: Route) -> &Route {
        self.generation = self.generation.wrapping_add(1);
        debug!(from = %self.route, to = %route, generation = self.generation, "navigate");
        self.route = route;
        &self.route
    }

    #[must_use]
    pub const fn is_protected(&self) -> bool {
        self.route.is_protected()
    }

    /// Force the login screen. Does nothing if it is already showing.
    ///
    /// Returns `true` when a navigation happened.
    pub fn redirect_to_login(&mut self) -> bool {
        if self.route == Route::AdminLogin {
            return false;
        }
        info!(from = %self.route, "redirecting to login");
        self.go(Route::AdminLogin);
        true
    }

    /// Ticket for a load started now.
    #[must_use]
    pub const fn ticket(&self) -> ViewTicket {
        ViewTicket {
            generation: self.generation,
        }
    }

    /// `true` if no navigation happened since `ticket` was issued.
    #[must_use]
    pub const fn is_current(&self, ticket: ViewTicket) -> bool {
        ticket.generation == self.generation
    }
}
