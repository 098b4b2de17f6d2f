//! Screen state the view layer renders.

use tienda_core::ProductSummary;
use tracing::debug;

use crate::error::ApiError;
use crate::navigation::{Navigator, ViewTicket};

/// Number of products shown on the home page.
pub const FEATURED_COUNT: usize = 8;

/// Where a screen's data stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    /// The fetch failed; views render this as empty.
    Failed(String),
}

impl<T> Loadable<T> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn into_ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }
}

/// A screen's data plus the navigation it was requested under.
#[derive(Debug, Clone)]
pub struct Screen<T> {
    ticket: ViewTicket,
    state: Loadable<T>,
}

impl<T> Screen<T> {
    /// A screen that starts loading under the navigator's current
    /// navigation.
    #[must_use]
    pub const fn loading(nav: &Navigator) -> Self {
        Self {
            ticket: nav.ticket(),
            state: Loadable::Loading,
        }
    }

    #[must_use]
    pub const fn ticket(&self) -> ViewTicket {
        self.ticket
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<T> {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> Loadable<T> {
        self.state
    }

    /// Store a fetch result if the user is still on the screen that asked for
    /// it. Returns `false` when the result was dropped as stale.
    ///
    /// Errors leave the screen in [`Loadable::Failed`]. They are reported by
    /// [`crate::shop::Shop::settle`], not here.
    pub fn apply(&mut self, nav: &Navigator, result: Result<T, ApiError>) -> bool {
        if !nav.is_current(self.ticket) {
            debug!("navigated away, dropping stale result");
            return false;
        }

        self.state = match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => {
                debug!(error = %e, "screen failed to load");
                Loadable::Failed(e.to_string())
            }
        };
        true
    }
}

/// The products shown on the home page: the first [`FEATURED_COUNT`].
#[must_use]
pub fn featured(mut products: Vec<ProductSummary>) -> Vec<ProductSummary> {
    products.truncate(FEATURED_COUNT);
    products
}
