//! Command implementations.
//!
//! Each command works against a [`Shop`] whose session was restored from the
//! state directory, so a login in one invocation carries over to the next.

pub mod admin;
pub mod catalog;
pub mod output;
pub mod quote;
pub mod session;

use thiserror::Error;
use tienda_admin::AdminError;
use tienda_storefront::session::FileStorage;
use tienda_storefront::{ApiClient, ApiError, ClientConfig, Loadable, Screen, SessionError, Shop};

/// The shop type every command runs against.
pub type CliShop = Shop<FileStorage>;

const LOGIN_HINT: &str = "session expired, run `tienda login`";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("login failed: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A screen failed to load; carries the logged failure message.
    #[error("could not load {what}: {message}")]
    Load { what: &'static str, message: String },
}

impl CommandError {
    /// What the user can do about this error, if anything obvious.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Admin(e) if e.needs_login() => Some(LOGIN_HINT),
            _ => None,
        }
    }
}

/// Build the shop and pick up any persisted session.
///
/// # Errors
///
/// Returns [`CommandError::Api`] if the HTTP client cannot be built.
pub fn open_shop(config: &ClientConfig) -> Result<CliShop, CommandError> {
    let api = ApiClient::new(config)?;
    let mut shop = Shop::new(api, FileStorage::new(config.session_file()));
    shop.restore();
    Ok(shop)
}

/// Unwrap a loaded screen.
fn ready<T>(screen: Screen<T>, what: &'static str) -> Result<T, CommandError> {
    match screen.into_state() {
        Loadable::Ready(value) => Ok(value),
        Loadable::Failed(message) => Err(CommandError::Load { what, message }),
        Loadable::Loading => Err(CommandError::Load {
            what,
            message: "request was superseded".to_string(),
        }),
    }
}
