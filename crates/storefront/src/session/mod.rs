//! Bearer-token session store.
//!
//! A [`Session`] exists only while its token's `exp` lies in the future. The
//! store keeps the active session in memory and mirrors it into a
//! [`SessionStorage`] under the `token` and `user` keys so it survives
//! restarts.
//!
//! # Lifecycle
//!
//! - [`SessionStore::restore`] at startup adopts a persisted, unexpired
//!   session, or purges storage if the token is expired or unreadable.
//! - [`SessionStore::login`] authenticates and persists.
//! - [`SessionStore::logout`] clears memory and storage; it is also how the
//!   shop drops a session the server has rejected.

pub mod storage;
pub mod token;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError, keys};
pub use token::{BearerToken, TokenError};

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use thiserror::Error;
use tienda_core::{Email, EmailError, User};
use tracing::{debug, info, instrument, warn};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Errors surfaced by [`SessionStore::login`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The email could not be an address; no request was sent.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The login request failed (bad credentials arrive as `Unauthorized`).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server answered with a token whose expiry cannot be read.
    #[error("server issued an unusable token: {0}")]
    InvalidToken(#[from] TokenError),

    /// The session could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    token: BearerToken,
    user: User,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session, reading the expiry out of the token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the token carries no readable `exp`.
    pub fn new(token: BearerToken, user: User) -> Result<Self, TokenError> {
        let expires_at = token.expiry()?;
        Ok(Self {
            token,
            user,
            expires_at,
        })
    }

    #[must_use]
    pub const fn token(&self) -> &BearerToken {
        &self.token
    }

    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Strictly `exp > now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Holds the active session and keeps durable storage in step with it.
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    current: Option<Session>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// A store with no active session. Call [`SessionStore::restore`] to pick
    /// up a persisted one.
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            current: None,
        }
    }

    /// Adopt the persisted session if it is still valid, using the system
    /// clock.
    pub fn restore(&mut self) -> Option<&Session> {
        self.restore_at(Utc::now())
    }

    /// Adopt the persisted session if its token expires after `now`.
    ///
    /// Expired tokens, unreadable tokens, unreadable users and unreadable
    /// storage all purge the persisted state; none of them is reported as an
    /// error. When only one
    /// of the two keys is present nothing is adopted and nothing is purged.
    #[instrument(skip(self))]
    pub fn restore_at(&mut self, now: DateTime<Utc>) -> Option<&Session> {
        self.current = None;

        let (token, user) = match (self.storage.get(keys::TOKEN), self.storage.get(keys::USER)) {
            (Ok(Some(token)), Ok(Some(user))) => (token, user),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "session storage unreadable, purging");
                self.purge();
                return None;
            }
            _ => {
                debug!("no persisted session");
                return None;
            }
        };

        match Self::revive(token, &user) {
            Ok(session) if session.is_valid_at(now) => {
                info!(user_id = %session.user.id, expires_at = %session.expires_at, "session restored");
                self.current = Some(session);
            }
            Ok(session) => {
                info!(expired_at = %session.expires_at, "persisted session expired, purging");
                self.purge();
            }
            Err(reason) => {
                debug!(%reason, "persisted session unreadable, purging");
                self.purge();
            }
        }

        self.current.as_ref()
    }

    /// Authenticate against `POST /api/login` and adopt the returned session.
    ///
    /// A single attempt: failures are returned to the caller as-is and leave
    /// both memory and storage untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the email is malformed, the request fails
    /// or is rejected, the returned token has no readable expiry, or the
    /// session cannot be persisted.
    #[instrument(skip(self, api, password), fields(email = %email))]
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &SecretString,
    ) -> Result<&Session, SessionError> {
        let email = Email::parse(email)?;
        let response = api.login(&email, password).await?;
        let session = Session::new(BearerToken::new(response.token), response.user)?;
        self.adopt(session)
    }

    /// Make `session` the active one and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if persisting fails; the previous
    /// state is then left in memory and in storage.
    pub fn adopt(&mut self, session: Session) -> Result<&Session, SessionError> {
        let user_json = serde_json::to_string(&session.user).map_err(StorageError::from)?;
        self.storage.set_all(&[
            (keys::TOKEN, session.token.expose()),
            (keys::USER, user_json.as_str()),
        ])?;

        info!(user_id = %session.user.id, expires_at = %session.expires_at, "session started");
        Ok(self.current.insert(session))
    }

    /// End the session and purge persisted state. Safe to call repeatedly.
    pub fn logout(&mut self) {
        if let Some(session) = self.current.take() {
            info!(user_id = %session.user.id, "session ended");
        }
        self.purge();
    }

    /// Drop the active session if its token has expired by `now`.
    ///
    /// Returns `true` when a session was dropped.
    pub fn expire_if_stale(&mut self, now: DateTime<Utc>) -> bool {
        match &self.current {
            Some(session) if !session.is_valid_at(now) => {
                info!(expired_at = %session.expires_at, "session expired");
                self.logout();
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub const fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Credential to attach to outbound requests, if a session is active.
    #[must_use]
    pub fn credential(&self) -> Option<&BearerToken> {
        self.current.as_ref().map(Session::token)
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn revive(token: String, user: &str) -> Result<Session, String> {
        let user: User = serde_json::from_str(user).map_err(|e| e.to_string())?;
        Session::new(BearerToken::new(token), user).map_err(|e| e.to_string())
    }

    fn purge(&mut self) {
        for key in [keys::TOKEN, keys::USER] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "failed to purge session storage");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;
    use tienda_core::UserId;

    use super::*;

    fn token_expiring_at(exp: DateTime<Utc>) -> String {
        encode(
            &Header::default(),
            &json!({"id": 7, "email": "admin@tienda.com", "exp": exp.timestamp()}),
            &EncodingKey::from_secret(b"server-only"),
        )
        .unwrap()
    }

    fn admin() -> User {
        User {
            id: UserId::new(7),
            email: Email::parse("admin@tienda.com").unwrap(),
        }
    }

    fn persisted(token: &str, user: &str) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        storage.set(keys::TOKEN, token).unwrap();
        storage.set(keys::USER, user).unwrap();
        storage
    }

    fn user_json() -> String {
        serde_json::to_string(&admin()).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_800_000_000, 250_000_000).unwrap()
    }

    #[test]
    fn test_restore_token_expired_one_second_ago() {
        let token = token_expiring_at(now() - Duration::seconds(1));
        let mut store = SessionStore::new(persisted(&token, &user_json()));

        assert!(store.restore_at(now()).is_none());
        assert!(!store.is_active());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_restore_token_valid_for_an_hour() {
        let token = token_expiring_at(now() + Duration::hours(1));
        let mut store = SessionStore::new(persisted(&token, &user_json()));

        let session = store.restore_at(now()).unwrap();
        assert_eq!(session.user(), &admin());
        assert_eq!(store.credential().map(BearerToken::expose), Some(token.as_str()));
        assert!(!store.storage().is_empty());
    }

    #[test]
    fn test_restore_exp_equal_to_now_is_expired() {
        let exact = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
        let token = token_expiring_at(exact);
        let mut store = SessionStore::new(persisted(&token, &user_json()));

        assert!(store.restore_at(exact).is_none());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_restore_malformed_token_purges_silently() {
        let mut store = SessionStore::new(persisted("definitely.not.jwt", &user_json()));
        assert!(store.restore_at(now()).is_none());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_restore_malformed_user_purges() {
        let token = token_expiring_at(now() + Duration::hours(1));
        let mut store = SessionStore::new(persisted(&token, "{not json"));
        assert!(store.restore_at(now()).is_none());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_restore_with_only_token_leaves_storage() {
        let mut storage = MemoryStorage::new();
        storage.set(keys::TOKEN, "whatever").unwrap();
        let mut store = SessionStore::new(storage);

        assert!(store.restore_at(now()).is_none());
        assert_eq!(store.storage().get(keys::TOKEN).unwrap().as_deref(), Some("whatever"));
    }

    #[test]
    fn test_adopt_persists_token_and_user() {
        let token = token_expiring_at(now() + Duration::hours(1));
        let mut store = SessionStore::new(MemoryStorage::new());
        let session = Session::new(BearerToken::new(token.clone()), admin()).unwrap();

        store.adopt(session).unwrap();

        let storage = store.storage();
        assert_eq!(storage.get(keys::TOKEN).unwrap(), Some(token));
        let user: User = serde_json::from_str(&storage.get(keys::USER).unwrap().unwrap()).unwrap();
        assert_eq!(user, admin());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let token = token_expiring_at(now() + Duration::hours(1));
        let mut store = SessionStore::new(persisted(&token, &user_json()));
        store.restore_at(now());

        store.logout();
        store.logout();

        assert!(!store.is_active());
        assert!(store.credential().is_none());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_expire_if_stale() {
        let expiry = now() + Duration::minutes(5);
        let mut store = SessionStore::new(persisted(&token_expiring_at(expiry), &user_json()));
        store.restore_at(now());

        assert!(!store.expire_if_stale(now()));
        assert!(store.is_active());

        assert!(store.expire_if_stale(expiry + Duration::seconds(1)));
        assert!(!store.is_active());
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_restore_from_corrupt_file_purges_and_allows_login() {
        let path = std::env::temp_dir()
            .join(format!("tienda-session-{}", uuid::Uuid::new_v4()))
            .join("session.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{truncated").unwrap();

        let mut store = SessionStore::new(FileStorage::new(&path));
        assert!(store.restore_at(now()).is_none());
        assert_eq!(store.storage().get(keys::TOKEN).unwrap(), None);

        let token = token_expiring_at(now() + Duration::hours(1));
        store
            .adopt(Session::new(BearerToken::new(token.clone()), admin()).unwrap())
            .unwrap();

        let mut reopened = SessionStore::new(FileStorage::new(&path));
        assert_eq!(reopened.restore_at(now()).map(Session::user), Some(&admin()));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_failed_adopt_keeps_previous_session_in_storage() {
        struct NoUserWrites(MemoryStorage);

        impl SessionStorage for NoUserWrites {
            fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
                self.0.get(key)
            }

            fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
                if key == keys::USER {
                    return Err(std::io::Error::other("read-only").into());
                }
                self.0.set(key, value)
            }

            fn remove(&mut self, key: &str) -> Result<(), StorageError> {
                self.0.remove(key)
            }
        }

        let old = token_expiring_at(now() + Duration::hours(1));
        let mut store = SessionStore::new(NoUserWrites(persisted(&old, &user_json())));
        store.restore_at(now()).unwrap();

        let new = token_expiring_at(now() + Duration::hours(2));
        let other = User {
            id: UserId::new(8),
            email: Email::parse("otra@tienda.com").unwrap(),
        };
        let result = store.adopt(Session::new(BearerToken::new(new), other).unwrap());

        assert!(matches!(result, Err(SessionError::Storage(_))));
        assert_eq!(store.storage().get(keys::TOKEN).unwrap(), Some(old.clone()));
        assert_eq!(store.current().map(Session::user), Some(&admin()));
    }

    #[test]
    fn test_session_new_rejects_unreadable_token() {
        assert!(Session::new(BearerToken::new("nope"), admin()).is_err());
    }
}
