//! Bearer tokens and their embedded expiry.
//!
//! The client never holds the key the server signs tokens with, so the
//! signature is not checked here; the server does that on every request. What
//! the client needs is the `exp` claim, to decide at startup whether a
//! persisted token is still worth presenting.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

/// Why a token's expiry could not be read.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Not three base64url segments, payload not JSON, or `exp` missing or
    /// not a non-negative integer.
    #[error("malformed token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),

    /// `exp` is an integer but not a representable timestamp.
    #[error("token expiry {0} is out of range")]
    ExpiryOutOfRange(i64),
}

/// An opaque bearer credential.
///
/// `Debug` is redacted; use [`BearerToken::expose`] only where the raw value
/// is sent or persisted.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token string.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Expiry from the token's `exp` claim.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the payload cannot be decoded or carries no
    /// usable `exp`.
    pub fn expiry(&self) -> Result<DateTime<Utc>, TokenError> {
        token_expiry(self.expose())
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Read the `exp` claim of a JWT-shaped token without verifying its signature.
///
/// Expiry is *not* enforced here (no leeway either); callers compare the
/// result against their own clock with strict `exp > now`.
///
/// # Errors
///
/// Returns [`TokenError`] for anything that does not decode to an integer
/// `exp`.
pub fn token_expiry(token: &str) -> Result<DateTime<Utc>, TokenError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let data = jsonwebtoken::decode::<ExpiryClaim>(
        token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )?;

    let exp = data.claims.exp;
    DateTime::from_timestamp(exp, 0).ok_or(TokenError::ExpiryOutOfRange(exp))
}
