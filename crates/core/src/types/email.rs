//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty once surrounding whitespace is removed.
    #[error("email cannot be empty")]
    Empty,
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// One side of the @ is empty.
    #[error("email must have text on both sides of the @")]
    IncompleteAddress,
    /// The input contains whitespace inside the address.
    #[error("email cannot contain whitespace")]
    ContainsWhitespace,
}

/// An email address, as typed on the admin login form or returned by the API.
///
/// Parsing is deliberately shallow: the backend is the authority on which
/// accounts exist, so the client only rejects input that can never be an
/// address before spending a request on it.
///
/// Values deserialized from the API are trusted as-is.
///
/// ```
/// use tienda_core::Email;
///
/// assert_eq!(Email::parse("  admin@tienda.com ").unwrap().as_str(), "admin@tienda.com");
/// assert!(Email::parse("admin").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse an `Email` from user input, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] if the trimmed input is empty, has no `@`,
    /// has nothing before or after the `@`, or contains inner whitespace.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        let (local, domain) = s.rsplit_once('@').ok_or(EmailError::MissingAtSymbol)?;
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::IncompleteAddress);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_input() {
        let email = Email::parse("\tadmin@tienda.com\n").unwrap();
        assert_eq!(email.as_str(), "admin@tienda.com");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_rejects_missing_at() {
        assert_eq!(Email::parse("admin"), Err(EmailError::MissingAtSymbol));
    }

    #[test]
    fn test_parse_rejects_one_sided_address() {
        assert_eq!(Email::parse("@tienda.com"), Err(EmailError::IncompleteAddress));
        assert_eq!(Email::parse("admin@"), Err(EmailError::IncompleteAddress));
    }

    #[test]
    fn test_parse_rejects_inner_whitespace() {
        assert_eq!(
            Email::parse("ad min@tienda.com"),
            Err(EmailError::ContainsWhitespace)
        );
    }

    #[test]
    fn test_deserialize_trusts_server_value() {
        let email: Email = serde_json::from_str("\"ventas@tienda.com\"").unwrap();
        assert_eq!(email.to_string(), "ventas@tienda.com");
    }
}
