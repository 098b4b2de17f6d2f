//! Product visibility.

use core::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Whether a product is shown on the storefront.
///
/// The backend stores the `activo` column in SQLite, so depending on the
/// endpoint it arrives as `true`/`false` or `1`/`0`. Both forms decode here,
/// and `null` decodes as hidden. Serialization always produces a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Listed and purchasable.
    #[default]
    Active,
    /// Hidden from the storefront.
    Hidden,
}

impl Visibility {
    /// Returns `true` for [`Visibility::Active`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// The value sent in the `activo` multipart field.
    #[must_use]
    pub const fn as_form_value(self) -> &'static str {
        match self {
            Self::Active => "1",
            Self::Hidden => "0",
        }
    }
}

impl From<bool> for Visibility {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Hidden }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Hidden => f.write_str("hidden"),
        }
    }
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_active())
    }
}

struct VisibilityVisitor;

impl Visitor<'_> for VisibilityVisitor {
    type Value = Visibility;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, 0/1 or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Visibility, E> {
        Ok(Visibility::Hidden)
    }

    fn visit_none<E: de::Error>(self) -> Result<Visibility, E> {
        Ok(Visibility::Hidden)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Visibility, E> {
        Ok(Visibility::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Visibility, E> {
        match v {
            0 => Ok(Visibility::Hidden),
            1 => Ok(Visibility::Active),
            _ => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Visibility, E> {
        u64::try_from(v)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
            .and_then(|v| self.visit_u64(v))
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VisibilityVisitor)
    }
}
