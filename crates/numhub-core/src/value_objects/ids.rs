//! Typed identifiers
//!
//! Users and numbers carry chat-platform 64-bit ids; countries and
//! advertisements use 32-bit sequence ids assigned by the store. Newtypes keep
//! the two families from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $inner:ty) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Create a new id from a raw value
            #[inline]
            pub const fn new(id: $inner) -> Self {
                Self(id)
            }

            /// Get the inner value
            #[inline]
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<$inner>().map(Self)
            }
        }
    };
}

id_type!(
    /// Chat-platform user identifier
    UserId,
    i64
);
id_type!(
    /// Country row identifier
    CountryId,
    i32
);
id_type!(
    /// Number row identifier
    NumberId,
    i64
);
id_type!(
    /// Advertisement row identifier
    AdId,
    i32
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let id = UserId::new(123_456_789);
        assert_eq!(id.into_inner(), 123_456_789);
        assert_eq!(i64::from(id), 123_456_789);
        assert_eq!(UserId::from(123_456_789i64), id);
    }

    #[test]
    fn test_display_and_parse() {
        let id: CountryId = "42".parse().unwrap();
        assert_eq!(id, CountryId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("not-a-number".parse::<UserId>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(NumberId::new(1) < NumberId::new(2));
        assert_eq!(AdId::default(), AdId::new(0));
    }
}
