//! Newtype wrappers for entity identifiers.
//!
//! These prevent accidentally passing a store ID where a member ID is
//! expected at compile time.

use serde::{Deserialize, Deserializer, Serialize};

/// Macro to define a newtype ID wrapping an `i64`.
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier from the given value.
            #[inline]
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the inner value.
            #[inline]
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            #[inline]
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

/// Server-assigned identifier of a coupon program.
///
/// The API hands out numbers in some deployments and strings in others,
/// so the identifier is kept as text. A JSON number is stored in its
/// decimal form, which makes `5531` and `"5531"` the same coupon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CouponId(String);

impl CouponId {
    /// Creates a new identifier from the given string.
    #[inline]
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string.
    #[inline]
    #[must_use]
    pub fn as_inner(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner string.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Reads an identifier from an arbitrary JSON value.
    ///
    /// Numbers and strings are accepted; any other shape yields `None`.
    #[inline]
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match *value {
            serde_json::Value::Number(ref number) => Some(Self(number.to_string())),
            serde_json::Value::String(ref text) => Some(Self(text.clone())),
            serde_json::Value::Null
            | serde_json::Value::Bool(_)
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }

    /// Returns `true` for the values the API uses to mean "no ID":
    /// an empty string or zero.
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        let text = self.0.trim();
        text.is_empty() || text == "0"
    }
}

impl<'de> Deserialize<'de> for CouponId {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "identifier must be a number or string, got {value}"
            ))
        })
    }
}

/// Deserializes an optional identifier, mapping unusable shapes to `None`.
pub(crate) fn deserialize_lenient_coupon_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<CouponId>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(CouponId::from_json))
}

impl core::fmt::Display for CouponId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<String> for CouponId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CouponId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<i64> for CouponId {
    #[inline]
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

define_numeric_id! {
    /// Identifier of a loyalty member.
    MemberId
}

define_numeric_id! {
    /// Identifier of a store.
    StoreId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coupon_id_from_number_or_string_is_the_same() {
        let from_number: CouponId = serde_json::from_str("981").unwrap();
        let from_string: CouponId = serde_json::from_str(r#""981""#).unwrap();
        assert_eq!(from_number, CouponId::from(981));
        assert_eq!(from_string, from_number);
    }

    #[test]
    fn coupon_id_keeps_non_numeric_text() {
        let id: CouponId = serde_json::from_str(r#""C-5531""#).unwrap();
        assert_eq!(id.as_inner(), "C-5531");
        assert_eq!(id.to_string(), "C-5531");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""C-5531""#);
    }

    #[test]
    fn coupon_id_rejects_other_shapes() {
        assert!(serde_json::from_str::<CouponId>("true").is_err());
        assert!(serde_json::from_str::<CouponId>("[1]").is_err());
        assert_eq!(CouponId::from_json(&serde_json::json!({"id": 1})), None);
    }

    #[test]
    fn blank_coupon_ids() {
        assert!(CouponId::from(0).is_blank());
        assert!(CouponId::from("").is_blank());
        assert!(CouponId::from("  ").is_blank());
        assert!(!CouponId::from(5531).is_blank());
        assert!(!CouponId::from("C-0").is_blank());
    }

    #[test]
    fn numeric_ids_serialize_as_numbers() {
        assert_eq!(serde_json::to_string(&StoreId::new(116)).unwrap(), "116");
        let member: MemberId = serde_json::from_str("42").unwrap();
        assert_eq!(member, MemberId::new(42));
    }

    #[test]
    fn id_display() {
        assert_eq!(StoreId::new(116).to_string(), "116");
        assert_eq!(MemberId::new(1).to_string(), "1");
    }

    #[test]
    fn id_from_inner() {
        let id: MemberId = 7_i64.into();
        assert_eq!(id.into_inner(), 7);
    }
}
