//! Per-store coupon listing models.

use serde::{Deserialize, Deserializer};

use super::CouponId;
use super::ids::deserialize_lenient_coupon_id;

/// Response body of the per-store coupon listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StoreCouponList {
    /// Coupons visible to the member at this store.
    #[serde(default)]
    pub data: Vec<StoreCoupon>,
}

impl StoreCouponList {
    /// Returns the entries belonging to the given coupon program.
    #[inline]
    pub fn matching<'list>(
        &'list self,
        coupon: &'list CouponId,
    ) -> impl Iterator<Item = &'list StoreCoupon> {
        self.data
            .iter()
            .filter(move |entry| entry.program_id.as_ref() == Some(coupon))
    }
}

/// One coupon entry in a store listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StoreCoupon {
    /// Program the coupon was issued from.
    ///
    /// Values that are neither numbers nor strings read as `None`, so one
    /// odd entry does not spoil the rest of the listing.
    #[serde(
        rename = "ProgramID",
        default,
        deserialize_with = "deserialize_lenient_coupon_id"
    )]
    pub program_id: Option<CouponId>,
    /// Whether the coupon can be redeemed at this store right now.
    #[serde(rename = "Available", default, deserialize_with = "deserialize_flag")]
    pub available: bool,
}

/// Wire representation of the `Available` flag.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    /// Integer flag; only `1` means set.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Anything else (strings, `null`) counts as unset.
    Other(serde::de::IgnoredAny),
}

/// Reads an `Available` flag, treating `1` and `true` as set.
fn deserialize_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<bool, D::Error> {
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Int(value) => value == 1,
        Flag::Bool(value) => value,
        Flag::Other(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_listing() {
        let json = r#"{
            "data": [
                {"ProgramID": 10, "Available": 0, "Name": "other"},
                {"ProgramID": 5531, "Available": 1}
            ]
        }"#;
        let list: StoreCouponList = serde_json::from_str(json).unwrap();
        assert_eq!(list.data.len(), 2);
        let wanted = CouponId::from(5531);
        let matches: Vec<&StoreCoupon> = list.matching(&wanted).collect();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].available);
    }

    #[test]
    fn missing_data_is_empty_listing() {
        let list: StoreCouponList = serde_json::from_str("{}").unwrap();
        assert!(list.data.is_empty());
        assert_eq!(list.matching(&CouponId::from(1)).count(), 0);
    }

    #[test]
    fn flag_variants() {
        let cases = [
            (r#"{"Available": 1}"#, true),
            (r#"{"Available": true}"#, true),
            (r#"{"Available": 0}"#, false),
            (r#"{"Available": 2}"#, false),
            (r#"{"Available": "1"}"#, false),
            (r#"{"Available": null}"#, false),
            ("{}", false),
        ];
        for (json, expected) in cases {
            let entry: StoreCoupon = serde_json::from_str(json).unwrap();
            assert_eq!(entry.available, expected, "{json}");
        }
    }

    #[test]
    fn program_id_as_string_matches() {
        let entry: StoreCoupon =
            serde_json::from_str(r#"{"ProgramID": "77", "Available": 1}"#).unwrap();
        assert_eq!(entry.program_id, Some(CouponId::from(77)));
    }

    #[test]
    fn foreign_entries_with_odd_ids_do_not_break_the_listing() {
        let json = r#"{
            "data": [
                {"ProgramID": "PROMO-7", "Available": 1},
                {"ProgramID": 12.5, "Available": 0},
                {"ProgramID": 18446744073709551616, "Available": 0},
                {"ProgramID": {"nested": true}, "Available": 1},
                {"ProgramID": null, "Available": 1},
                {"ProgramID": 5531, "Available": 1}
            ]
        }"#;
        let list: StoreCouponList = serde_json::from_str(json).unwrap();
        assert_eq!(list.data.len(), 6);
        assert_eq!(list.data[3].program_id, None);

        let wanted = CouponId::from(5531);
        let matches: Vec<&StoreCoupon> = list.matching(&wanted).collect();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].available);
    }

    #[test]
    fn string_coupon_id_matches_string_program_id() {
        let list: StoreCouponList =
            serde_json::from_str(r#"{"data": [{"ProgramID": "C-5531", "Available": 1}]}"#)
                .unwrap();
        assert_eq!(list.matching(&CouponId::from("C-5531")).count(), 1);
    }
}
