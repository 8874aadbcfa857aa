//! Coupon creation models.

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};

use super::CouponId;
use super::ids::deserialize_lenient_coupon_id;

/// Prefix of every generated program name.
pub const PROGRAM_NAME_PREFIX: &str = "Redcat test coupon #";

/// Number of UUID characters appended to the prefix.
///
/// `ProgramName` has a length limit on the server side.
const PROGRAM_SUFFIX_LEN: usize = 8;

/// Format used by the API for coupon start and finish dates.
pub const COUPON_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// How long a generated coupon stays valid.
pub const COUPON_VALIDITY: TimeDelta = TimeDelta::hours(24);

/// Name and validity window of a coupon program, generated client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponProgram {
    /// Unique program name.
    pub name: String,
    /// Start of the validity window.
    pub start: DateTime<Local>,
    /// End of the validity window.
    pub finish: DateTime<Local>,
}

impl CouponProgram {
    /// Generates a fresh program valid for [`COUPON_VALIDITY`] from `now`.
    #[must_use]
    pub fn generate(now: DateTime<Local>) -> Self {
        let suffix: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(PROGRAM_SUFFIX_LEN)
            .collect();
        Self {
            name: format!("{PROGRAM_NAME_PREFIX}{suffix}"),
            start: now,
            finish: now + COUPON_VALIDITY,
        }
    }

    /// Start date in the API's `YYYY-MM-DD HH:MM` format.
    #[inline]
    #[must_use]
    pub fn start_date(&self) -> String {
        self.start.format(COUPON_DATE_FORMAT).to_string()
    }

    /// Finish date in the API's `YYYY-MM-DD HH:MM` format.
    #[inline]
    #[must_use]
    pub fn finish_date(&self) -> String {
        self.finish.format(COUPON_DATE_FORMAT).to_string()
    }
}

/// Discount and product parameters shared by every generated coupon.
///
/// The defaults describe a single-use, fully discounted coupon for one
/// product, valid every day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CouponTemplate {
    /// Discount type code.
    pub discount_type: String,
    /// Eligibility code.
    pub eligibility: String,
    /// Free-form description.
    pub description: String,
    /// Discount amount.
    pub discount_amount: String,
    /// Number of uses per member.
    pub discount_usage: String,
    /// Time lock period.
    pub time_lock_period: String,
    /// Comma-separated product (PLU) codes the coupon applies to.
    pub plu_list: String,
    /// Minimum spend.
    pub amount: String,
    /// Whether the program is shown under an alias.
    pub use_alias: bool,
    /// Weekday bitmask (127 = every day).
    pub days: u8,
    /// Visibility code.
    pub visible: u8,
    /// Coupon kind code.
    pub kind: u8,
}

impl Default for CouponTemplate {
    #[inline]
    fn default() -> Self {
        Self {
            discount_type: "5".to_owned(),
            eligibility: "0".to_owned(),
            description: "testing coupon issue".to_owned(),
            discount_amount: "100".to_owned(),
            discount_usage: "1".to_owned(),
            time_lock_period: "0".to_owned(),
            plu_list: "1000958".to_owned(),
            amount: "0".to_owned(),
            use_alias: false,
            days: 127,
            visible: 2,
            kind: 2,
        }
    }
}

/// Request body for the coupon-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateCouponRequest {
    /// Discount type code.
    pub discount_type: String,
    /// Eligibility code.
    pub eligibility: String,
    /// Program name.
    pub program_name: String,
    /// Free-form description.
    pub description: String,
    /// Discount amount.
    pub discount_amount: String,
    /// Number of uses per member.
    pub discount_usage: String,
    /// Start of validity (`YYYY-MM-DD HH:MM`).
    pub start_date: String,
    /// End of validity (`YYYY-MM-DD HH:MM`).
    pub finish_date: String,
    /// Time lock period.
    pub time_lock_period: String,
    /// Product codes.
    #[serde(rename = "PLUList")]
    pub plu_list: String,
    /// Minimum spend.
    pub amount: String,
    /// Alias flag.
    pub use_alias: bool,
    /// Weekday bitmask.
    pub days: u8,
    /// Visibility code.
    pub visible: u8,
    /// Coupon kind code.
    #[serde(rename = "Type")]
    pub kind: u8,
}

impl CreateCouponRequest {
    /// Combines a template with a generated program.
    #[must_use]
    pub fn new(template: &CouponTemplate, program: &CouponProgram) -> Self {
        Self {
            discount_type: template.discount_type.clone(),
            eligibility: template.eligibility.clone(),
            program_name: program.name.clone(),
            description: template.description.clone(),
            discount_amount: template.discount_amount.clone(),
            discount_usage: template.discount_usage.clone(),
            start_date: program.start_date(),
            finish_date: program.finish_date(),
            time_lock_period: template.time_lock_period.clone(),
            plu_list: template.plu_list.clone(),
            amount: template.amount.clone(),
            use_alias: template.use_alias,
            days: template.days,
            visible: template.visible,
            kind: template.kind,
        }
    }
}

/// Response body of the coupon-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateCouponResponse {
    /// Created program, when the server returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CreatedCoupon>,
    /// Remaining response fields, kept for diagnostics.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CreateCouponResponse {
    /// Returns the identifier at `data.ID`, if present.
    ///
    /// Zero and the empty string count as absent.
    #[inline]
    #[must_use]
    pub fn coupon_id(&self) -> Option<CouponId> {
        self.data
            .as_ref()
            .and_then(|data| data.id.as_ref())
            .filter(|id| !id.is_blank())
            .cloned()
    }
}

/// The `data` object of a coupon-creation response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreatedCoupon {
    /// Server-assigned program identifier.
    #[serde(
        rename = "ID",
        default,
        deserialize_with = "deserialize_lenient_coupon_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<CouponId>,
    /// Remaining program fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A coupon that exists on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCoupon {
    /// Server-assigned identifier.
    pub id: CouponId,
    /// Program that was submitted.
    pub program: CouponProgram,
}
