//! Coupon assignment request model.

use serde::Serialize;

use super::MemberId;

/// Request body for the coupon-assignment endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduleRequest {
    /// Members receiving the coupon.
    pub members: Vec<MemberId>,
    /// Whether a member may receive the coupon more than once.
    pub multiple: bool,
}

impl ScheduleRequest {
    /// Assigns the coupon to exactly one member, once.
    #[inline]
    #[must_use]
    pub fn single(member: MemberId) -> Self {
        Self {
            members: vec![member],
            multiple: false,
        }
    }
}
