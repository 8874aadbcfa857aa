//! Assigns the coupon to the member whose stores are polled.

use crate::client::RedcatClient;
use crate::error::Result;
use crate::models::{BearerToken, CouponId, MemberId, ScheduleRequest};

/// Assigns `coupon` to a single member, once.
///
/// # Errors
///
/// Returns an error if the request fails or the server rejects it. The
/// failure is logged; whether the run continues is up to the caller.
#[tracing::instrument(skip_all, fields(coupon_id = %coupon, member_id = %member))]
pub async fn schedule_coupon(
    client: &RedcatClient,
    token: &BearerToken,
    coupon: &CouponId,
    member: MemberId,
) -> Result<()> {
    client
        .schedule_coupon(token, coupon, &ScheduleRequest::single(member))
        .await
        .inspect_err(|err| tracing::error!("Error during coupon scheduling: {err}"))?;
    tracing::info!("Coupon scheduled successfully for Coupon ID: {coupon}");
    Ok(())
}
