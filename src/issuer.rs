//! Creates the coupon program the run tracks.

use crate::client::{RedcatClient, log_server_body};
use crate::clock::Clock;
use crate::error::{CouponError, Result};
use crate::models::{
    BearerToken, CouponId, CouponProgram, CouponTemplate, CreateCouponRequest, IssuedCoupon,
};

/// Creates a coupon valid for 24 hours from now and returns its
/// server-assigned identifier.
///
/// # Errors
///
/// Returns an error if the request fails, the server rejects it, or the
/// response has no `data.ID`. The failure is logged together with the
/// server's response body.
#[tracing::instrument(skip_all)]
pub async fn issue_coupon<C: Clock>(
    client: &RedcatClient,
    clock: &C,
    token: &BearerToken,
    template: &CouponTemplate,
) -> Result<IssuedCoupon> {
    let program = CouponProgram::generate(clock.now());
    let request = CreateCouponRequest::new(template, &program);

    let issued = create(client, token, &request)
        .await
        .map(|id| IssuedCoupon { id, program })
        .inspect_err(|err| tracing::error!("Error during coupon creation: {err}"))?;

    tracing::info!(
        "Coupon created successfully. Program Name: {}, Coupon ID: {}, Start Date: {}",
        issued.program.name,
        issued.id,
        issued.program.start_date(),
    );
    Ok(issued)
}

/// Posts the request and extracts `data.ID` from the response.
async fn create(
    client: &RedcatClient,
    token: &BearerToken,
    request: &CreateCouponRequest,
) -> Result<CouponId> {
    let response = client.create_coupon(token, request).await?;
    response.coupon_id().ok_or_else(|| {
        log_server_body(serde_json::to_value(&response).ok().as_ref());
        CouponError::MissingField("data.ID")
    })
}
