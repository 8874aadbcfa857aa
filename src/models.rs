//! Data models for the loyalty API payloads.
//!
//! Request bodies mirror the field names the API expects; response
//! bodies only model the fields the workflow reads.

mod auth;
mod availability;
mod coupon;
mod ids;
mod schedule;

pub use auth::{AuthType, BearerToken, Credentials, LoginRequest, LoginResponse};
pub use availability::{StoreCoupon, StoreCouponList};
pub use coupon::{
    COUPON_DATE_FORMAT, COUPON_VALIDITY, CouponProgram, CouponTemplate, CreateCouponRequest,
    CreateCouponResponse, CreatedCoupon, IssuedCoupon, PROGRAM_NAME_PREFIX,
};
pub use ids::{CouponId, MemberId, StoreId};
pub use schedule::ScheduleRequest;
