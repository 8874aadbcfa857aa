//! Coupon lifecycle tracker for a Redcat-style loyalty API.
//!
//! One run logs in as an administrator and as a member, creates a coupon
//! valid for the next 24 hours, assigns it to the member and then polls a
//! set of stores concurrently until each one reports the coupon as
//! available.
//!
//! [`pipeline::run`] drives the whole sequence; the individual stages live
//! in [`auth`], [`issuer`], [`scheduler`] and [`poller`], all on top of the
//! typed HTTP client in [`client`].

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod issuer;
#[cfg(feature = "logging")]
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod poller;
pub mod scheduler;

#[cfg(test)]
mod test_support;
