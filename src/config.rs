//! Run configuration.
//!
//! [`TrackerConfig`] holds everything one run needs: where the API
//! lives, who logs in, which member receives the coupon and which stores
//! are watched. The CLI fills it from flags and environment variables.

use core::time::Duration;
use std::path::Path;

use crate::client::{Endpoints, RedcatClient};
use crate::error::{CouponError, Result};
use crate::models::{CouponTemplate, Credentials, MemberId, StoreId};
use crate::poller::DEFAULT_POLL_INTERVAL;

/// Stores watched when none are configured.
pub const DEFAULT_STORE_IDS: [i64; 5] = [116, 100, 284, 30, 119];

/// Member receiving the coupon when none is configured.
pub const DEFAULT_MEMBER_ID: i64 = 1;

/// What the run does when assigning the coupon fails.
///
/// Login and coupon-creation failures always abort. An assignment
/// failure historically did not, even though a coupon that was never
/// assigned will usually never show up as available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SchedulePolicy {
    /// Log the failure and keep polling the stores.
    #[default]
    Continue,
    /// Log the failure and end the run.
    Abort,
}

/// Everything one run needs.
#[derive(Debug)]
pub struct TrackerConfig {
    /// Tenant label used in log lines.
    pub client_label: String,
    /// API base URL.
    pub base_url: String,
    /// Endpoint paths relative to the base URL.
    pub endpoints: Endpoints,
    /// Administrator credentials.
    pub admin: Credentials,
    /// Member credentials.
    pub member: Credentials,
    /// Member receiving the coupon.
    pub member_id: MemberId,
    /// Stores to watch.
    pub store_ids: Vec<StoreId>,
    /// Pause between polls of one store.
    pub poll_interval: Duration,
    /// Reaction to an assignment failure.
    pub schedule_policy: SchedulePolicy,
    /// Discount and product parameters of the coupon.
    pub template: CouponTemplate,
}

impl TrackerConfig {
    /// Creates a configuration with default member, stores, interval,
    /// policy and coupon template.
    #[must_use]
    pub fn new<L: Into<String>, U: Into<String>>(
        client_label: L,
        base_url: U,
        admin: Credentials,
        member: Credentials,
    ) -> Self {
        Self {
            client_label: client_label.into(),
            base_url: base_url.into(),
            endpoints: Endpoints::default(),
            admin,
            member,
            member_id: MemberId::new(DEFAULT_MEMBER_ID),
            store_ids: DEFAULT_STORE_IDS.into_iter().map(StoreId::new).collect(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            schedule_policy: SchedulePolicy::default(),
            template: CouponTemplate::default(),
        }
    }

    /// Checks the configuration for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Config`] for an empty client label, base
    /// URL or username, an empty store list, or a zero poll interval.
    pub fn validate(&self) -> Result<()> {
        if self.client_label.trim().is_empty() {
            return Err(CouponError::Config("client label is empty".to_owned()));
        }
        if self.base_url.trim().is_empty() {
            return Err(CouponError::Config("base URL is empty".to_owned()));
        }
        if self.admin.username.trim().is_empty() {
            return Err(CouponError::Config("admin username is empty".to_owned()));
        }
        if self.member.username.trim().is_empty() {
            return Err(CouponError::Config("member username is empty".to_owned()));
        }
        if self.store_ids.is_empty() {
            return Err(CouponError::Config("no store IDs to watch".to_owned()));
        }
        if self.poll_interval.is_zero() {
            return Err(CouponError::Config("poll interval must be positive".to_owned()));
        }
        Ok(())
    }

    /// Builds the HTTP client for this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// fails to build.
    #[inline]
    pub fn client(&self) -> Result<RedcatClient> {
        RedcatClient::builder()
            .base_url(self.base_url.as_str())
            .endpoints(self.endpoints.clone())
            .build()
    }
}

/// Reads coupon template overrides from a JSON file.
///
/// Keys missing from the file keep their default values.
///
/// # Errors
///
/// Returns [`CouponError::Config`] if the file cannot be read and
/// [`CouponError::Serialization`] if it is not a valid template.
pub fn load_template(path: &Path) -> Result<CouponTemplate> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        CouponError::Config(format!("cannot read coupon template {}: {err}", path.display()))
    })?;
    Ok(serde_json::from_str(&text)?)
}
