//! Watches stores until the issued coupon becomes redeemable there.
//!
//! Each store is polled by its own tokio task. A task ends when the
//! coupon is reported available or when a poll fails; there is no global
//! timeout and no retry after a failure.

use core::time::Duration;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::client::RedcatClient;
use crate::clock::Clock;
use crate::error::Result;
use crate::models::{BearerToken, IssuedCoupon, StoreId};

/// Pause between two polls of the same store.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Format of the availability time in log lines.
const AVAILABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// How polling a store ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The coupon was reported available.
    Available {
        /// When the availability was observed.
        at: DateTime<Local>,
    },
    /// A poll failed and the store was abandoned.
    Failed {
        /// Description of the failure.
        reason: String,
    },
}

impl StoreOutcome {
    /// Returns `true` for [`StoreOutcome::Available`].
    #[inline]
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(*self, Self::Available { .. })
    }
}

/// Result of watching one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReport {
    /// Store that was polled.
    pub store: StoreId,
    /// Number of listing requests sent.
    pub polls: u32,
    /// Terminal state.
    pub outcome: StoreOutcome,
}

/// Polls per-store coupon listings with the member token.
#[derive(Debug)]
pub struct AvailabilityPoller<C> {
    /// Shared HTTP client.
    client: Arc<RedcatClient>,
    /// Member token.
    token: Arc<BearerToken>,
    /// Coupon being watched.
    coupon: Arc<IssuedCoupon>,
    /// Time source for pauses and timestamps.
    clock: Arc<C>,
    /// Pause between polls.
    interval: Duration,
}

impl<C> Clone for AvailabilityPoller<C> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            token: Arc::clone(&self.token),
            coupon: Arc::clone(&self.coupon),
            clock: Arc::clone(&self.clock),
            interval: self.interval,
        }
    }
}

impl<C: Clock + 'static> AvailabilityPoller<C> {
    /// Creates a poller using [`DEFAULT_POLL_INTERVAL`].
    #[inline]
    #[must_use]
    pub const fn new(
        client: Arc<RedcatClient>,
        token: Arc<BearerToken>,
        coupon: Arc<IssuedCoupon>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            client,
            token,
            coupon,
            clock,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the pause between polls.
    #[inline]
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Polls every store concurrently and waits for all of them to reach
    /// a terminal state.
    ///
    /// Reports come back in the order of `stores`.
    #[tracing::instrument(skip_all, fields(coupon_id = %self.coupon.id, stores = stores.len()))]
    pub async fn watch_stores(&self, stores: &[StoreId]) -> Vec<StoreReport> {
        let handles: Vec<_> = stores
            .iter()
            .copied()
            .map(|store| {
                let poller = self.clone();
                (store, tokio::spawn(async move { poller.poll_store(store).await }))
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (store, handle) in handles {
            let report = handle.await.unwrap_or_else(|err| {
                tracing::error!("Polling task for Store ID {store} stopped: {err}");
                StoreReport {
                    store,
                    polls: 0,
                    outcome: StoreOutcome::Failed {
                        reason: err.to_string(),
                    },
                }
            });
            reports.push(report);
        }
        reports
    }

    /// Polls one store until the coupon is available there or a poll
    /// fails.
    #[tracing::instrument(skip_all, fields(store_id = %store))]
    pub async fn poll_store(&self, store: StoreId) -> StoreReport {
        let mut polls: u32 = 0;
        let outcome = loop {
            polls = polls.saturating_add(1);
            match self.check_once(store).await {
                Ok(true) => break self.report_available(store),
                Ok(false) => self.clock.sleep(self.interval).await,
                Err(err) => {
                    tracing::error!(
                        "Error during monitoring coupon availability for Store ID {store}: {err}"
                    );
                    break StoreOutcome::Failed {
                        reason: err.to_string(),
                    };
                }
            }
        };
        StoreReport {
            store,
            polls,
            outcome,
        }
    }

    /// Fetches the listing once and reports whether the coupon is
    /// available.
    async fn check_once(&self, store: StoreId) -> Result<bool> {
        let listing = self.client.store_coupons(&self.token, store).await?;
        let mut listed = false;
        for entry in listing.matching(&self.coupon.id) {
            if entry.available {
                return Ok(true);
            }
            listed = true;
            tracing::info!(
                "Coupon not available yet at Store ID {store}. Coupon ID: {}. Checking again in {} seconds...",
                self.coupon.id,
                self.interval.as_secs(),
            );
        }
        if !listed {
            tracing::debug!(coupon_id = %self.coupon.id, "coupon not listed at store yet");
        }
        Ok(false)
    }

    /// Logs the availability transition and builds the terminal outcome.
    fn report_available(&self, store: StoreId) -> StoreOutcome {
        let at = self.clock.now();
        tracing::info!(
            "Coupon is now available at Store ID {store}. Program Name: {}, Coupon ID: {}, Start Date: {}, Available Time: {}",
            self.coupon.program.name,
            self.coupon.id,
            self.coupon.program.start_date(),
            at.format(AVAILABLE_TIME_FORMAT),
        );
        StoreOutcome::Available { at }
    }
}
