//! Runs the whole workflow: login, create, assign, watch.

use std::sync::Arc;

use crate::auth::authenticate;
use crate::clock::Clock;
use crate::config::{SchedulePolicy, TrackerConfig};
use crate::error::Result;
use crate::issuer::issue_coupon;
use crate::models::IssuedCoupon;
use crate::poller::{AvailabilityPoller, StoreReport};
use crate::scheduler::schedule_coupon;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Coupon created by the run.
    pub coupon: IssuedCoupon,
    /// Whether the coupon was assigned to the member.
    pub scheduled: bool,
    /// One report per watched store, in configuration order.
    pub stores: Vec<StoreReport>,
}

impl RunSummary {
    /// Number of stores where the coupon became available.
    #[inline]
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.stores
            .iter()
            .filter(|report| report.outcome.is_available())
            .count()
    }
}

/// Runs the workflow end to end.
///
/// Returns once every store has reached a terminal state. Stores that
/// never report the coupon keep the run alive indefinitely.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, either login fails,
/// the coupon cannot be created, or the assignment fails under
/// [`SchedulePolicy::Abort`]. Polling failures are reported per store in
/// the summary instead.
#[tracing::instrument(skip_all, fields(client = %config.client_label))]
pub async fn run<C: Clock + 'static>(config: &TrackerConfig, clock: Arc<C>) -> Result<RunSummary> {
    tracing::info!("----- New run started -----");
    config.validate()?;
    let client = Arc::new(config.client()?);

    let tokens = authenticate(&client, &config.client_label, &config.admin, &config.member)
        .await
        .inspect_err(|_| tracing::error!("Exiting due to failed login."))?;

    let coupon = issue_coupon(&client, clock.as_ref(), &tokens.admin, &config.template)
        .await
        .inspect_err(|_| tracing::error!("Exiting due to failed coupon creation."))?;

    let scheduled = match schedule_coupon(&client, &tokens.admin, &coupon.id, config.member_id)
        .await
    {
        Ok(()) => true,
        Err(err) => match config.schedule_policy {
            SchedulePolicy::Abort => {
                tracing::error!("Exiting due to failed coupon scheduling.");
                return Err(err);
            }
            SchedulePolicy::Continue => {
                tracing::warn!(
                    "Coupon {} was not assigned to member {}; polling anyway",
                    coupon.id,
                    config.member_id,
                );
                false
            }
        },
    };

    let poller = AvailabilityPoller::new(
        Arc::clone(&client),
        Arc::new(tokens.member),
        Arc::new(coupon.clone()),
        clock,
    )
    .interval(config.poll_interval);
    let stores = poller.watch_stores(&config.store_ids).await;

    let summary = RunSummary {
        coupon,
        scheduled,
        stores,
    };
    tracing::info!(
        available = summary.available_count(),
        stores = summary.stores.len(),
        "----- Run ended -----"
    );
    Ok(summary)
}
