//! Periodic reminder task owned by the API process.

use std::time::Duration;

use chrono::Utc;
use kinboard_application::ReminderService;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Starts the reminder loop. The first pass runs immediately.
///
/// Each pass is awaited before the next tick is taken and missed ticks are
/// skipped, so a slow pass delays the schedule instead of stacking runs.
/// The loop exits once `cancel` is cancelled.
pub fn spawn_reminder_scheduler(
    service: ReminderService,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "invite reminder scheduler started"
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = cancel.cancelled() => break,
            }

            if let Err(error) = service.run_once(Utc::now().date_naive()).await {
                warn!(error = %error, "invite reminder pass failed");
            }
        }

        info!("invite reminder scheduler stopped");
    })
}
