//! Status poller
//!
//! The tick loop that drives the poll controller. Each tick asks the
//! controller whether a poll is due; the controller decides. A poll cycle
//! runs to completion inside the tick, holding the controller lock, so the
//! next tick cannot start another one.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::controller::SharedController;

/// Periodically ticks a shared poll controller
pub struct StatusPoller {
    controller: SharedController,
    refresh: Arc<Notify>,
    tick_period: Duration,
}

impl StatusPoller {
    /// Creates a new status poller
    ///
    /// # Arguments
    /// * `controller` - Controller to tick
    /// * `refresh` - Notified by the front end after a configuration change
    /// * `tick_period` - Time between regular ticks
    pub fn new(controller: SharedController, refresh: Arc<Notify>, tick_period: Duration) -> Self {
        Self {
            controller,
            refresh,
            tick_period,
        }
    }

    /// Starts the tick loop; never returns
    pub async fn run(&self) {
        info!("Starting status poller (tick: {:?})", self.tick_period);

        let mut interval = time::interval(self.tick_period);
        // A slow poll must not be followed by a burst of catch-up ticks
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.refresh.notified() => {
                    debug!("Immediate refresh requested");
                }
            }

            self.tick().await;
        }
    }

    /// Performs a single tick
    ///
    /// # Returns
    /// `true` if the tick performed a poll cycle
    pub async fn tick(&self) -> bool {
        let mut controller = self.controller.lock().await;
        let polled = controller.maybe_poll(Instant::now()).await;

        if polled {
            let (status, _) = controller.current_status();
            debug!(
                "Poll cycle finished: status={}, next in {}s",
                status,
                controller.config().interval_secs()
            );
        }

        polled
    }
}
