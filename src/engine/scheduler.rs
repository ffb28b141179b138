use std::{sync::Arc, time::Duration};

use tokio::{runtime::Runtime, task, time};
use tracing::{error, info};

use crate::{common::Shutdown, config::SchedulerConfig, redlist::RedListSweep, timing::TimingService};

/// Drives the periodic time-remaining and red-list sweeps on the engine runtime.
pub struct Scheduler {
    timing: TimingService,
    red_list: Arc<RedListSweep>,
    config: SchedulerConfig,

    runtime: Arc<Runtime>,
    shutdown: Arc<Shutdown>,
}

impl Scheduler {
    pub fn new(
        timing: TimingService,
        red_list: Arc<RedListSweep>,
        config: SchedulerConfig,
        runtime: Arc<Runtime>,
        shutdown: Arc<Shutdown>,
    ) -> Self {
        Self {
            timing,
            red_list,
            config,
            runtime,
            shutdown,
        }
    }

    /// Spawns both sweeps; each runs once immediately, then on its interval until shutdown.
    pub fn start(&self) {
        info!(
            time_remaining_secs = self.config.time_remaining_interval_secs,
            red_list_secs = self.config.red_list_interval_secs,
            "starting periodic sweeps"
        );

        let timing = self.timing.clone();
        let shutdown = self.shutdown.clone();
        let period = Duration::from_secs(self.config.time_remaining_interval_secs);
        self.runtime.spawn(async move {
            let mut ticker = time::interval(period);
            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = ticker.tick() => {
                        let timing = timing.clone();
                        match task::spawn_blocking(move || timing.update_all_time_remaining()).await {
                            Ok(Ok(_)) => {}
                            Ok(Err(err)) => error!(error = %err, "time remaining sweep failed"),
                            Err(err) => error!(error = %err, "time remaining sweep panicked"),
                        }
                    }
                }
            }
        });

        let red_list = self.red_list.clone();
        let shutdown = self.shutdown.clone();
        let period = Duration::from_secs(self.config.red_list_interval_secs);
        self.runtime.spawn(async move {
            let mut ticker = time::interval(period);
            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = ticker.tick() => {
                        let red_list = red_list.clone();
                        match task::spawn_blocking(move || red_list.update_red_list()).await {
                            Ok(Ok(_)) => {}
                            Ok(Err(err)) => error!(error = %err, "red-list sweep failed"),
                            Err(err) => error!(error = %err, "red-list sweep panicked"),
                        }
                    }
                }
            }
        });
    }
}
