use {
    super::Service,
    crate::server::{
        EXIT_CHECK_INTERVAL,
        SHOULD_EXIT,
    },
    anyhow::Result,
    std::sync::atomic::Ordering,
};

impl Service {
    /// The lifecycle sweep. Bids racing a closure are safe regardless of the
    /// sweep cadence: admission re-checks the end time on every submission,
    /// and closing is idempotent.
    pub async fn run_sweep_loop(&self) -> Result<()> {
        tracing::info!(
            interval = ?self.config.sweep_interval,
            "Starting auction lifecycle sweep..."
        );
        let mut sweep_interval = tokio::time::interval(self.config.sweep_interval);
        let mut exit_check_interval = tokio::time::interval(EXIT_CHECK_INTERVAL);

        while !SHOULD_EXIT.load(Ordering::Acquire) {
            tokio::select! {
                _ = sweep_interval.tick() => {
                    self.conclude_auctions().await;
                }
                _ = exit_check_interval.tick() => {}
            }
        }
        tracing::info!("Shutting down auction lifecycle sweep...");
        self.task_tracker.close();
        self.task_tracker.wait().await;
        Ok(())
    }
}
