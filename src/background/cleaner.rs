use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A service that reconciles its own state on a fixed interval.
pub trait Cleaner: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// One reconciliation pass. Called every interval for the lifetime of the process.
    fn execute_clean(&self) -> impl Future<Output = ()> + Send;
}

/// Runs `execute_clean` forever on the given interval.
///
/// Every tick runs in its own task, so a panic inside one pass is logged and
/// the next tick still happens.
pub fn spawn_cleaner<C: Cleaner>(cleaner: Arc<C>, interval: Duration) -> JoinHandle<()> {
    // tokio panics on a zero period
    let interval = interval.max(MIN_INTERVAL);
    tokio::spawn(async move {
        tracing::info!(
            cleaner = cleaner.name(),
            "Cleaner started with interval of {:?}",
            interval
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let tick = cleaner.clone();
            let result = tokio::spawn(async move { tick.execute_clean().await }).await;

            // Handle a failed pass without stopping the loop
            if let Err(e) = result {
                tracing::error!(cleaner = cleaner.name(), "Exception in cleaner tick: {}", e);
            }
        }
    })
}
