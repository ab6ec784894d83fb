use crate::application_port::SessionService;
use crate::domain_port::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodically purges revocation and refresh entries that can no longer
/// matter. Correctness never depends on it running.
pub struct Compactor {
    session_service: Arc<dyn SessionService>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    cancellation_token: CancellationToken,
}

impl Compactor {
    pub fn new(
        session_service: Arc<dyn SessionService>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            session_service,
            clock,
            interval,
            cancellation_token,
        }
    }

    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; nothing to purge at startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Compactor shutting down...");
                    break;
                }
                _ = ticker.tick() => {
                    match self.session_service.compact(self.clock.now()).await {
                        Ok(report) => tracing::debug!(
                            revocations = report.revocations_purged,
                            refresh_tokens = report.refresh_tokens_purged,
                            "compaction finished"
                        ),
                        Err(e) => tracing::error!("Compactor error: {:#}", e),
                    }
                }
            }
        }
    }
}
