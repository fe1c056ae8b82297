use std::time::Duration;

use tracing::Instrument;

use crate::services::matchmaking::MatchService;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that ends silent pairings on a fixed interval
pub struct InactivitySweeper {
    service: MatchService,
    interval: Duration,
    max_inactive: chrono::Duration,
}

impl InactivitySweeper {
    /// Intervals shorter than one second are raised to one second
    pub fn new(service: MatchService, interval: Duration, max_inactive: chrono::Duration) -> Self {
        Self {
            service,
            interval: interval.max(MIN_INTERVAL),
            max_inactive,
        }
    }

    /// Run until `shutdown` flips to true
    ///
    /// The first sweep happens immediately.
    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep_once()
                        .instrument(tracing::info_span!("inactivity_sweep"))
                        .await;
                }
                _ = shutdown.changed() => {}
            }
        }
        tracing::info!("Inactivity sweeper shutting down");
    }

    pub async fn sweep_once(&self) -> u64 {
        tracing::debug!("Sweeping inactive pairings");
        self.service.end_inactive_pairings(self.max_inactive).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnonIdGenerator, Matcher};
    use crate::services::matchmaking::MatchPolicy;
    use crate::services::memory::InMemoryStore;
    use std::sync::Arc;

    fn create_service() -> MatchService {
        MatchService::new(
            Arc::new(InMemoryStore::new()),
            Matcher::default(),
            AnonIdGenerator::default(),
            MatchPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_zero_interval_runs_and_stops() {
        let sweeper = InactivitySweeper::new(
            create_service(),
            Duration::ZERO,
            chrono::Duration::hours(24),
        );
        assert_eq!(sweeper.interval, MIN_INTERVAL);

        let (tx, rx) = tokio::sync::watch::channel(false);
        let handle = tokio::spawn(sweeper.run(rx));

        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .expect("sweeper task panicked");
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown() {
        let service = create_service();
        let sweeper = InactivitySweeper::new(
            service,
            Duration::from_millis(10),
            chrono::Duration::hours(24),
        );

        let (tx, rx) = tokio::sync::watch::channel(false);
        let handle = tokio::spawn(sweeper.run(rx));

        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
