//! Swap Monitor
//!
//! Subscribes to the `Swap` events of both pools and hands every
//! notification to the execution controller. Notifications are not
//! filtered or deduplicated here; the controller's gate decides what
//! turns into a run.
//!
//! A listening session lasts until a flash swap fails or one of the
//! subscriptions ends. The monitor then consults the restart policy,
//! waits, and opens a fresh session. Swaps seen in between are lost.
//!
//! Created: 2026-10-17

use crate::arbitrage::controller::{ExecutionController, RunSignal};
use crate::arbitrage::recovery::{RestartConfig, RestartDecision, RestartPolicy};
use crate::arbitrage::RunOutcome;
use crate::types::VenueId;
use crate::venue::Venue;
use anyhow::{anyhow, Result};
use futures::future;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Status line every N swap notifications
const STATUS_INTERVAL: u64 = 100;

enum Feed {
    Swap(VenueId),
    Closed(VenueId),
}

/// Why a listening session ended
#[derive(Debug)]
enum SessionEnd {
    ExecutionFailed(String),
    FeedClosed(String),
    SubscribeFailed(String),
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionEnd::ExecutionFailed(reason) => write!(f, "execution failed: {}", reason),
            SessionEnd::FeedClosed(venue) => write!(f, "{} Swap subscription closed", venue),
            SessionEnd::SubscribeFailed(reason) => write!(f, "subscribe failed: {}", reason),
        }
    }
}

pub struct Monitor {
    controller: Arc<ExecutionController>,
    signals: mpsc::UnboundedReceiver<RunSignal>,
    policy: RestartPolicy,
    in_flight: Option<JoinHandle<RunOutcome>>,
    notifications: u64,
    sessions: u64,
}

impl Monitor {
    pub fn new(
        controller: Arc<ExecutionController>,
        signals: mpsc::UnboundedReceiver<RunSignal>,
        restart: RestartConfig,
    ) -> Self {
        Self {
            controller,
            signals,
            policy: RestartPolicy::new(restart),
            in_flight: None,
            notifications: 0,
            sessions: 0,
        }
    }

    /// Listen forever, restarting sessions as the policy allows.
    /// Only returns if the controller's signal channel goes away.
    pub async fn run(mut self) -> Result<()> {
        loop {
            self.sessions += 1;
            let end = self.listen().await?;
            self.settle().await;

            match self.policy.on_failure() {
                RestartDecision::Retry(delay) => {
                    warn!("🔄 Session {} ended ({}), resubscribing in {:?}", self.sessions, end, delay);
                    tokio::time::sleep(delay).await;
                }
                RestartDecision::CircuitOpen(cooldown) => {
                    error!(
                        "Session {} ended ({}), circuit open, not listening for {:?}",
                        self.sessions, end, cooldown
                    );
                    tokio::time::sleep(cooldown).await;
                    info!("Circuit closed, resubscribing");
                }
            }
        }
    }

    async fn listen(&mut self) -> Result<SessionEnd> {
        let venues = self.controller.venues().clone();
        let feed_a = match subscribe(&venues.a).await {
            Ok(feed) => feed,
            Err(end) => return Ok(end),
        };
        let feed_b = match subscribe(&venues.b).await {
            Ok(feed) => feed,
            Err(end) => return Ok(end),
        };
        info!(
            "👂 Listening for Swap events on {} ({:?}) and {} ({:?})",
            venues.a.label, venues.a.pool, venues.b.label, venues.b.pool
        );

        let mut feeds = stream::select(feed_a, feed_b);
        loop {
            tokio::select! {
                feed = feeds.next() => match feed {
                    Some(Feed::Swap(source)) => self.dispatch(source),
                    Some(Feed::Closed(venue)) => {
                        return Ok(SessionEnd::FeedClosed(venues.label(venue).to_string()));
                    }
                    None => return Ok(SessionEnd::FeedClosed("all".to_string())),
                },
                signal = self.signals.recv() => match signal {
                    Some(RunSignal::ExecutionFailed(reason)) => {
                        return Ok(SessionEnd::ExecutionFailed(reason));
                    }
                    Some(RunSignal::ExecutionSucceeded) => self.policy.reset(),
                    None => return Err(anyhow!("execution controller dropped its signal channel")),
                },
            }
        }
    }

    fn dispatch(&mut self, source: VenueId) {
        self.notifications += 1;
        if let Some(handle) = self.controller.on_trigger(source) {
            self.in_flight = Some(handle);
        }

        if self.notifications % STATUS_INTERVAL == 0 {
            let stats = self.controller.stats();
            info!(
                "Status | {} swaps seen | {} runs started, {} dropped | {} executed | session {}",
                self.notifications, stats.accepted, stats.dropped, stats.executed, self.sessions
            );
        }
    }

    /// Let the last run finish so the next session starts from IDLE,
    /// then consume whatever it signalled
    async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if let Err(e) = handle.await {
                warn!("Pipeline run did not complete: {}", e);
            }
        }
        while let Ok(signal) = self.signals.try_recv() {
            if signal == RunSignal::ExecutionSucceeded {
                self.policy.reset();
            }
        }
    }
}

async fn subscribe(venue: &Venue) -> Result<BoxStream<'static, Feed>, SessionEnd> {
    let swaps: BoxStream<'static, ()> = venue
        .client()
        .subscribe_swaps(venue.pool)
        .await
        .map_err(|e| SessionEnd::SubscribeFailed(format!("{}: {:#}", venue.label, e)))?;

    let id = venue.id;
    Ok(swaps
        .map(move |_| Feed::Swap(id))
        .chain(stream::once(future::ready(Feed::Closed(id))))
        .boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::{ProfitabilityEstimator, Threshold};
    use crate::testkit::{mock_venues, test_pair, ExecMode, MockExecutor, MockVenue};
    use std::time::Duration;

    struct Harness {
        monitor: JoinHandle<Result<()>>,
        executor: Arc<MockExecutor>,
        mock_a: Arc<MockVenue>,
        mock_b: Arc<MockVenue>,
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            self.monitor.abort();
        }
    }

    fn restart(max_failures: u32, cooldown: Duration) -> RestartConfig {
        RestartConfig {
            initial_delay: Duration::from_millis(1),
            multiplier: 2.0,
            max_delay: Duration::from_millis(4),
            max_consecutive_failures: max_failures,
            circuit_cooldown: cooldown,
        }
    }

    fn start(mode: ExecMode, restart: RestartConfig, prepare: impl FnOnce(&MockVenue, &MockVenue)) -> Harness {
        let pair = test_pair();
        let (venues, mock_a, mock_b) = mock_venues(&pair, (1_000, 100_000), (1_000, 105_000));
        prepare(&*mock_a, &*mock_b);
        let executor = MockExecutor::new(mode);
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Arc::new(ExecutionController::new(
            venues,
            pair,
            Threshold::new(1.0).unwrap(),
            ProfitabilityEstimator::default(),
            executor.clone(),
            tx,
        ));
        let monitor = tokio::spawn(Monitor::new(controller, rx, restart).run());
        Harness {
            monitor,
            executor,
            mock_a,
            mock_b,
        }
    }

    async fn eventually(mut cond: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition not reached within 5s");
    }

    #[tokio::test]
    async fn test_swap_triggers_execution() {
        let h = start(ExecMode::Succeed, restart(5, Duration::from_secs(60)), |_, _| {});
        eventually(|| h.mock_a.subscriptions() == 1 && h.mock_b.subscriptions() == 1).await;

        h.mock_b.emit_swap();
        eventually(|| h.executor.calls().len() == 1).await;
        // A is cheaper, so base is sold on B first
        assert!(!h.executor.calls()[0].start_on_venue_a);

        // still on the first session
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(h.mock_a.subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_execution_failure_resubscribes() {
        let h = start(ExecMode::Fail, restart(5, Duration::from_secs(60)), |_, _| {});
        eventually(|| h.mock_a.subscriptions() == 1).await;

        h.mock_a.emit_swap();
        eventually(|| h.mock_a.subscriptions() == 2 && h.mock_b.subscriptions() == 2).await;
        assert_eq!(h.executor.calls().len(), 1);
        // old session's feeds were dropped
        eventually(|| h.mock_a.live_feeds() == 1 && h.mock_b.live_feeds() == 1).await;

        // new session still reacts
        h.mock_a.emit_swap();
        eventually(|| h.executor.calls().len() == 2).await;
    }

    #[tokio::test]
    async fn test_closed_feed_resubscribes() {
        let h = start(ExecMode::Succeed, restart(5, Duration::from_secs(60)), |_, _| {});
        eventually(|| h.mock_b.subscriptions() == 1).await;

        h.mock_b.close_feeds();
        eventually(|| h.mock_a.subscriptions() == 2 && h.mock_b.subscriptions() == 2).await;
    }

    #[tokio::test]
    async fn test_circuit_stops_resubscribing() {
        let h = start(ExecMode::Succeed, restart(3, Duration::from_secs(3600)), |_, b| {
            b.fail_subscribe(true)
        });

        eventually(|| h.mock_a.subscriptions() == 3).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.mock_a.subscriptions(), 3);
        assert_eq!(h.mock_b.subscriptions(), 0);
        assert!(h.executor.calls().is_empty());
    }
}
