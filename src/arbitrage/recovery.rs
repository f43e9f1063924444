//! Restart Policy - backoff and circuit breaker for listening sessions
//!
//! Purpose:
//!     When a flash swap fails or a Swap subscription drops, the monitor
//!     tears down its session and starts a new one. This decides how long
//!     to wait first, and stops resubscribing altogether when failures
//!     keep coming back to back.
//!
//! Created: 2026-10-17
//!
//! Design:
//!     - Escalating delay: initial -> initial×2 -> ... -> max_delay
//!     - Circuit opens after `max_consecutive_failures` failures in a row,
//!       holding off for `circuit_cooldown`; the next failure after it
//!       closes starts a fresh escalation
//!     - A successful execution resets everything

use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq)]
pub struct RestartConfig {
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    /// 0 disables the circuit breaker
    pub max_consecutive_failures: u32,
    pub circuit_cooldown: Duration,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1_000),
            multiplier: 2.0,
            max_delay: Duration::from_millis(60_000),
            max_consecutive_failures: 5,
            circuit_cooldown: Duration::from_secs(300),
        }
    }
}

/// What to do before the next listening session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    /// Wait, then resubscribe
    Retry(Duration),
    /// Too many failures in a row, wait out the cooldown
    CircuitOpen(Duration),
}

#[derive(Debug)]
pub struct RestartPolicy {
    config: RestartConfig,
    consecutive_failures: u32,
    current_delay: Duration,
    circuit_trips: u32,
}

impl RestartPolicy {
    pub fn new(config: RestartConfig) -> Self {
        let current_delay = config.initial_delay;
        Self {
            config,
            consecutive_failures: 0,
            current_delay,
            circuit_trips: 0,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn circuit_trips(&self) -> u32 {
        self.circuit_trips
    }

    /// Record one session failure and decide the wait before the next
    pub fn on_failure(&mut self) -> RestartDecision {
        self.consecutive_failures += 1;

        let max = self.config.max_consecutive_failures;
        if max > 0 && self.consecutive_failures >= max {
            self.circuit_trips += 1;
            error!(
                "🛑 Circuit open after {} consecutive failures, pausing {}s",
                self.consecutive_failures,
                self.config.circuit_cooldown.as_secs()
            );
            self.consecutive_failures = 0;
            self.current_delay = self.config.initial_delay;
            return RestartDecision::CircuitOpen(self.config.circuit_cooldown);
        }

        let delay = self.current_delay;
        let next = self.current_delay.mul_f64(self.config.multiplier.max(1.0));
        self.current_delay = next.min(self.config.max_delay);
        debug!(
            "Restart backoff: failure {} -> wait {:?}",
            self.consecutive_failures, delay
        );
        RestartDecision::Retry(delay.min(self.config.max_delay))
    }

    /// Successful execution, back to a clean slate
    pub fn reset(&mut self) {
        if self.consecutive_failures > 0 {
            debug!("Restart policy reset after {} failures", self.consecutive_failures);
        }
        self.consecutive_failures = 0;
        self.current_delay = self.config.initial_delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RestartConfig {
        RestartConfig {
            initial_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_millis(500),
            max_consecutive_failures: 5,
            circuit_cooldown: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let mut policy = RestartPolicy::new(config());
        assert_eq!(policy.on_failure(), RestartDecision::Retry(Duration::from_millis(100)));
        assert_eq!(policy.on_failure(), RestartDecision::Retry(Duration::from_millis(200)));
        assert_eq!(policy.on_failure(), RestartDecision::Retry(Duration::from_millis(400)));
        assert_eq!(policy.on_failure(), RestartDecision::Retry(Duration::from_millis(500)));
    }

    #[test]
    fn test_circuit_opens_after_max_failures() {
        let mut policy = RestartPolicy::new(config());
        for _ in 0..4 {
            assert!(matches!(policy.on_failure(), RestartDecision::Retry(_)));
        }
        let decision = policy.on_failure();
        assert_eq!(decision, RestartDecision::CircuitOpen(Duration::from_secs(30)));
        assert_eq!(policy.circuit_trips(), 1);

        // fresh escalation after the cooldown
        assert_eq!(policy.on_failure(), RestartDecision::Retry(Duration::from_millis(100)));
    }

    #[test]
    fn test_reset_on_success() {
        let mut policy = RestartPolicy::new(config());
        policy.on_failure();
        policy.on_failure();
        policy.on_failure();
        policy.reset();
        assert_eq!(policy.consecutive_failures(), 0);
        assert_eq!(policy.on_failure(), RestartDecision::Retry(Duration::from_millis(100)));
    }

    #[test]
    fn test_zero_max_failures_never_opens() {
        let mut policy = RestartPolicy::new(RestartConfig {
            max_consecutive_failures: 0,
            ..config()
        });
        for _ in 0..50 {
            assert!(matches!(policy.on_failure(), RestartDecision::Retry(_)));
        }
        assert_eq!(policy.circuit_trips(), 0);
    }
}
