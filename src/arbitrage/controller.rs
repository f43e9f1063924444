//! Execution Controller
//!
//! Turns Swap notifications into at most one pipeline run at a time:
//!
//!   reserves (both venues) -> prices -> spread -> direction
//!     -> estimate -> profitability gate -> flash swap
//!
//! The gate is IDLE or EXECUTING. A trigger that arrives while a run is
//! in flight is dropped, not queued; the next Swap event will bring fresh
//! reserves anyway. The permit handed to a run puts the gate back to IDLE
//! when dropped, whatever way the run ends.
//!
//! Created: 2026-10-17

use crate::arbitrage::direction::{resolve_direction, Threshold};
use crate::arbitrage::estimator::ProfitabilityEstimator;
use crate::arbitrage::executor::FlashExecutor;
use crate::arbitrage::spread::compute_spread;
use crate::error::ArbError;
use crate::pool::reader::read_reserves;
use crate::types::{ExecutionReceipt, PriceQuote, TokenPair, TradePlan, VenueId};
use crate::venue::VenuePair;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Executing,
}

/// Single-flight guard for pipeline runs
#[derive(Debug, Default)]
pub struct ExecutionGate {
    executing: AtomicBool,
}

impl ExecutionGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// IDLE -> EXECUTING, or None if a run already holds the gate
    pub fn try_acquire(self: &Arc<Self>) -> Option<ExecutionPermit> {
        self.executing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExecutionPermit {
                gate: Arc::clone(self),
            })
    }

    pub fn state(&self) -> ExecutionState {
        if self.executing.load(Ordering::Acquire) {
            ExecutionState::Executing
        } else {
            ExecutionState::Idle
        }
    }
}

/// Held for the duration of one run
#[derive(Debug)]
pub struct ExecutionPermit {
    gate: Arc<ExecutionGate>,
}

impl Drop for ExecutionPermit {
    fn drop(&mut self) {
        self.gate.executing.store(false, Ordering::Release);
    }
}

/// How a pipeline run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Spread inside the threshold band
    NoOpportunity,
    /// Direction found but the quoted round trip loses base
    Unprofitable(TradePlan),
    Executed {
        plan: TradePlan,
        receipt: ExecutionReceipt,
    },
    Failed(ArbError),
}

impl RunOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, RunOutcome::Executed { .. })
    }
}

/// Sent to the monitor after a run touched the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSignal {
    /// Flash swap failed; the listening session must restart
    ExecutionFailed(String),
    ExecutionSucceeded,
}

/// Snapshot of the trigger counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub accepted: u64,
    pub dropped: u64,
    pub executed: u64,
}

pub struct ExecutionController {
    venues: VenuePair,
    pair: TokenPair,
    threshold: Threshold,
    estimator: ProfitabilityEstimator,
    executor: Arc<dyn FlashExecutor>,
    gate: Arc<ExecutionGate>,
    require_profit: bool,
    signals: mpsc::UnboundedSender<RunSignal>,
    accepted: AtomicU64,
    dropped: AtomicU64,
    executed: AtomicU64,
}

impl ExecutionController {
    pub fn new(
        venues: VenuePair,
        pair: TokenPair,
        threshold: Threshold,
        estimator: ProfitabilityEstimator,
        executor: Arc<dyn FlashExecutor>,
        signals: mpsc::UnboundedSender<RunSignal>,
    ) -> Self {
        Self {
            venues,
            pair,
            threshold,
            estimator,
            executor,
            gate: ExecutionGate::new(),
            require_profit: true,
            signals,
            accepted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            executed: AtomicU64::new(0),
        }
    }

    /// When false, trades that quote at a loss are still sent
    pub fn with_require_profit(mut self, require_profit: bool) -> Self {
        self.require_profit = require_profit;
        self
    }

    pub fn venues(&self) -> &VenuePair {
        &self.venues
    }

    pub fn state(&self) -> ExecutionState {
        self.gate.state()
    }

    pub fn stats(&self) -> ControllerStats {
        ControllerStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
        }
    }

    /// Start a run for a Swap seen on `source`, unless one is in flight
    pub fn on_trigger(self: &Arc<Self>, source: VenueId) -> Option<JoinHandle<RunOutcome>> {
        let Some(permit) = self.gate.try_acquire() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            debug!("Swap on {} ignored, execution in flight", self.venues.label(source));
            return None;
        };
        self.accepted.fetch_add(1, Ordering::Relaxed);

        let controller = Arc::clone(self);
        Some(tokio::spawn(async move {
            let outcome = match controller.evaluate(source).await {
                Ok(outcome) => outcome,
                Err(e) => RunOutcome::Failed(e),
            };
            // IDLE before the monitor hears about it
            drop(permit);
            controller.report(&outcome);
            outcome
        }))
    }

    async fn evaluate(&self, source: VenueId) -> Result<RunOutcome, ArbError> {
        let pair = &self.pair;
        debug!("Swap on {}, evaluating {}", self.venues.label(source), pair.symbol());

        let (reserves_a, reserves_b) = tokio::try_join!(
            read_reserves(&self.venues.a, pair),
            read_reserves(&self.venues.b, pair)
        )?;

        let quote_a = PriceQuote::from_reserves(&reserves_a, pair, &self.venues.a.label)?;
        let quote_b = PriceQuote::from_reserves(&reserves_b, pair, &self.venues.b.label)?;
        let spread = compute_spread(&quote_a, &quote_b, &self.venues.b.label)?;

        info!(
            "📊 {} | {}: {:.6} | {}: {:.6} | spread {:+.2}% (threshold {})",
            pair.symbol(),
            self.venues.a.label,
            quote_a.price,
            self.venues.b.label,
            quote_b.price,
            spread.percent,
            self.threshold
        );

        let Some(direction) = resolve_direction(&spread, self.threshold) else {
            info!("No arbitrage available");
            return Ok(RunOutcome::NoOpportunity);
        };
        info!(
            "Buy on {}, sell on {}",
            self.venues.label(direction.buy),
            self.venues.label(direction.sell)
        );

        let plan = self.estimator.estimate(direction, &self.venues, pair).await?;

        if !plan.is_profitable() {
            if self.require_profit {
                info!(
                    "📉 Round trip loses {} {} ({:.4}x), skipping",
                    pair.base.format(plan.input_amount - plan.expected_amount_out),
                    pair.base.symbol,
                    plan.return_ratio()
                );
                return Ok(RunOutcome::Unprofitable(plan));
            }
            warn!(
                "Round trip quotes at a loss ({:.4}x), executing anyway",
                plan.return_ratio()
            );
        }

        info!(
            "🚀 Flash swap: borrow {} {}, sell on {}, buy back on {}",
            pair.base.format(plan.input_amount),
            pair.base.symbol,
            self.venues.label(plan.sell_venue),
            self.venues.label(plan.buy_venue)
        );
        let receipt = self
            .executor
            .execute_flash_trade(pair.base.address, plan.input_amount, plan.starts_on_venue_a())
            .await?;

        Ok(RunOutcome::Executed { plan, receipt })
    }

    fn report(&self, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Executed { receipt, .. } => {
                self.executed.fetch_add(1, Ordering::Relaxed);
                info!(
                    "✅ Flash swap confirmed: {:?} (block {:?}, gas {}, {}ms)",
                    receipt.tx_hash, receipt.block_number, receipt.gas_used, receipt.elapsed_ms
                );
                self.signal(RunSignal::ExecutionSucceeded);
            }
            RunOutcome::Failed(e) if e.is_execution() => {
                error!("Flash swap failed: {}", e);
                self.signal(RunSignal::ExecutionFailed(e.to_string()));
            }
            RunOutcome::Failed(e) => warn!("Run aborted: {}", e),
            RunOutcome::NoOpportunity | RunOutcome::Unprofitable(_) => {}
        }
    }

    fn signal(&self, signal: RunSignal) {
        if self.signals.send(signal).is_err() {
            debug!("Monitor gone, run signal dropped");
        }
    }
}
