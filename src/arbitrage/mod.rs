//! Arbitrage Module
//!
//! Spread detection, trade sizing, single-flight execution control and
//! restart policy for the two-venue flash swap engine.
//!
//! Created: 2026-10-17

pub mod controller;
pub mod direction;
pub mod estimator;
pub mod executor;
pub mod recovery;
pub mod spread;

pub use controller::{
    ControllerStats, ExecutionController, ExecutionGate, ExecutionPermit, ExecutionState,
    RunOutcome, RunSignal,
};
pub use direction::{resolve_direction, Threshold};
pub use estimator::ProfitabilityEstimator;
pub use executor::{ContractExecutor, DryRunExecutor, FlashExecutor};
pub use recovery::{RestartConfig, RestartDecision, RestartPolicy};
pub use spread::compute_spread;
