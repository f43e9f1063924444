//! Engine error taxonomy
//!
//! Every pipeline run either completes or aborts with one of these.
//! Read, DegenerateMarket and Estimation are local to a run; Execution
//! additionally restarts the listening session.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArbError {
    /// Pair lookup or reserve read failed (missing pool, transport, revert)
    #[error("reserve read failed on {venue}: {reason}")]
    Read { venue: String, reason: String },

    /// Zero liquidity on one side made a price undefined
    #[error("degenerate market on {venue}: {reason}")]
    DegenerateMarket { venue: String, reason: String },

    /// Router quote failed or sized a non-positive trade
    #[error("estimation failed: {0}")]
    Estimation(String),

    /// Flash swap call reverted, timed out, or the transport failed
    #[error("execution failed: {0}")]
    Execution(String),
}

impl ArbError {
    pub fn read(venue: impl Into<String>, reason: impl ToString) -> Self {
        Self::Read {
            venue: venue.into(),
            reason: reason.to_string(),
        }
    }

    pub fn degenerate(venue: impl Into<String>, reason: impl ToString) -> Self {
        Self::DegenerateMarket {
            venue: venue.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that trigger the restart fallback
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}
