//! Direction Resolver
//!
//! Partitions the spread line into three regions around the configured
//! threshold `t`:
//!
//! - `spread >= t`: buy on B, sell on A
//! - `spread <= -t`: buy on A, sell on B
//! - otherwise no opportunity
//!
//! The boundary itself counts as an opportunity.
//!
//! Created: 2026-10-17

use crate::types::{Direction, SpreadResult, VenueId};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum spread magnitude, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(percent: f64) -> Result<Self> {
        if !percent.is_finite() {
            bail!("threshold must be a finite percentage, got {}", percent);
        }
        if percent < 0.0 {
            bail!("threshold must be non-negative, got {}", percent);
        }
        Ok(Self(percent))
    }

    pub fn percent(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Threshold {
    type Error = anyhow::Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> f64 {
        t.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

pub fn resolve_direction(spread: &SpreadResult, threshold: Threshold) -> Option<Direction> {
    let t = threshold.percent();
    let buy = if spread.percent >= t {
        VenueId::B
    } else if spread.percent <= -t {
        VenueId::A
    } else {
        return None;
    };
    Some(Direction::new(buy, buy.counterpart()))
}
