//! Pool access for V2 pairs
//!
//! Reserve reads against the venue pools and the constant product maths
//! used to reason about them offline.
//!
//! Created: 2026-10-17

pub mod calculator;
pub mod reader;

pub use reader::{read_reserves, resolve_venue};
