//! Venue capabilities
//!
//! A venue is a Uniswap V2 fork reached through three contracts: the
//! factory (pair lookup), the pair pool (reserves + Swap events) and the
//! router (amount quotes). `VenueClient` is the seam between the engine
//! and the chain; `rpc::RpcVenue` is the alloy implementation.
//!
//! Created: 2026-10-17

pub mod rpc;

use crate::types::VenueId;
use alloy::primitives::{Address, U256};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;

pub use rpc::{load_token, RpcVenue};

/// Factory, pool and router calls for one venue
#[async_trait]
pub trait VenueClient: Send + Sync {
    /// Factory `getPair`; zero address means no pool exists
    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address>;

    /// Pool `getReserves` as raw (reserve0, reserve1)
    async fn get_reserves(&self, pool: Address) -> Result<(U256, U256)>;

    /// Router `getAmountsOut`
    async fn get_amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>>;

    /// Router `getAmountsIn`
    async fn get_amounts_in(&self, amount_out: U256, path: &[Address]) -> Result<Vec<U256>>;

    /// Pool `Swap` events. Items carry no data, they are only triggers.
    async fn subscribe_swaps(&self, pool: Address) -> Result<BoxStream<'static, ()>>;
}

/// A configured venue with its resolved pair pool
#[derive(Clone)]
pub struct Venue {
    pub id: VenueId,
    pub label: String,
    pub pool: Address,
    client: Arc<dyn VenueClient>,
}

impl Venue {
    pub fn new(id: VenueId, label: impl Into<String>, pool: Address, client: Arc<dyn VenueClient>) -> Self {
        Self {
            id,
            label: label.into(),
            pool,
            client,
        }
    }

    pub fn client(&self) -> &dyn VenueClient {
        self.client.as_ref()
    }
}

impl fmt::Debug for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Venue")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("pool", &self.pool)
            .finish()
    }
}

/// The two venues compared for the lifetime of the process
#[derive(Debug, Clone)]
pub struct VenuePair {
    pub a: Venue,
    pub b: Venue,
}

impl VenuePair {
    pub fn new(a: Venue, b: Venue) -> Self {
        Self { a, b }
    }

    pub fn get(&self, id: VenueId) -> &Venue {
        match id {
            VenueId::A => &self.a,
            VenueId::B => &self.b,
        }
    }

    pub fn label(&self, id: VenueId) -> &str {
        &self.get(id).label
    }
}
