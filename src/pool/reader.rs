//! Reserve Reader
//!
//! Resolves the pair pool on each venue once at startup (factory
//! `getPair`) and reads fresh reserves on every pipeline run. Reserves
//! are never cached: they can move between two Swap events.
//!
//! No retry here, callers decide what a failed read means.
//!
//! Created: 2026-10-17

use crate::error::ArbError;
use crate::types::{PoolReserves, TokenPair, VenueId};
use crate::venue::{Venue, VenueClient};
use std::sync::Arc;
use tracing::{debug, info};

/// Look up the pair pool through the venue's factory
pub async fn resolve_venue(
    id: VenueId,
    label: &str,
    client: Arc<dyn VenueClient>,
    pair: &TokenPair,
) -> Result<Venue, ArbError> {
    let pool = client
        .get_pair(pair.base.address, pair.quote.address)
        .await
        .map_err(|e| ArbError::read(label, format!("{:#}", e)))?;

    if pool.is_zero() {
        return Err(ArbError::read(label, format!("no pool for {}", pair.symbol())));
    }

    info!("Resolved {} pool on {} (venue {}): {:?}", pair.symbol(), label, id, pool);
    Ok(Venue::new(id, label, pool, client))
}

/// Current reserves of the pair pool on `venue`, oriented to base/quote
pub async fn read_reserves(venue: &Venue, pair: &TokenPair) -> Result<PoolReserves, ArbError> {
    if venue.pool.is_zero() {
        return Err(ArbError::read(&venue.label, format!("no pool for {}", pair.symbol())));
    }

    let (reserve0, reserve1) = venue
        .client()
        .get_reserves(venue.pool)
        .await
        .map_err(|e| ArbError::read(&venue.label, format!("{:#}", e)))?;

    let reserves = PoolReserves::from_raw(venue.id, pair, reserve0, reserve1);
    debug!(
        "{} reserves: {} {} / {} {}",
        venue.label,
        pair.base.format(reserves.base),
        pair.base.symbol,
        pair.quote.format(reserves.quote),
        pair.quote.symbol
    );
    Ok(reserves)
}
